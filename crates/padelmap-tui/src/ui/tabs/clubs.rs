use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use padelmap_core::models::Club;
use padelmap_core::utils::{format_rating, truncate_string};

use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_club_list(frame, app, chunks[0]);
    render_club_detail(frame, app, chunks[1]);
}

fn render_club_list(frame: &mut Frame, app: &App, area: Rect) {
    let clubs = app.filtered_clubs();
    let name_width = (area.width as usize).saturating_sub(LIST_ROW_EXTRAS).max(8);

    let items: Vec<ListItem> = clubs
        .iter()
        .enumerate()
        .map(|(i, club)| {
            let line = club_list_line(club, name_width);

            let style = if i == app.club_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            ListItem::new(line).style(style)
        })
        .collect();

    let focused = matches!(app.focus, Focus::List);
    let block = Block::default()
        .title(format!(" Clubs ({}) ", clubs.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.club_selection));

    frame.render_stateful_widget(list, area, &mut state);
}

// Borders, rating and price columns
const LIST_ROW_EXTRAS: usize = 29;

fn club_list_line(club: &Club, name_width: usize) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!(
            "{:<width$} ",
            truncate_string(&club.name, name_width),
            width = name_width
        )),
        Span::styled(format_rating(club.rating), styles::rating_style()),
        Span::styled(
            format!("  {:>4} AED/hr", club.price_per_hour),
            styles::muted_style(),
        ),
    ])
}

fn render_club_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    render_detail_panel(frame, app.selected_club(), app.detail_scroll, focused, area);
}

/// Detail panel for one club, shared with the map tab.
pub fn render_detail_panel(
    frame: &mut Frame,
    club: Option<&Club>,
    scroll: u16,
    focused: bool,
    area: Rect,
) {
    let (title, content) = match club {
        Some(club) => (format!(" {} ", club.name), club_detail_lines(club)),
        None => (
            " No Club Selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select a club from the list",
                styles::muted_style(),
            ))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

pub fn club_detail_lines(club: &Club) -> Vec<Line<'static>> {
    let mut lines = vec![];

    lines.push(Line::from(vec![
        Span::styled(format_rating(club.rating), styles::rating_style()),
        Span::styled(format!("  ({} reviews)", club.reviews_count), styles::muted_style()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Address: ", styles::highlight_style()),
        Span::raw(if club.location.address.is_empty() {
            "-".to_string()
        } else {
            club.location.address.clone()
        }),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Zone:    ", styles::highlight_style()),
        Span::raw(club.location.zone_display()),
    ]));
    if let Some(instagram) = club.instagram() {
        lines.push(Line::from(vec![
            Span::styled("Instagram: ", styles::highlight_style()),
            Span::styled(instagram.to_string(), styles::link_style()),
        ]));
    }
    lines.push(Line::from(""));

    // Price
    let (active, inactive) = club.price_level_marks();
    lines.push(Line::from(vec![
        Span::styled("Price: ", styles::highlight_style()),
        Span::styled(active, styles::price_active_style()),
        Span::styled(inactive, styles::muted_style()),
        Span::raw(format!("  {}", club.price_display())),
    ]));

    if !club.amenities.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Amenities", styles::title_style())));
        lines.push(Line::from(format!("  {}", club.amenities.join(" · "))));
    }

    if !club.images.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {} photo(s)", club.images.len()),
            styles::muted_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Reviews ({})", club.reviews.len()),
        styles::title_style(),
    )));
    if club.reviews.is_empty() {
        lines.push(Line::from(Span::styled("  No reviews yet", styles::muted_style())));
    }
    for review in &club.reviews {
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", review.stars()), styles::rating_style()),
            Span::styled(review.author.clone(), styles::highlight_style()),
        ]));
        if !review.text.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("    \"{}\"", review.text),
                styles::muted_style(),
            )));
        }
    }

    lines.push(Line::from(""));
    if club.has_booking() {
        lines.push(Line::from(vec![
            Span::styled("Book: ", styles::highlight_style()),
            Span::styled(club.booking_url.clone(), styles::link_style()),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            "No online booking",
            styles::muted_style(),
        )));
    }

    lines
}
