use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use padelmap_core::models::{Community, COUNTRIES};
use padelmap_core::utils::truncate_string;

use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_community_list(frame, app, chunks[0]);
    render_community_detail(frame, app, chunks[1]);
}

fn render_community_list(frame: &mut Frame, app: &App, area: Rect) {
    let communities = app.filtered_communities();
    let name_width = (area.width as usize).saturating_sub(22).max(8);

    let items: Vec<ListItem> = communities
        .iter()
        .enumerate()
        .map(|(i, community)| {
            let line = Line::from(vec![
                Span::raw(format!("{} ", community.flag())),
                Span::raw(format!(
                    "{:<width$} ",
                    truncate_string(&community.name, name_width),
                    width = name_width
                )),
                Span::styled(format!("{:>7}", community.members), styles::highlight_style()),
                Span::styled(
                    format!(" {}", truncate_string(community.platform.as_str(), 8)),
                    styles::muted_style(),
                ),
            ]);

            let style = if i == app.community_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            ListItem::new(line).style(style)
        })
        .collect();

    let focused = matches!(app.focus, Focus::List);
    let block = Block::default()
        .title(format!(" Communities ({}) ", communities.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.community_selection));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_community_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let (title, content) = match app.selected_community() {
        Some(community) => (format!(" {} ", community.name), community_detail_lines(community)),
        None => (
            " No Community Selected ".to_string(),
            vec![Line::from(Span::styled(
                "Select a community from the list",
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
        .scroll((app.detail_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn country_name(code: &str) -> &str {
    COUNTRIES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

fn community_detail_lines(community: &Community) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Platform: ", styles::highlight_style()),
            Span::raw(community.platform.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Country:  ", styles::highlight_style()),
            Span::raw(format!(
                "{} {}",
                community.flag(),
                country_name(&community.country)
            )),
        ]),
        Line::from(vec![
            Span::styled("Members:  ", styles::highlight_style()),
            Span::raw(community.display_members()),
        ]),
    ];

    if let Some(location) = community.location {
        lines.push(Line::from(vec![
            Span::styled("Meets at: ", styles::highlight_style()),
            Span::raw(format!("{:.4}, {:.4}", location.lat, location.lng)),
        ]));
    }

    lines.push(Line::from(""));
    if community.description.is_empty() {
        lines.push(Line::from(Span::styled("No description", styles::muted_style())));
    } else {
        lines.push(Line::from(community.description.clone()));
    }

    lines.push(Line::from(""));
    if community.link.is_empty() {
        lines.push(Line::from(Span::styled("No join link", styles::muted_style())));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Join: ", styles::highlight_style()),
            Span::styled(community.link.clone(), styles::link_style()),
        ]));
    }

    lines
}
