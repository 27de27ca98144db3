use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, FormState, StatusKind, Tab};

use super::styles;
use super::tabs::{clubs, communities, map};

const FORM_WIDTH: u16 = 72;
const FORM_LABEL_WIDTH: usize = 18;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingDelete => {
            if let Some(target) = &app.delete_target {
                render_confirm_overlay(frame, &target.prompt(), "delete");
            }
        }
        AppState::ConfirmingSeed => render_confirm_overlay(
            frame,
            &format!(
                "Upload {} clubs and {} communities?",
                app.bundle.clubs.len(),
                app.bundle.communities.len()
            ),
            "seed",
        ),
        AppState::Editing => {
            if let Some(form) = &app.form {
                render_form_overlay(frame, form);
            }
        }
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Dubai Padel Map";
    let indicator = "● ";
    let label = if app.is_live() { "Live" } else { "Local" };
    let help_hint = "[?] Help";
    let used = title.chars().count() + indicator.chars().count() + label.len() + help_hint.len() + 6;

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(indicator, styles::connection_style(app.is_live())),
        Span::styled(label, styles::connection_style(app.is_live())),
        Span::raw("   "),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in [Tab::Map, Tab::Clubs, Tab::Communities].iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        spans.push(Span::styled(label, styles::tab_style(*tab == app.current_tab)));
    }

    // Search box on the right while a query is active
    if app.state == AppState::Searching || !app.search_query.is_empty() {
        let cursor = if app.state == AppState::Searching { "▌" } else { "" };
        let search = format!("/{}{}", app.search_query, cursor);
        let main_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = (area.width as usize).saturating_sub(main_width + search.chars().count() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(search, styles::search_style()));
    }

    let line = Line::from(spans);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Map => map::render(frame, app, area),
        Tab::Clubs => clubs::render(frame, app, area),
        Tab::Communities => communities::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = if app.directory.can_seed() {
        "[a]dd [e]dit [d]elete [S]eed | [r]efresh | [q]uit"
    } else {
        "[a]dd [e]dit [d]elete | [r]efresh | [q]uit"
    };

    let (left_text, left_style) = match &app.status {
        Some(status) => {
            let style = match status.kind {
                StatusKind::Loading => styles::highlight_style(),
                StatusKind::Success => styles::success_style(),
                StatusKind::Error => styles::error_style(),
            };
            (format!(" {} ", status.text), style)
        }
        None => (
            format!(" Updated {} ", app.directory.age_display()),
            styles::muted_style(),
        ),
    };

    let right_text = format!(" {} ", shortcuts);
    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 27, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("   Dubai Padel Map", styles::title_style())),
        Line::from(Span::styled(
            format!("   version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-3", "Switch tabs"),
        help_line("←/→", "Prev/next tab"),
        help_line("Tab", "Switch focus (list ↔ detail)"),
        help_line("↑/↓", "Navigate list / scroll detail"),
        help_line("PgUp/PgDn", "Jump through the list"),
        help_line("Esc", "Clear search / go back"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("/", "Search"),
        help_line("r", "Reload listings"),
        help_line("a", "Add a club or community"),
        help_line("e", "Edit the selected record"),
        help_line("d", "Delete the selected record"),
        help_line("S", "Seed an empty database"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Editor", styles::highlight_style())),
        help_line("Tab/↑/↓", "Move between fields"),
        help_line("Ctrl+S", "Save"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Field rows for the editor, plus the line index of the selected field.
fn form_lines(form: &FormState) -> (Vec<Line<'static>>, usize) {
    let fields = form.form.fields();
    let mut lines = vec![];
    let mut selected_line = 0;

    for index in 0..fields.field_count() {
        let selected = index == form.field;
        if selected {
            selected_line = lines.len();
        }

        let marker = if selected { "▶ " } else { "  " };
        let label_style = if selected {
            styles::help_key_style()
        } else {
            styles::muted_style()
        };
        let value_style = if selected {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let cursor = if selected { "▌" } else { "" };
        let label = format!("{}{:<width$} ", marker, fields.label(index), width = FORM_LABEL_WIDTH);
        let value = fields.value(index);

        if fields.choices(index).is_some() {
            let (left, right) = if selected { ("◀ ", " ▶") } else { ("", "") };
            lines.push(Line::from(vec![
                Span::styled(label, label_style),
                Span::styled(format!("{}{}{}", left, value, right), value_style),
            ]));
        } else if fields.is_multiline(index) {
            lines.push(Line::from(Span::styled(label, label_style)));
            let rows: Vec<&str> = value.split('\n').collect();
            let last = rows.len() - 1;
            for (i, row) in rows.iter().enumerate() {
                let tail = if i == last { cursor } else { "" };
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!("{}{}", row, tail), value_style),
                ]));
            }
        } else {
            lines.push(Line::from(vec![
                Span::styled(label, label_style),
                Span::styled(format!("{}{}", value, cursor), value_style),
            ]));
        }
    }

    (lines, selected_line)
}

fn render_form_overlay(frame: &mut Frame, form: &FormState) {
    let screen = frame.area();
    let area = centered_rect_fixed(FORM_WIDTH, screen.height.saturating_sub(4), screen);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", form.form.fields().title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(inner);

    let (lines, selected_line) = form_lines(form);
    let visible = chunks[0].height as usize;
    let scroll = (selected_line + 2).saturating_sub(visible) as u16;
    let fields = Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((scroll, 0));
    frame.render_widget(fields, chunks[0]);

    let mut footer = vec![];
    match &form.error {
        Some(error) => footer.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        ))),
        None => footer.push(Line::from("")),
    }
    footer.push(Line::from(vec![
        Span::styled(" [Tab]", styles::help_key_style()),
        Span::styled(" next  ", styles::muted_style()),
        Span::styled("[←/→]", styles::help_key_style()),
        Span::styled(" choose  ", styles::muted_style()),
        Span::styled("[Ctrl+S]", styles::help_key_style()),
        Span::styled(" save  ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));
    frame.render_widget(Paragraph::new(footer), chunks[1]);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_confirm_overlay(frame: &mut Frame, question: &str, action: &str) {
    let area = centered_rect_fixed(56, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    render_confirm_overlay(frame, "Are you sure you want to quit?", "quit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::EditForm;
    use chrono::Utc;
    use padelmap_core::forms::ClubDraft;

    #[test]
    fn test_centered_rect_fixed_clamps_to_screen() {
        let screen = Rect::new(0, 0, 40, 10);
        let rect = centered_rect_fixed(60, 20, screen);
        assert_eq!(rect, Rect::new(0, 0, 40, 10));

        let rect = centered_rect_fixed(20, 4, screen);
        assert_eq!(rect, Rect::new(10, 3, 20, 4));
    }

    #[test]
    fn test_form_lines_track_selected_field() {
        let form = FormState {
            form: EditForm::Club(ClubDraft::blank(Utc::now())),
            field: 2,
            error: None,
        };
        let (lines, selected) = form_lines(&form);
        assert_eq!(selected, 2);
        let text: String = lines[selected]
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("alquoz"));
        assert!(text.contains('◀'));
    }
}
