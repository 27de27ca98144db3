//! Map of Dubai with club and community markers.
//!
//! Clubs are drawn in blue, communities with a meeting point in gold. The
//! club selected with ↑/↓ is labelled on the map and shown in the side panel.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders,
    },
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::ui::tabs::clubs;

/// Map centre over Dubai.
const CENTER_LAT: f64 = 25.15;
const CENTER_LNG: f64 = 55.23;

/// Half extents of the visible area in degrees.
const HALF_HEIGHT: f64 = 0.17;
const HALF_WIDTH: f64 = 0.20;

/// Rough shoreline from Jebel Ali to Al Mamzar, as (lng, lat).
const COASTLINE: [(f64, f64); 10] = [
    (55.03, 25.02),
    (55.13, 25.09),
    (55.14, 25.11),
    (55.20, 25.16),
    (55.24, 25.21),
    (55.27, 25.26),
    (55.30, 25.27),
    (55.32, 25.29),
    (55.35, 25.30),
    (55.40, 25.33),
];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_map(frame, app, chunks[0]);

    let focused = matches!(app.focus, Focus::Detail);
    clubs::render_detail_panel(frame, app.selected_club(), app.detail_scroll, focused, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let clubs = app.filtered_clubs();
    let club_points: Vec<(f64, f64)> = clubs
        .iter()
        .map(|c| (c.location.lng, c.location.lat))
        .collect();
    let community_points: Vec<(f64, f64)> = app
        .filtered_communities()
        .iter()
        .filter_map(|c| c.location)
        .map(|l| (l.lng, l.lat))
        .collect();
    let selected = app.selected_club();

    let legend = Line::from(vec![
        Span::styled(" ● ", styles::club_marker_style()),
        Span::styled(format!("Clubs ({})", club_points.len()), styles::muted_style()),
        Span::styled("  ● ", styles::community_marker_style()),
        Span::styled(
            format!("Communities ({}) ", community_points.len()),
            styles::muted_style(),
        ),
    ]);

    let block = Block::default()
        .title(" Dubai ")
        .title_style(styles::title_style())
        .title_bottom(legend)
        .borders(Borders::ALL)
        .border_style(styles::border_style(matches!(app.focus, Focus::List)));

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([CENTER_LNG - HALF_WIDTH, CENTER_LNG + HALF_WIDTH])
        .y_bounds([CENTER_LAT - HALF_HEIGHT, CENTER_LAT + HALF_HEIGHT])
        .paint(|ctx| {
            for pair in COASTLINE.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].0,
                    y1: pair[0].1,
                    x2: pair[1].0,
                    y2: pair[1].1,
                    color: styles::COASTLINE,
                });
            }
            ctx.print(
                CENTER_LNG - HALF_WIDTH + 0.02,
                CENTER_LAT + HALF_HEIGHT - 0.05,
                Span::styled("Persian Gulf", styles::muted_style()),
            );

            ctx.layer();
            ctx.draw(&Points {
                coords: &community_points,
                color: styles::COMMUNITY_MARKER,
            });
            ctx.draw(&Points {
                coords: &club_points,
                color: styles::CLUB_MARKER,
            });

            if let Some(club) = selected {
                ctx.layer();
                ctx.print(
                    club.location.lng,
                    club.location.lat,
                    Span::styled(format!("◉ {}", club.name), styles::highlight_style()),
                );
            }
        });

    frame.render_widget(canvas, area);
}
