pub mod history_view;
pub mod status_row;
pub mod tree_view;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::io::store_io::Persistence;
use crate::ops::rollover::Clock;
use crate::util::unicode;

use super::app::App;

/// Width of the history panel on the right
const HISTORY_WIDTH: u16 = 34;

/// Main render function, dispatches to sub-renderers
pub fn render<P: Persistence, C: Clock>(frame: &mut Frame, app: &mut App<P, C>) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header | notice (when shown) | content | status row
    let notice_height = if app.notice.is_some() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(notice_height),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    if let Some(notice) = &app.notice {
        let line = Line::from(Span::styled(
            format!(" {}", notice.text),
            Style::default()
                .fg(app.theme.heading)
                .bg(app.theme.banner_bg)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(app.theme.banner_bg)),
            chunks[1],
        );
    }

    // Drop the history panel on narrow terminals
    let content = chunks[2];
    if content.width > HISTORY_WIDTH * 2 {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(HISTORY_WIDTH)])
            .split(content);
        tree_view::render_tree_view(frame, app, cols[0]);
        history_view::render_history_view(frame, app, cols[1]);
    } else {
        tree_view::render_tree_view(frame, app, content);
    }

    status_row::render_status_row(frame, app, chunks[3]);
}

/// App name on the left, today's date on the right, rule underneath
fn render_header<P: Persistence, C: Clock>(frame: &mut Frame, app: &App<P, C>, area: Rect) {
    let width = area.width as usize;
    let bg = app.theme.background;
    let name = " Checklist";
    let date = format!("{} ", app.today_display);

    let mut spans = vec![Span::styled(
        name,
        Style::default()
            .fg(app.theme.accent)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    let used = unicode::display_width(name) + unicode::display_width(&date);
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        spans.push(Span::styled(date, Style::default().fg(app.theme.text).bg(bg)));
    }

    let rule = Line::from(Span::styled(
        "\u{2500}".repeat(width),
        Style::default().fg(app.theme.muted).bg(bg),
    ));
    frame.render_widget(
        Paragraph::new(vec![Line::from(spans), rule]).style(Style::default().bg(bg)),
        area,
    );
}
