use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::io::store_io::Persistence;
use crate::ops::rollover::Clock;
use crate::tui::app::{App, Mode, Row};

const NAVIGATE_HINT: &str = "a add  A title  space done  enter fold  d delete  q quit";

/// Render the status row (bottom of screen)
pub fn render_status_row<P: Persistence, C: Clock>(frame: &mut Frame, app: &App<P, C>, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (mut spans, hint) = match &app.mode {
        Mode::Navigate => match &app.status_message {
            Some(msg) => (
                vec![Span::styled(
                    format!(" {}", msg),
                    Style::default().fg(app.theme.missed).bg(bg),
                )],
                "",
            ),
            None => (Vec::new(), NAVIGATE_HINT),
        },
        Mode::Input { target, buffer } => (
            vec![
                Span::styled(
                    format!(" {}: {}", target.prompt(), buffer),
                    Style::default().fg(app.theme.heading).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.accent).bg(bg)),
            ],
            "Enter add  Esc cancel",
        ),
        Mode::ConfirmDelete(row) => (
            vec![Span::styled(
                format!(" Delete this {}? (y/n)", row_kind(row)),
                Style::default().fg(app.theme.partial).bg(bg),
            )],
            "",
        ),
    };

    // Right-aligned hint when it fits
    let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let hint_width = hint.chars().count() + 1;
    if !hint.is_empty() && content_width + hint_width < width {
        spans.push(Span::styled(
            " ".repeat(width - content_width - hint_width),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(
            format!("{} ", hint),
            Style::default().fg(app.theme.muted).bg(bg),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn row_kind(row: &Row) -> &'static str {
    match row {
        Row::Title { .. } => "title",
        Row::Subtitle { .. } => "subtitle",
        Row::Item { .. } => "item",
    }
}
