use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::cli::output::{EMPTY_HISTORY, display_date, history_status_text};
use crate::io::store_io::Persistence;
use crate::ops::rollover::Clock;
use crate::tui::app::App;
use crate::util::unicode;

/// Render the most recent daily summaries, newest first
pub fn render_history_view<P: Persistence, C: Clock>(frame: &mut Frame, app: &App<P, C>, area: Rect) {
    let bg = app.theme.background;
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(app.theme.muted).bg(bg))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.saturating_sub(1) as usize;
    let mut lines = vec![Line::from(Span::styled(
        " History",
        Style::default()
            .fg(app.theme.heading)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    ))];

    let entries = app.session.recent_history(app.config.ui.recent_days);
    if entries.is_empty() {
        lines.push(Line::from(Span::styled(
            format!(" {}", unicode::truncate_to_width(EMPTY_HISTORY, width)),
            Style::default().fg(app.theme.muted).bg(bg),
        )));
    }
    for entry in entries {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", unicode::truncate_to_width(&display_date(entry.date), width)),
            Style::default().fg(app.theme.text).bg(bg),
        )));
        lines.push(Line::from(Span::styled(
            format!(" {}", unicode::truncate_to_width(&history_status_text(entry), width)),
            Style::default()
                .fg(app.theme.status_color(entry.status))
                .bg(bg),
        )));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store_io::{LoadedState, MemoryStore};
    use crate::model::{Config, DayStatus, History, HistoryEntry};
    use crate::ops::rollover::FixedClock;
    use crate::session::Session;
    use crate::tui::render::test_helpers::*;
    use chrono::NaiveDate;

    fn entry(day: u32, status: DayStatus, completed: usize, total: usize) -> HistoryEntry {
        HistoryEntry {
            date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            status,
            completed_tasks: completed,
            total_tasks: total,
        }
    }

    fn app_with_history(entries: Vec<HistoryEntry>, recent_days: usize) -> App<MemoryStore, FixedClock> {
        let today = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
        let store = MemoryStore::with_state(LoadedState {
            history: History::from_entries(entries),
            last_reset: Some(today),
            ..LoadedState::default()
        });
        let mut config = Config::default();
        config.ui.recent_days = recent_days;
        App::new(Session::open(store, FixedClock::at_date(today)), config)
    }

    #[test]
    fn empty_history_message() {
        let app = app_with_history(vec![], 7);
        let output = render_to_string(34, 6, |frame, area| {
            render_history_view(frame, &app, area);
        });
        assert!(output.contains("History"));
        assert!(output.contains("No history available"));
    }

    #[test]
    fn shows_recent_days_newest_first() {
        let app = app_with_history(
            vec![
                entry(5, DayStatus::Partial, 1, 2),
                entry(4, DayStatus::Completed, 2, 2),
                entry(3, DayStatus::Incomplete, 0, 2),
            ],
            2,
        );
        let output = render_to_string(34, 12, |frame, area| {
            render_history_view(frame, &app, area);
        });
        let monday = output.find("Monday, May 5, 2025").unwrap();
        let sunday = output.find("Sunday, May 4, 2025").unwrap();
        assert!(monday < sunday);
        assert!(output.contains("1/2 tasks completed"));
        assert!(output.contains("All tasks completed"));
        // Only the configured number of days
        assert!(!output.contains("Saturday"));
    }
}
