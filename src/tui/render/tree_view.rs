use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::io::store_io::Persistence;
use crate::model::Tree;
use crate::ops::rollover::Clock;
use crate::tui::app::{App, Row};
use crate::util::unicode;

const EMPTY_TREE: &str = " No checklists yet. Press A to add a title.";

/// What a row shows: label, completion, and whether it has a fold marker
struct RowView<'a> {
    text: &'a str,
    completed: bool,
    /// `Some(expanded)` for titles and subtitles
    fold: Option<bool>,
}

fn row_view<'a>(tree: &'a Tree, row: &Row) -> Option<RowView<'a>> {
    match row {
        Row::Title { title_id } => tree.title(title_id).map(|t| RowView {
            text: &t.text,
            completed: t.completed,
            fold: Some(t.expanded),
        }),
        Row::Subtitle {
            title_id,
            subtitle_id,
        } => tree.subtitle(title_id, subtitle_id).map(|s| RowView {
            text: &s.text,
            completed: s.completed,
            fold: Some(s.expanded),
        }),
        Row::Item {
            title_id,
            subtitle_id,
            item_id,
        } => tree.item(title_id, subtitle_id, item_id).map(|c| RowView {
            text: &c.text,
            completed: c.completed,
            fold: None,
        }),
    }
}

/// Render the visible part of the checklist tree
pub fn render_tree_view<P: Persistence, C: Clock>(frame: &mut Frame, app: &mut App<P, C>, area: Rect) {
    let rows = app.rows();
    if rows.is_empty() {
        let empty = Paragraph::new(EMPTY_TREE)
            .style(Style::default().fg(app.theme.muted).bg(app.theme.background));
        frame.render_widget(empty, area);
        return;
    }

    // Keep the cursor on screen
    let height = (area.height as usize).max(1);
    let cursor = app.cursor.min(rows.len() - 1);
    if cursor < app.scroll_offset {
        app.scroll_offset = cursor;
    } else if cursor >= app.scroll_offset + height {
        app.scroll_offset = cursor + 1 - height;
    }
    app.scroll_offset = app.scroll_offset.min(rows.len().saturating_sub(height));

    let width = area.width as usize;
    let tree = app.session.tree();
    let mut lines: Vec<Line> = Vec::new();

    for (idx, row) in rows.iter().enumerate().skip(app.scroll_offset).take(height) {
        let Some(view) = row_view(tree, row) else {
            continue;
        };
        let bg = if idx == cursor {
            app.theme.selection_bg
        } else {
            app.theme.background
        };

        let fold = match view.fold {
            Some(true) => "\u{25BE} ",
            Some(false) => "\u{25B8} ",
            None => "  ",
        };
        let check = if view.completed { "[x] " } else { "[ ] " };
        let prefix = format!(" {}{}{}", "  ".repeat(row.depth()), fold, check);

        let mut text_style = Style::default().bg(bg);
        text_style = if view.completed {
            text_style
                .fg(app.theme.muted)
                .add_modifier(Modifier::CROSSED_OUT)
        } else if row.depth() == 0 {
            text_style
                .fg(app.theme.heading)
                .add_modifier(Modifier::BOLD)
        } else {
            text_style.fg(app.theme.text)
        };
        let check_color = if view.completed {
            app.theme.done
        } else {
            app.theme.muted
        };

        let prefix_width = unicode::display_width(&prefix);
        let text = unicode::truncate_to_width(view.text, width.saturating_sub(prefix_width));
        let used = prefix_width + unicode::display_width(&text);

        let mut spans = vec![
            Span::styled(prefix, Style::default().fg(check_color).bg(bg)),
            Span::styled(text, text_style),
        ];
        if used < width {
            spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(app.theme.background));
    frame.render_widget(paragraph, area);
}
