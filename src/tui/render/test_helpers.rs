use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::store_io::MemoryStore;
use crate::ops::rollover::FixedClock;
use crate::tui::app::{App, test_app};

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Morning > Stretch > {Hamstrings (done), Calves}, plus a collapsed Evening
/// title. Morning and Stretch are expanded.
pub fn app_with_morning() -> App<MemoryStore, FixedClock> {
    let mut app = test_app();
    let t = app.session.add_title("Morning").unwrap();
    let s = app.session.add_subtitle(&t, "Stretch").unwrap();
    let c = app.session.add_checklist_item(&t, &s, "Hamstrings").unwrap();
    app.session.add_checklist_item(&t, &s, "Calves").unwrap();
    app.session.toggle_checklist_item(&t, &s, &c);
    app.session.add_title("Evening").unwrap();
    app.session.toggle_title_expansion(&t);
    app.session.toggle_subtitle_expansion(&t, &s);
    app
}
