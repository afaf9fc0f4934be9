use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::io::store_io::Persistence;
use crate::ops::rollover::Clock;

use super::app::{AddTarget, App, Mode, Row};

/// Handle a key event in the current mode
pub fn handle_key<P: Persistence, C: Clock>(app: &mut App<P, C>, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.mode.clone() {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Input { target, buffer } => handle_input(app, key, target, buffer),
        Mode::ConfirmDelete(row) => handle_confirm(app, key, row),
    }
    app.clamp_cursor();
}

fn handle_navigate<P: Persistence, C: Clock>(app: &mut App<P, C>, key: KeyEvent) {
    app.status_message = None;
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.cursor = app.cursor.saturating_add(1),
        KeyCode::Up | KeyCode::Char('k') => app.cursor = app.cursor.saturating_sub(1),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.cursor = usize::MAX,
        KeyCode::Enter | KeyCode::Char('l') => toggle_expansion(app),
        KeyCode::Char(' ') | KeyCode::Char('x') => toggle_completion(app),
        KeyCode::Char('A') => start_input(app, AddTarget::Title),
        KeyCode::Char('a') => {
            let target = child_target(app.current_row());
            start_input(app, target);
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(row) = app.current_row() {
                app.mode = Mode::ConfirmDelete(row);
            }
        }
        _ => {}
    }
}

fn handle_input<P: Persistence, C: Clock>(
    app: &mut App<P, C>,
    key: KeyEvent,
    target: AddTarget,
    mut buffer: String,
) {
    match key.code {
        KeyCode::Esc => app.mode = Mode::Navigate,
        KeyCode::Enter => {
            app.mode = Mode::Navigate;
            commit_add(app, &target, &buffer);
        }
        KeyCode::Backspace => {
            buffer.pop();
            app.mode = Mode::Input { target, buffer };
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            app.mode = Mode::Input { target, buffer };
        }
        _ => {}
    }
}

fn handle_confirm<P: Persistence, C: Clock>(app: &mut App<P, C>, key: KeyEvent, row: Row) {
    app.mode = Mode::Navigate;
    if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        return;
    }
    let session = &mut app.session;
    match row {
        Row::Title { title_id } => session.delete_title(&title_id),
        Row::Subtitle {
            title_id,
            subtitle_id,
        } => session.delete_subtitle(&title_id, &subtitle_id),
        Row::Item {
            title_id,
            subtitle_id,
            item_id,
        } => session.delete_checklist_item(&title_id, &subtitle_id, &item_id),
    };
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

fn start_input<P: Persistence, C: Clock>(app: &mut App<P, C>, target: AddTarget) {
    app.mode = Mode::Input {
        target,
        buffer: String::new(),
    };
}

/// What `a` adds below the cursor row
pub fn child_target(row: Option<Row>) -> AddTarget {
    match row {
        None => AddTarget::Title,
        Some(Row::Title { title_id }) => AddTarget::Subtitle { title_id },
        Some(Row::Subtitle {
            title_id,
            subtitle_id,
        })
        | Some(Row::Item {
            title_id,
            subtitle_id,
            ..
        }) => AddTarget::Item {
            title_id,
            subtitle_id,
        },
    }
}

/// Add the typed entry, expanding its parent so it is visible, and move the
/// cursor onto it. Blank text is ignored.
fn commit_add<P: Persistence, C: Clock>(app: &mut App<P, C>, target: &AddTarget, text: &str) {
    let row = match target {
        AddTarget::Title => app
            .session
            .add_title(text)
            .map(|title_id| Row::Title { title_id }),
        AddTarget::Subtitle { title_id } => {
            let id = app.session.add_subtitle(title_id, text);
            if id.is_some() && !app.session.tree().title(title_id).is_some_and(|t| t.expanded) {
                app.session.toggle_title_expansion(title_id);
            }
            id.map(|subtitle_id| Row::Subtitle {
                title_id: title_id.clone(),
                subtitle_id,
            })
        }
        AddTarget::Item {
            title_id,
            subtitle_id,
        } => {
            let id = app.session.add_checklist_item(title_id, subtitle_id, text);
            if id.is_some()
                && !app
                    .session
                    .tree()
                    .subtitle(title_id, subtitle_id)
                    .is_some_and(|s| s.expanded)
            {
                app.session.toggle_subtitle_expansion(title_id, subtitle_id);
            }
            id.map(|item_id| Row::Item {
                title_id: title_id.clone(),
                subtitle_id: subtitle_id.clone(),
                item_id,
            })
        }
    };
    if let Some(row) = row {
        app.select_row(&row);
    }
}

fn toggle_expansion<P: Persistence, C: Clock>(app: &mut App<P, C>) {
    let Some(row) = app.current_row() else {
        return;
    };
    match &row {
        Row::Title { title_id } => {
            app.session.toggle_title_expansion(title_id);
        }
        Row::Subtitle {
            title_id,
            subtitle_id,
        } => {
            app.session.toggle_subtitle_expansion(title_id, subtitle_id);
        }
        Row::Item { .. } => return,
    }
    // Accordion collapse can move rows around; stay on the same node
    app.select_row(&row);
}

fn toggle_completion<P: Persistence, C: Clock>(app: &mut App<P, C>) {
    let Some(row) = app.current_row() else {
        return;
    };
    let session = &mut app.session;
    match row {
        Row::Title { title_id } => session.toggle_title(&title_id),
        Row::Subtitle {
            title_id,
            subtitle_id,
        } => session.toggle_subtitle(&title_id, &subtitle_id),
        Row::Item {
            title_id,
            subtitle_id,
            item_id,
        } => session.toggle_checklist_item(&title_id, &subtitle_id, &item_id),
    };
}
