use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::tree::{ChecklistItem, Subtitle, Title, Tree};
use crate::ops::propagate::{recompute_subtitle, recompute_title};

// ---------------------------------------------------------------------------
// IDs and text
// ---------------------------------------------------------------------------

/// Generate an opaque ID: base-36 millisecond timestamp followed by a random
/// base-36 suffix.
pub fn generate_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let random = uuid::Uuid::new_v4().as_u128();
    let suffix = to_base36(random);
    format!("{}{}", to_base36(millis), &suffix[..suffix.len().min(10)])
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Trim user text, rejecting anything that is empty afterwards.
pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

/// Append a new title. Returns the assigned ID.
pub fn add_title(tree: &mut Tree, text: String) -> String {
    let id = generate_id();
    tree.titles.push(Title::new(id.clone(), text));
    id
}

/// Append a subtitle under `title_id`. Returns `None` if the title is missing.
pub fn add_subtitle(tree: &mut Tree, title_id: &str, text: String) -> Option<String> {
    let title = tree.title_mut(title_id)?;
    let id = generate_id();
    title.subtitles.push(Subtitle::new(id.clone(), text));
    recompute_title(title);
    Some(id)
}

/// Append a checklist item under `title_id`/`subtitle_id`.
/// Returns `None` if either parent is missing.
pub fn add_checklist_item(
    tree: &mut Tree,
    title_id: &str,
    subtitle_id: &str,
    text: String,
) -> Option<String> {
    let title = tree.title_mut(title_id)?;
    let subtitle = title.subtitle_mut(subtitle_id)?;
    let id = generate_id();
    subtitle.checklist.push(ChecklistItem::new(id.clone(), text));
    recompute_subtitle(subtitle);
    recompute_title(title);
    Some(id)
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Remove a title and everything under it. Returns whether anything was removed.
pub fn delete_title(tree: &mut Tree, title_id: &str) -> bool {
    let before = tree.titles.len();
    tree.titles.retain(|t| t.id != title_id);
    tree.titles.len() != before
}

/// Remove a subtitle and its checklist, then recompute the title from the
/// remaining subtitles.
pub fn delete_subtitle(tree: &mut Tree, title_id: &str, subtitle_id: &str) -> bool {
    let Some(title) = tree.title_mut(title_id) else {
        return false;
    };
    let before = title.subtitles.len();
    title.subtitles.retain(|s| s.id != subtitle_id);
    if title.subtitles.len() == before {
        return false;
    }
    recompute_title(title);
    true
}

/// Remove a checklist item, then recompute its subtitle and title.
pub fn delete_checklist_item(
    tree: &mut Tree,
    title_id: &str,
    subtitle_id: &str,
    item_id: &str,
) -> bool {
    let Some(title) = tree.title_mut(title_id) else {
        return false;
    };
    let Some(subtitle) = title.subtitle_mut(subtitle_id) else {
        return false;
    };
    let before = subtitle.checklist.len();
    subtitle.checklist.retain(|c| c.id != item_id);
    if subtitle.checklist.len() == before {
        return false;
    }
    recompute_subtitle(subtitle);
    recompute_title(title);
    true
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// Flip a title's expansion, collapsing every other title.
/// Returns the new expanded state, or `None` if the title is missing.
pub fn toggle_title_expansion(tree: &mut Tree, title_id: &str) -> Option<bool> {
    let expanded = !tree.title(title_id)?.expanded;
    for title in &mut tree.titles {
        title.expanded = title.id == title_id && expanded;
    }
    Some(expanded)
}

/// Flip a subtitle's expansion, collapsing its siblings.
/// Returns the new expanded state, or `None` if either node is missing.
pub fn toggle_subtitle_expansion(tree: &mut Tree, title_id: &str, subtitle_id: &str) -> Option<bool> {
    let title = tree.title_mut(title_id)?;
    let expanded = !title.subtitle(subtitle_id)?.expanded;
    for subtitle in &mut title.subtitles {
        subtitle.expanded = subtitle.id == subtitle_id && expanded;
    }
    Some(expanded)
}
