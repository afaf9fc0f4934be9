//! Completion propagation between titles, subtitles and checklist items.
//!
//! Two directions, never mixed in one operation:
//! - explicit toggles of a parent cascade *down*, forcing children to match
//!   when the parent becomes complete;
//! - changes to a child recompute *up*: a parent is complete iff it has at
//!   least one child and every child is complete.

use crate::model::tree::{Subtitle, Title, Tree};

// ---------------------------------------------------------------------------
// Upward recompute
// ---------------------------------------------------------------------------

/// Derive a subtitle's completion from its checklist. Empty never derives true.
pub fn recompute_subtitle(subtitle: &mut Subtitle) {
    subtitle.completed =
        !subtitle.checklist.is_empty() && subtitle.checklist.iter().all(|c| c.completed);
}

/// Derive a title's completion from its subtitles' current flags.
pub fn recompute_title(title: &mut Title) {
    title.completed = !title.subtitles.is_empty() && title.subtitles.iter().all(|s| s.completed);
}

/// Recompute every subtitle from its items, then every title from its
/// subtitles. Prior cascaded state is ignored.
pub fn recompute_all(tree: &mut Tree) {
    for title in &mut tree.titles {
        for subtitle in &mut title.subtitles {
            recompute_subtitle(subtitle);
        }
        recompute_title(title);
    }
}

// ---------------------------------------------------------------------------
// Toggles
// ---------------------------------------------------------------------------

/// Flip a checklist item, then recompute its subtitle and title.
/// Returns `false` (and changes nothing) if any ID is missing.
pub fn toggle_checklist_item(tree: &mut Tree, title_id: &str, subtitle_id: &str, item_id: &str) -> bool {
    let Some(title) = tree.title_mut(title_id) else {
        return false;
    };
    let Some(subtitle) = title.subtitle_mut(subtitle_id) else {
        return false;
    };
    let Some(item) = subtitle.item_mut(item_id) else {
        return false;
    };
    item.completed = !item.completed;
    recompute_subtitle(subtitle);
    recompute_title(title);
    true
}

/// Flip a subtitle directly. Completing it forces every item under it to
/// complete; the title is then recomputed from all its subtitles.
pub fn toggle_subtitle(tree: &mut Tree, title_id: &str, subtitle_id: &str) -> bool {
    let Some(title) = tree.title_mut(title_id) else {
        return false;
    };
    let Some(subtitle) = title.subtitle_mut(subtitle_id) else {
        return false;
    };
    subtitle.completed = !subtitle.completed;
    if subtitle.completed {
        for item in &mut subtitle.checklist {
            item.completed = true;
        }
    }
    recompute_title(title);
    true
}

/// Flip a title directly. Completing it forces every subtitle and every item
/// beneath it to complete. Un-completing it touches nothing below.
pub fn toggle_title(tree: &mut Tree, title_id: &str) -> bool {
    let Some(title) = tree.title_mut(title_id) else {
        return false;
    };
    title.completed = !title.completed;
    if title.completed {
        for subtitle in &mut title.subtitles {
            subtitle.completed = true;
            for item in &mut subtitle.checklist {
                item.completed = true;
            }
        }
    }
    true
}
