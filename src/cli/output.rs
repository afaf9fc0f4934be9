use chrono::NaiveDate;
use serde::Serialize;

use crate::model::history::{DayStatus, HistoryEntry};
use crate::model::tree::Tree;
use crate::session::RolloverReport;

/// Shown in place of history rows when nothing has been recorded yet
pub const EMPTY_HISTORY: &str = "No history available yet. Complete tasks to build your history.";

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct AddedJson {
    pub id: String,
}

#[derive(Serialize)]
pub struct RolloverJson<'a> {
    pub rolled_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<&'a HistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
}

impl<'a> RolloverJson<'a> {
    pub fn from_report(report: Option<&'a RolloverReport>) -> Self {
        match report {
            Some(r) => RolloverJson {
                rolled_over: true,
                today: Some(r.outcome.today),
                recorded: r.outcome.recorded.as_ref(),
                persisted: Some(r.persisted),
            },
            None => RolloverJson {
                rolled_over: false,
                today: None,
                recorded: None,
                persisted: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Long display form, e.g. "Monday, May 5, 2025"
pub fn display_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Human summary of one history entry
pub fn history_status_text(entry: &HistoryEntry) -> String {
    match entry.status {
        DayStatus::Completed => "All tasks completed".to_string(),
        DayStatus::Partial => format!(
            "{}/{} tasks completed",
            entry.completed_tasks, entry.total_tasks
        ),
        DayStatus::Incomplete => "No tasks completed".to_string(),
    }
}

fn checkbox(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

/// Render the tree as an indented outline with IDs
pub fn format_tree(tree: &Tree) -> String {
    if tree.is_empty() {
        return "No titles yet. Add one with `ck add <TEXT>`.\n".to_string();
    }
    let mut out = String::new();
    for title in &tree.titles {
        out.push_str(&format!("{} {}  ({})\n", checkbox(title.completed), title.text, title.id));
        for sub in &title.subtitles {
            out.push_str(&format!("    {} {}  ({})\n", checkbox(sub.completed), sub.text, sub.id));
            for item in &sub.checklist {
                out.push_str(&format!(
                    "        {} {}  ({})\n",
                    checkbox(item.completed),
                    item.text,
                    item.id
                ));
            }
        }
    }
    out
}

/// Render history rows, most recent first
pub fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return format!("{}\n", EMPTY_HISTORY);
    }
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{:<30}{}\n",
            display_date(entry.date),
            history_status_text(entry)
        ));
    }
    out
}

/// One-line summary of a rollover check
pub fn format_rollover(report: Option<&RolloverReport>) -> String {
    let Some(report) = report else {
        return "Already reset today.".to_string();
    };
    let mut line = match &report.outcome.recorded {
        Some(entry) => format!(
            "Checklists have been reset for a new day. Recorded {}: {}.",
            entry.date,
            history_status_text(entry)
        ),
        None => "Checklists have been reset for a new day.".to_string(),
    };
    if !report.persisted {
        line.push_str(" Warning: could not save; the reset will repeat next time.");
    }
    line
}
