use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum number of days kept in the history log
pub const HISTORY_CAP: usize = 30;

/// How a day ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Completed,
    Partial,
    Incomplete,
}

impl DayStatus {
    /// Classify a day from its item counts.
    pub fn classify(completed: usize, total: usize) -> DayStatus {
        if total > 0 && completed == total {
            DayStatus::Completed
        } else if total > 0 && completed > 0 {
            DayStatus::Partial
        } else {
            DayStatus::Incomplete
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayStatus::Completed => "completed",
            DayStatus::Partial => "partial",
            DayStatus::Incomplete => "incomplete",
        }
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded day. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub status: DayStatus,
    #[serde(rename = "completedTasks")]
    pub completed_tasks: usize,
    #[serde(rename = "totalTasks")]
    pub total_tasks: usize,
}

/// Bounded log of daily outcomes, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    /// Build a log from stored entries, dropping anything past the cap.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAP);
        History { entries }
    }

    /// Prepend an entry and evict the oldest beyond the cap.
    pub fn push_front(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAP);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_all_statuses() {
        assert_eq!(DayStatus::classify(3, 3), DayStatus::Completed);
        assert_eq!(DayStatus::classify(1, 3), DayStatus::Partial);
        assert_eq!(DayStatus::classify(0, 3), DayStatus::Incomplete);
        assert_eq!(DayStatus::classify(0, 0), DayStatus::Incomplete);
    }

    #[test]
    fn entry_uses_stored_key_names() {
        let entry = HistoryEntry {
            date: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            status: DayStatus::Partial,
            completed_tasks: 1,
            total_tasks: 4,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2025-05-05","status":"partial","completedTasks":1,"totalTasks":4}"#
        );
    }

    #[test]
    fn from_entries_applies_cap() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let entries = (0..40)
            .map(|i| HistoryEntry {
                date: day + chrono::Days::new(i),
                status: DayStatus::Incomplete,
                completed_tasks: 0,
                total_tasks: 0,
            })
            .collect();
        let history = History::from_entries(entries);
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history.entries()[0].date, day);
    }
}
