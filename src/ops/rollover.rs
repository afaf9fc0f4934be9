use std::time::{Duration, Instant};

use chrono::{Days, Local, NaiveDate, NaiveDateTime};

use crate::model::history::{History, HistoryEntry};
use crate::model::tree::Tree;
use crate::ops::history_ops::record_snapshot;
use crate::ops::propagate::recompute_all;

/// Text of the banner shown after a rollover
pub const RESET_NOTICE: &str = "Checklists have been reset for a new day.";

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of local wall-clock time
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    /// Today's local calendar date
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The system's local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;


// ---------------------------------------------------------------------------
// Rollover
// ---------------------------------------------------------------------------

/// What a rollover did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverOutcome {
    /// The new reset date
    pub today: NaiveDate,
    /// The history entry recorded for the previous day, unless this was the
    /// very first run
    pub recorded: Option<HistoryEntry>,
}

/// A rollover is due when no reset has happened yet, or the last one was on
/// another calendar day.
pub fn needs_rollover(last_reset: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_reset != Some(today)
}

/// Uncheck every item, then recompute every subtitle and title from scratch.
pub fn reset_checklists(tree: &mut Tree) {
    for title in &mut tree.titles {
        for subtitle in &mut title.subtitles {
            for item in &mut subtitle.checklist {
                item.completed = false;
            }
        }
    }
    recompute_all(tree);
}

/// Run the daily rollover if one is due.
///
/// On a day change the outgoing state is recorded as yesterday's history entry
/// (skipped on the first ever run), all items are reset and `last_reset`
/// advances to `today`. Returns `None` when nothing was due.
pub fn roll_over(
    tree: &mut Tree,
    history: &mut History,
    last_reset: &mut Option<NaiveDate>,
    today: NaiveDate,
) -> Option<RolloverOutcome> {
    if !needs_rollover(*last_reset, today) {
        return None;
    }

    let recorded = if last_reset.is_some() {
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        Some(record_snapshot(history, yesterday, tree))
    } else {
        None
    };

    reset_checklists(tree);
    *last_reset = Some(today);

    Some(RolloverOutcome { today, recorded })
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// A transient, user-visible message that expires after a fixed duration
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    shown_at: Instant,
    ttl: Duration,
}

impl Notice {
    pub fn new(text: impl Into<String>, ttl: Duration, shown_at: Instant) -> Self {
        Notice {
            text: text.into(),
            shown_at,
            ttl,
        }
    }

    /// The reset banner
    pub fn reset(ttl: Duration, shown_at: Instant) -> Self {
        Notice::new(RESET_NOTICE, ttl, shown_at)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::history::DayStatus;
    use crate::ops::propagate::{toggle_checklist_item, toggle_subtitle};
    use crate::ops::store_ops::{add_checklist_item, add_subtitle, add_title};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn due_when_unset_or_different_day() {
        let today = date(2025, 5, 5);
        assert!(needs_rollover(None, today));
        assert!(needs_rollover(Some(date(2025, 5, 4)), today));
        assert!(!needs_rollover(Some(today), today));
    }

    #[test]
    fn first_run_resets_without_recording() {
        let mut tree = Tree::new();
        let t = add_title(&mut tree, "T".into());
        let s = add_subtitle(&mut tree, &t, "S".into()).unwrap();
        let c = add_checklist_item(&mut tree, &t, &s, "C".into()).unwrap();
        toggle_checklist_item(&mut tree, &t, &s, &c);

        let mut history = History::new();
        let mut last = None;
        let outcome = roll_over(&mut tree, &mut history, &mut last, date(2025, 5, 5)).unwrap();

        assert!(outcome.recorded.is_none());
        assert!(history.is_empty());
        assert_eq!(last, Some(date(2025, 5, 5)));
        assert!(!tree.item(&t, &s, &c).unwrap().completed);
    }

    #[test]
    fn day_change_records_yesterday_then_resets() {
        let mut tree = Tree::new();
        let t = add_title(&mut tree, "T".into());
        let s1 = add_subtitle(&mut tree, &t, "S1".into()).unwrap();
        let s2 = add_subtitle(&mut tree, &t, "S2".into()).unwrap();
        let c1 = add_checklist_item(&mut tree, &t, &s1, "C1".into()).unwrap();
        let c2 = add_checklist_item(&mut tree, &t, &s2, "C2".into()).unwrap();
        toggle_checklist_item(&mut tree, &t, &s1, &c1);
        toggle_checklist_item(&mut tree, &t, &s2, &c2);
        assert!(tree.title(&t).unwrap().completed);

        let mut history = History::new();
        let mut last = Some(date(2025, 5, 4));
        let outcome = roll_over(&mut tree, &mut history, &mut last, date(2025, 5, 5)).unwrap();

        let entry = outcome.recorded.unwrap();
        assert_eq!(entry.date, date(2025, 5, 4));
        assert_eq!(entry.status, DayStatus::Completed);
        assert_eq!((entry.completed_tasks, entry.total_tasks), (2, 2));
        assert_eq!(history.len(), 1);

        let title = tree.title(&t).unwrap();
        assert!(!title.completed);
        assert!(title.subtitles.iter().all(|s| !s.completed));
        assert_eq!(tree.items().filter(|c| c.completed).count(), 0);
    }

    #[test]
    fn same_day_is_idempotent() {
        let mut tree = Tree::new();
        let mut history = History::new();
        let mut last = Some(date(2025, 5, 4));
        assert!(roll_over(&mut tree, &mut history, &mut last, date(2025, 5, 5)).is_some());
        assert!(roll_over(&mut tree, &mut history, &mut last, date(2025, 5, 5)).is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn reset_clears_explicit_empty_subtitle_completion() {
        let mut tree = Tree::new();
        let t = add_title(&mut tree, "T".into());
        let s = add_subtitle(&mut tree, &t, "Empty".into()).unwrap();
        toggle_subtitle(&mut tree, &t, &s);
        assert!(tree.title(&t).unwrap().completed);

        reset_checklists(&mut tree);
        assert!(!tree.subtitle(&t, &s).unwrap().completed);
        assert!(!tree.title(&t).unwrap().completed);
    }

    #[test]
    fn fixed_clock_shares_time_across_clones() {
        let clock = FixedClock::at_date(date(2025, 5, 5));
        let handle = clock.clone();
        handle.advance_days(1);
        assert_eq!(clock.today(), date(2025, 5, 6));
    }

    #[test]
    fn notice_expires_after_ttl() {
        let start = Instant::now();
        let notice = Notice::reset(Duration::from_secs(5), start);
        assert_eq!(notice.text, RESET_NOTICE);
        assert!(!notice.is_expired(start));
        assert!(!notice.is_expired(start + Duration::from_millis(4999)));
        assert!(notice.is_expired(start + Duration::from_secs(5)));
    }
}
