use chrono::NaiveDate;

use crate::model::history::{DayStatus, History, HistoryEntry};
use crate::model::tree::Tree;

/// Count `(completed, total)` checklist items across the whole tree.
pub fn count_items(tree: &Tree) -> (usize, usize) {
    tree.items().fold((0, 0), |(done, total), item| {
        (done + usize::from(item.completed), total + 1)
    })
}

/// Record the tree's current completion as the outcome for `date`.
/// The entry goes to the front of the log; the log stays capped.
pub fn record_snapshot(history: &mut History, date: NaiveDate, tree: &Tree) -> HistoryEntry {
    let (completed, total) = count_items(tree);
    let entry = HistoryEntry {
        date,
        status: DayStatus::classify(completed, total),
        completed_tasks: completed,
        total_tasks: total,
    };
    history.push_front(entry.clone());
    entry
}

/// The first `n` entries, most recent first.
pub fn recent_entries(history: &History, n: usize) -> &[HistoryEntry] {
    let entries = history.entries();
    &entries[..n.min(entries.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::history::HISTORY_CAP;
    use crate::model::tree::{ChecklistItem, Subtitle, Title};
    use chrono::Days;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Days::new(n)
    }

    fn tree_with(states: &[bool]) -> Tree {
        let mut sub = Subtitle::new("s".into(), "Sub".into());
        for (i, done) in states.iter().enumerate() {
            let mut item = ChecklistItem::new(format!("c{}", i), "x".into());
            item.completed = *done;
            sub.checklist.push(item);
        }
        let mut title = Title::new("t".into(), "T".into());
        title.subtitles.push(sub);
        Tree { titles: vec![title] }
    }

    #[test]
    fn snapshot_counts_and_classifies() {
        let mut history = History::new();

        let e = record_snapshot(&mut history, day(0), &tree_with(&[true, true]));
        assert_eq!((e.status, e.completed_tasks, e.total_tasks), (DayStatus::Completed, 2, 2));

        let e = record_snapshot(&mut history, day(1), &tree_with(&[true, false, false]));
        assert_eq!((e.status, e.completed_tasks, e.total_tasks), (DayStatus::Partial, 1, 3));

        let e = record_snapshot(&mut history, day(2), &tree_with(&[false]));
        assert_eq!((e.status, e.completed_tasks, e.total_tasks), (DayStatus::Incomplete, 0, 1));
    }

    #[test]
    fn empty_tree_is_incomplete() {
        let mut history = History::new();
        let e = record_snapshot(&mut history, day(0), &Tree::new());
        assert_eq!(e.status, DayStatus::Incomplete);
        assert_eq!(e.completed_tasks, 0);
        assert_eq!(e.total_tasks, 0);
    }

    #[test]
    fn snapshot_ignores_parent_flags() {
        // A title toggled complete with no items still counts nothing
        let mut tree = Tree {
            titles: vec![Title::new("t".into(), "T".into())],
        };
        tree.titles[0].completed = true;
        assert_eq!(count_items(&tree), (0, 0));
    }

    #[test]
    fn log_is_capped_and_most_recent_first() {
        let mut history = History::new();
        let tree = Tree::new();
        for n in 0..=HISTORY_CAP as u64 {
            record_snapshot(&mut history, day(n), &tree);
        }
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history.entries()[0].date, day(HISTORY_CAP as u64));
        assert!(history.entries().iter().all(|e| e.date != day(0)));
        assert!(history.entries().windows(2).all(|w| w[0].date > w[1].date));
    }

    #[test]
    fn recent_entries_is_a_prefix() {
        let mut history = History::new();
        for n in 0..3 {
            record_snapshot(&mut history, day(n), &Tree::new());
        }
        let recent = recent_entries(&history, 7);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent_entries(&history, 2)[0].date, day(2));
        assert_eq!(recent_entries(&history, 0).len(), 0);
        assert_eq!(history.len(), 3);
    }
}
