//! The single owner of checklist state.
//!
//! A `Session` holds the tree, the history log and the last-reset marker,
//! applies every mutation through `ops`, and saves through a `Persistence`
//! gateway. Mutations return `true` when something changed so the caller can
//! decide when to redraw. Save failures are logged and never undo the
//! in-memory change.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::io::store_io::Persistence;
use crate::model::history::{History, HistoryEntry};
use crate::model::tree::Tree;
use crate::ops::rollover::{Clock, RolloverOutcome, roll_over};
use crate::ops::{history_ops, propagate, store_ops};

/// Result of a rollover check that actually rolled over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverReport {
    pub outcome: RolloverOutcome,
    /// False when any write failed; the rollover will repeat on next load
    pub persisted: bool,
}

pub struct Session<P: Persistence, C: Clock> {
    store: P,
    clock: C,
    tree: Tree,
    history: History,
    last_reset: Option<NaiveDate>,
    selected_title: Option<String>,
}

impl<P: Persistence, C: Clock> Session<P, C> {
    /// Load stored state. Does not run the rollover check; call
    /// [`Session::check_rollover`] once the caller is ready to show its notice.
    pub fn open(store: P, clock: C) -> Self {
        let loaded = store.load();
        debug!(
            titles = loaded.tree.titles.len(),
            history = loaded.history.len(),
            last_reset = ?loaded.last_reset,
            "session loaded"
        );
        Session {
            store,
            clock,
            tree: loaded.tree,
            history: loaded.history,
            last_reset: loaded.last_reset,
            selected_title: None,
        }
    }

    /// Replace in-memory state with what is stored, keeping the selection if
    /// the selected title still exists.
    ///
    /// Stored data whose reset date is older than the in-memory one predates
    /// a rollover this process could not save; it is ignored so the reset is
    /// not undone or repeated before the next start.
    pub fn reload(&mut self) {
        let loaded = self.store.load();
        if loaded.last_reset < self.last_reset {
            debug!(
                stored = ?loaded.last_reset,
                in_memory = ?self.last_reset,
                "stored state predates this session's rollover, keeping memory"
            );
            return;
        }
        self.tree = loaded.tree;
        self.history = loaded.history;
        self.last_reset = loaded.last_reset;
        if let Some(id) = &self.selected_title
            && self.tree.title(id).is_none()
        {
            self.selected_title = None;
        }
    }

    // -----------------------------------------------------------------------
    // Read-only views
    // -----------------------------------------------------------------------

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn recent_history(&self, n: usize) -> &[HistoryEntry] {
        history_ops::recent_entries(&self.history, n)
    }

    pub fn last_reset(&self) -> Option<NaiveDate> {
        self.last_reset
    }

    pub fn selected_title(&self) -> Option<&str> {
        self.selected_title.as_deref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // -----------------------------------------------------------------------
    // Entity store
    // -----------------------------------------------------------------------

    /// Add a title. Returns `None` if the text is blank.
    pub fn add_title(&mut self, text: &str) -> Option<String> {
        let text = store_ops::normalize_text(text)?;
        let id = store_ops::add_title(&mut self.tree, text);
        debug!(%id, "title added");
        self.persist_tree();
        Some(id)
    }

    /// Add a subtitle. Returns `None` if the text is blank or the title is missing.
    pub fn add_subtitle(&mut self, title_id: &str, text: &str) -> Option<String> {
        let text = store_ops::normalize_text(text)?;
        let id = store_ops::add_subtitle(&mut self.tree, title_id, text)?;
        debug!(%id, title_id, "subtitle added");
        self.persist_tree();
        Some(id)
    }

    /// Add a checklist item. Returns `None` if the text is blank or a parent is missing.
    pub fn add_checklist_item(&mut self, title_id: &str, subtitle_id: &str, text: &str) -> Option<String> {
        let text = store_ops::normalize_text(text)?;
        let id = store_ops::add_checklist_item(&mut self.tree, title_id, subtitle_id, text)?;
        debug!(%id, title_id, subtitle_id, "checklist item added");
        self.persist_tree();
        Some(id)
    }

    pub fn delete_title(&mut self, title_id: &str) -> bool {
        let changed = store_ops::delete_title(&mut self.tree, title_id);
        if changed {
            if self.selected_title.as_deref() == Some(title_id) {
                self.selected_title = None;
            }
            self.after_mutation("title deleted");
        }
        changed
    }

    pub fn delete_subtitle(&mut self, title_id: &str, subtitle_id: &str) -> bool {
        let changed = store_ops::delete_subtitle(&mut self.tree, title_id, subtitle_id);
        if changed {
            self.after_mutation("subtitle deleted");
        }
        changed
    }

    pub fn delete_checklist_item(&mut self, title_id: &str, subtitle_id: &str, item_id: &str) -> bool {
        let changed = store_ops::delete_checklist_item(&mut self.tree, title_id, subtitle_id, item_id);
        if changed {
            self.after_mutation("checklist item deleted");
        }
        changed
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    pub fn toggle_checklist_item(&mut self, title_id: &str, subtitle_id: &str, item_id: &str) -> bool {
        let changed = propagate::toggle_checklist_item(&mut self.tree, title_id, subtitle_id, item_id);
        if changed {
            self.after_mutation("checklist item toggled");
        }
        changed
    }

    pub fn toggle_subtitle(&mut self, title_id: &str, subtitle_id: &str) -> bool {
        let changed = propagate::toggle_subtitle(&mut self.tree, title_id, subtitle_id);
        if changed {
            self.after_mutation("subtitle toggled");
        }
        changed
    }

    pub fn toggle_title(&mut self, title_id: &str) -> bool {
        let changed = propagate::toggle_title(&mut self.tree, title_id);
        if changed {
            self.after_mutation("title toggled");
        }
        changed
    }

    // -----------------------------------------------------------------------
    // Expansion
    // -----------------------------------------------------------------------

    /// Expand or collapse a title (collapsing the others). An expanded title
    /// becomes the selection.
    pub fn toggle_title_expansion(&mut self, title_id: &str) -> bool {
        let Some(expanded) = store_ops::toggle_title_expansion(&mut self.tree, title_id) else {
            return false;
        };
        self.selected_title = expanded.then(|| title_id.to_string());
        self.after_mutation("title expansion toggled");
        true
    }

    pub fn toggle_subtitle_expansion(&mut self, title_id: &str, subtitle_id: &str) -> bool {
        if store_ops::toggle_subtitle_expansion(&mut self.tree, title_id, subtitle_id).is_none() {
            return false;
        }
        self.after_mutation("subtitle expansion toggled");
        true
    }

    // -----------------------------------------------------------------------
    // Rollover
    // -----------------------------------------------------------------------

    /// Roll over to today if the last reset was on another day (or never).
    ///
    /// In-memory state always transitions. If a write fails the report says
    /// so and, because the stored reset date did not advance, the next load
    /// will roll over again.
    pub fn check_rollover(&mut self) -> Option<RolloverReport> {
        let today = self.clock.today();
        let outcome = roll_over(&mut self.tree, &mut self.history, &mut self.last_reset, today)?;

        let mut persisted = true;
        if outcome.recorded.is_some() {
            persisted &= self.persist_history();
        }
        persisted &= self.persist_tree();
        persisted &= self.persist_reset_date(today);

        match &outcome.recorded {
            Some(entry) => info!(
                %today,
                recorded = %entry.date,
                status = %entry.status,
                completed = entry.completed_tasks,
                total = entry.total_tasks,
                persisted,
                "daily rollover"
            ),
            None => info!(%today, persisted, "first run, checklists initialized"),
        }
        if !persisted {
            warn!("rollover not fully saved; it will repeat on next start");
        }

        Some(RolloverReport { outcome, persisted })
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn after_mutation(&mut self, what: &str) {
        debug!("{}", what);
        self.persist_tree();
    }

    fn persist_tree(&self) -> bool {
        match self.store.save_tree(&self.tree) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not save checklist tree");
                false
            }
        }
    }

    fn persist_history(&self) -> bool {
        match self.store.save_history(&self.history) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not save history");
                false
            }
        }
    }

    fn persist_reset_date(&self, date: NaiveDate) -> bool {
        match self.store.save_last_reset_date(date) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not save last reset date");
                false
            }
        }
    }
}
