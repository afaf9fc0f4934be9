use std::cell::Cell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::io::lock::{DEFAULT_LOCK_TIMEOUT, FileLock, LockError};
use crate::model::history::{History, HistoryEntry};
use crate::model::tree::Tree;

/// File holding the title/subtitle/item tree
pub const TREE_FILE: &str = "hierarchical_tasks.json";
/// File holding the history log
pub const HISTORY_FILE: &str = "task_history.json";
/// File holding the last reset date
pub const RESET_DATE_FILE: &str = "last_reset_date";

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not serialize {0}: {1}")]
    SerializeError(&'static str, serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("storage unavailable")]
    Unavailable,
}

/// Everything the gateway persists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedState {
    pub tree: Tree,
    pub history: History,
    pub last_reset: Option<NaiveDate>,
}

/// Load/save boundary for the checklist state.
///
/// `load` never fails: missing or unreadable data comes back as defaults.
pub trait Persistence {
    fn load(&self) -> LoadedState;
    fn save_tree(&self, tree: &Tree) -> Result<(), StoreError>;
    fn save_history(&self, history: &History) -> Result<(), StoreError>;
    fn save_last_reset_date(&self, date: NaiveDate) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// JSON files in a data directory, one per data set.
///
/// Each write takes the directory lock unless a [`StoreGuard`] from
/// [`FileStore::lock`] is already alive, in which case the caller owns it.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout: Duration,
    guarded: Rc<Cell<bool>>,
}

/// Holds the data-directory lock across a whole load/mutate/save sequence
#[derive(Debug)]
pub struct StoreGuard {
    _lock: FileLock,
    guarded: Rc<Cell<bool>>,
}

impl Drop for StoreGuard {
    fn drop(&mut self) {
        self.guarded.set(false);
    }
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore {
            dir: dir.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            guarded: Rc::new(Cell::new(false)),
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Take the directory lock until the guard drops. Writes made through
    /// this store (or its clones) meanwhile do not lock again.
    pub fn lock(&self) -> Result<StoreGuard, StoreError> {
        self.ensure_dir()?;
        let lock = FileLock::acquire(&self.dir, self.lock_timeout)?;
        self.guarded.set(true);
        Ok(StoreGuard {
            _lock: lock,
            guarded: Rc::clone(&self.guarded),
        })
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::WriteError {
            path: self.dir.clone(),
            source: e,
        })
    }

    fn write(&self, name: &str, content: &[u8]) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let _lock = if self.guarded.get() {
            None
        } else {
            Some(FileLock::acquire(&self.dir, self.lock_timeout)?)
        };
        let path = self.dir.join(name);
        atomic_write(&path, content).map_err(|e| StoreError::WriteError { path, source: e })?;
        debug!(file = name, bytes = content.len(), "saved");
        Ok(())
    }

    /// Read and parse a JSON file. Missing files yield `None`; a file that
    /// fails to parse is moved aside to `<name>.bak` and also yields `None`.
    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.dir.join(name);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                self.quarantine(&path, &e.to_string());
                None
            }
        }
    }

    fn read_reset_date(&self) -> Option<NaiveDate> {
        let path = self.dir.join(RESET_DATE_FILE);
        let content = fs::read_to_string(&path).ok()?;
        match content.trim().parse::<NaiveDate>() {
            Ok(date) => Some(date),
            Err(e) => {
                self.quarantine(&path, &e.to_string());
                None
            }
        }
    }

    fn quarantine(&self, path: &Path, reason: &str) {
        let backup = path.with_extension("bak");
        warn!(path = %path.display(), reason, "stored data is corrupt, starting empty");
        if let Err(e) = fs::rename(path, &backup) {
            warn!(path = %path.display(), error = %e, "could not move corrupt file aside");
        }
    }
}

impl Persistence for FileStore {
    fn load(&self) -> LoadedState {
        let tree = self.read_json::<Tree>(TREE_FILE).unwrap_or_default();
        let history = self
            .read_json::<Vec<HistoryEntry>>(HISTORY_FILE)
            .map(History::from_entries)
            .unwrap_or_default();
        let last_reset = self.read_reset_date();
        LoadedState {
            tree,
            history,
            last_reset,
        }
    }

    fn save_tree(&self, tree: &Tree) -> Result<(), StoreError> {
        let content =
            serde_json::to_vec_pretty(tree).map_err(|e| StoreError::SerializeError("tree", e))?;
        self.write(TREE_FILE, &content)
    }

    fn save_history(&self, history: &History) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(history)
            .map_err(|e| StoreError::SerializeError("history", e))?;
        self.write(HISTORY_FILE, &content)
    }

    fn save_last_reset_date(&self, date: NaiveDate) -> Result<(), StoreError> {
        let content = format!("{}\n", date.format("%Y-%m-%d"));
        self.write(RESET_DATE_FILE, content.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use memory::MemoryStore;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::history::DayStatus;
    use crate::model::tree::Title;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_state() -> LoadedState {
        let mut tree = Tree::new();
        tree.titles.push(Title::new("t1".into(), "Morning".into()));
        let mut history = History::new();
        history.push_front(HistoryEntry {
            date: NaiveDate::from_ymd_opt(2025, 5, 4).unwrap(),
            status: DayStatus::Partial,
            completed_tasks: 1,
            total_tasks: 2,
        });
        LoadedState {
            tree,
            history,
            last_reset: NaiveDate::from_ymd_opt(2025, 5, 5),
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        let state = sample_state();

        store.save_tree(&state.tree).unwrap();
        store.save_history(&state.history).unwrap();
        store.save_last_reset_date(state.last_reset.unwrap()).unwrap();

        assert_eq!(store.load(), state);
        let raw = fs::read_to_string(tmp.path().join(RESET_DATE_FILE)).unwrap();
        assert_eq!(raw, "2025-05-05\n");
    }

    #[test]
    fn load_empty_directory_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("not-yet-created"));
        assert_eq!(store.load(), LoadedState::default());
    }

    #[test]
    fn corrupt_tree_fails_closed_and_is_backed_up() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(TREE_FILE), "not json {{{").unwrap();
        fs::write(tmp.path().join(RESET_DATE_FILE), "2025-05-05").unwrap();
        let store = FileStore::new(tmp.path());

        let loaded = store.load();
        assert!(loaded.tree.is_empty());
        assert_eq!(loaded.last_reset, NaiveDate::from_ymd_opt(2025, 5, 5));
        assert!(tmp.path().join("hierarchical_tasks.bak").exists());
        assert!(!tmp.path().join(TREE_FILE).exists());
    }

    #[test]
    fn corrupt_reset_date_is_treated_as_unset() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(RESET_DATE_FILE), "yesterday-ish").unwrap();
        let store = FileStore::new(tmp.path());
        assert_eq!(store.load().last_reset, None);
    }

    #[test]
    fn reads_original_storage_shape() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(TREE_FILE),
            r#"[{"id":"a","text":"Home","completed":false,"expanded":true,
                "subtitles":[{"id":"b","text":"Kitchen","completed":true,"expanded":false,
                  "checklist":[{"id":"c","text":"Dishes","completed":true}]}]}]"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join(HISTORY_FILE),
            r#"[{"date":"2025-05-04","status":"completed","completedTasks":1,"totalTasks":1}]"#,
        )
        .unwrap();
        let loaded = FileStore::new(tmp.path()).load();
        assert!(loaded.tree.item("a", "b", "c").unwrap().completed);
        assert_eq!(loaded.history.entries()[0].status, DayStatus::Completed);
    }

    #[test]
    fn memory_store_can_fail_writes() {
        let store = MemoryStore::new();
        store.save_tree(&Tree::new()).unwrap();
        store.set_failing(true);
        assert!(matches!(
            store.save_last_reset_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            Err(StoreError::Unavailable)
        ));
        assert_eq!(store.stored().last_reset, None);
        assert_eq!(store.writes(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn guard_serializes_whole_sessions() {
        let tmp = TempDir::new().unwrap();
        let owner = FileStore::new(tmp.path());
        let other = FileStore::new(tmp.path()).with_lock_timeout(Duration::from_millis(50));

        let guard = owner.lock().unwrap();
        // The owner keeps writing under its own guard
        owner.save_tree(&sample_state().tree).unwrap();
        assert!(matches!(
            other.save_tree(&Tree::new()),
            Err(StoreError::Lock(LockError::Timeout { .. }))
        ));
        assert!(matches!(other.lock(), Err(StoreError::Lock(_))));

        drop(guard);
        let _second = other.lock().unwrap();
        other.save_tree(&Tree::new()).unwrap();
        assert!(other.load().tree.is_empty());
    }

    #[test]
    fn locked_read_modify_write_keeps_both_updates() {
        let tmp = TempDir::new().unwrap();
        for text in ["From A", "From B"] {
            let store = FileStore::new(tmp.path());
            let _guard = store.lock().unwrap();
            let mut tree = store.load().tree;
            tree.titles.push(Title::new(text.to_lowercase(), text.into()));
            store.save_tree(&tree).unwrap();
        }
        let texts: Vec<String> = FileStore::new(tmp.path())
            .load()
            .tree
            .titles
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["From A", "From B"]);
    }

    #[test]
    fn clones_share_the_guard() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).with_lock_timeout(Duration::from_millis(50));
        let clone = store.clone();
        let _guard = store.lock().unwrap();
        clone.save_last_reset_date(NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()).unwrap();
    }
}
