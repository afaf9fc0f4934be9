use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::store_io::{HISTORY_FILE, RESET_DATE_FILE, TREE_FILE};

/// Events sent from the file watcher to the TUI event loop.
#[derive(Debug)]
pub enum FileEvent {
    /// One or more data files changed on disk.
    Changed(Vec<PathBuf>),
}

/// Whether a path is one of the persisted data files
pub fn is_data_file(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        Some(TREE_FILE) | Some(HISTORY_FILE) | Some(RESET_DATE_FILE)
    )
}

/// A file system watcher for the data directory.
pub struct DataWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl DataWatcher {
    /// Start watching the given data directory.
    /// `poll()` should be called each tick.
    pub fn start(data_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };

                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                let relevant: Vec<PathBuf> = event
                    .paths
                    .into_iter()
                    .filter(|p| is_data_file(p))
                    .collect();

                if !relevant.is_empty() {
                    let _ = tx.send(FileEvent::Changed(relevant));
                }
            },
            Config::default(),
        )?;

        watcher.watch(data_dir, RecursiveMode::NonRecursive)?;
        Ok(DataWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending file events.
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_data_files_are_relevant() {
        assert!(is_data_file(Path::new("/d/hierarchical_tasks.json")));
        assert!(is_data_file(Path::new("/d/task_history.json")));
        assert!(is_data_file(Path::new("/d/last_reset_date")));
        assert!(!is_data_file(Path::new("/d/.lock")));
        assert!(!is_data_file(Path::new("/d/checklist.log")));
        assert!(!is_data_file(Path::new("/d/.tmpXYZ")));
    }
}
