use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Name of the lock file inside a data directory. It is created once and never
/// removed, so every process contends on the same inode.
pub const LOCK_FILE: &str = ".lock";

/// How long a writer waits for another `ck` process by default
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("timed out waiting for {path}: another ck process is busy with this data directory")]
    Timeout { path: PathBuf },
}

/// Exclusive advisory lock on a data directory.
///
/// Held for as long as the value lives; the flock goes away when the file
/// handle closes.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
}

impl FileLock {
    /// Lock `data_dir`, polling until `timeout` runs out.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        while !try_exclusive(&file) {
            if Instant::now() >= deadline {
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(RETRY_INTERVAL);
        }
        Ok(FileLock { _file: file })
    }

    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, DEFAULT_LOCK_TIMEOUT)
    }
}

/// Non-blocking exclusive flock
#[cfg(unix)]
fn try_exclusive(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

#[cfg(not(unix))]
fn try_exclusive(_file: &File) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn released_on_drop() {
        let tmp = TempDir::new().unwrap();
        let first = FileLock::acquire_default(tmp.path()).unwrap();
        drop(first);
        assert!(FileLock::acquire(tmp.path(), Duration::ZERO).is_ok());
    }

    #[test]
    fn lock_file_outlives_the_lock() {
        let tmp = TempDir::new().unwrap();
        drop(FileLock::acquire_default(tmp.path()).unwrap());
        assert!(tmp.path().join(LOCK_FILE).exists());
    }

    #[cfg(unix)]
    #[test]
    fn second_holder_times_out() {
        let tmp = TempDir::new().unwrap();
        let _held = FileLock::acquire_default(tmp.path()).unwrap();

        let start = Instant::now();
        let second = FileLock::acquire(tmp.path(), Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Timeout { .. })));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn missing_directory_is_a_create_error() {
        let tmp = TempDir::new().unwrap();
        let result = FileLock::acquire_default(&tmp.path().join("absent"));
        assert!(matches!(result, Err(LockError::CreateError { .. })));
    }
}
