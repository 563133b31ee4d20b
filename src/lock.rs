//! File locking and atomic writes for the event store.
//!
//! Two instances of nudge may point at the same store file (two terminals,
//! a watch process plus one-shot commands). Writers take an exclusive
//! advisory lock on a sidecar `.lock` file and replace the store with a
//! temp-file-plus-rename, so readers never observe a half-written blob.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

const LOCK_RETRY_INTERVAL_MS: u64 = 50;

fn is_lock_contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // Windows reports lock/sharing violations through raw OS errors rather
    // than WouldBlock; treat those as contention so the retry loop applies.
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

/// An exclusive lock on a sidecar file, released on drop.
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Acquire the lock, retrying until `timeout_ms` elapses.
    ///
    /// The lock file is created if missing. Contention past the timeout
    /// surfaces as `Error::LockFailed`.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);
        let retry = Duration::from_millis(LOCK_RETRY_INTERVAL_MS);

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(StoreLock {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if is_lock_contended(&e) => {
                    if start.elapsed() >= timeout {
                        return Err(Error::LockFailed(path.to_path_buf()));
                    }
                    std::thread::sleep(retry);
                }
                Err(e) => {
                    return Err(Error::Io(e));
                }
            }
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

/// Replace `path` with `data` atomically: write a `.tmp` sibling, fsync,
/// then rename over the destination.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Conventional lock-file path for a store file (`<store>.lock`).
pub fn lock_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.lock", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_replaces_contents() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("store.json");

        write_atomic(&target, b"[1,2,3]").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "[1,2,3]");

        write_atomic(&target, b"[]").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "[]");

        // No temp file left behind
        assert!(!target.with_extension("tmp").exists());
    }

    #[test]
    fn write_atomic_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested/dir/store.json");

        write_atomic(&target, b"{}").unwrap();
        assert!(target.exists());
    }

    #[test]
    fn lock_acquire_and_release() {
        let temp = TempDir::new().unwrap();
        let lock_file = temp.path().join("store.json.lock");

        let lock = StoreLock::acquire(&lock_file, DEFAULT_LOCK_TIMEOUT_MS).unwrap();
        assert_eq!(lock.path(), lock_file);
        drop(lock);

        // Re-acquirable after release
        let again = StoreLock::acquire(&lock_file, DEFAULT_LOCK_TIMEOUT_MS);
        assert!(again.is_ok());
    }

    #[test]
    fn contended_lock_times_out() {
        let temp = TempDir::new().unwrap();
        let lock_file = temp.path().join("store.json.lock");

        let _held = StoreLock::acquire(&lock_file, DEFAULT_LOCK_TIMEOUT_MS).unwrap();

        // Same-process relock through a second handle must wait and fail.
        match StoreLock::acquire(&lock_file, 200) {
            Err(Error::LockFailed(path)) => assert_eq!(path, lock_file),
            Err(other) => panic!("expected LockFailed, got {other}"),
            Ok(_) => panic!("lock unexpectedly acquired while held"),
        }
    }

    #[test]
    fn lock_path_convention() {
        let store = Path::new("/tmp/events.json");
        assert_eq!(lock_path_for(store), PathBuf::from("/tmp/events.json.lock"));
    }
}
