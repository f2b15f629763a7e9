// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory file locking for the `.lock` sidecar files that guard every
//! status read/write (§4.A, §9 "Status file lock").
//!
//! Unlike a daemon's single-instance lock (which uses a non-blocking
//! `try_lock_exclusive` and fails fast), concurrent readers/writers of the
//! same status file are expected and must simply wait their turn, so this
//! uses the blocking `lock_exclusive`. The guard releases the lock in its
//! `Drop` impl so every exit path — including a `?`-propagated JSON parse
//! error between acquire and intended release — still unlocks.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// An acquired advisory lock on a `<path>.lock` sidecar file.
///
/// Dropping the guard releases the lock. The guard does not hold the
/// protected data; callers read/write the real file themselves while the
/// guard is alive.
pub struct FileLockGuard {
    file: File,
    lock_path: PathBuf,
}

impl FileLockGuard {
    /// Block until an exclusive lock on `<path>.lock` is acquired, creating
    /// the sidecar file (and its parent directory) if necessary.
    ///
    /// Uses `OpenOptions` without truncation so a lock file that happens to
    /// carry diagnostic content from a previous run isn't wiped before the
    /// lock is held.
    pub fn acquire(path: &Path) -> Result<Self, StorageError> {
        let lock_path = lock_path_for(path);
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        file.lock_exclusive()?;
        Ok(Self { file, lock_path })
    }
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        // Best-effort: a failed unlock here just leaves an advisory lock
        // held until the fd closes anyway, which happens immediately after.
        let _ = FileExt::unlock(&self.file);
    }
}

/// The sidecar lock path for a given status/data file: `<path>.lock`.
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".lock");
    PathBuf::from(os)
}

#[cfg(test)]
#[path = "lockfile_tests.rs"]
mod tests;
