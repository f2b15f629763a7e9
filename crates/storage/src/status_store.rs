// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locked, on-disk persistence for [`tg_core::Status`] (§4.A).
//!
//! Every read and every write takes the paired `.lock` file first, so a
//! task-init process, a job runner, and a task-next process can all touch
//! the same status file without losing an update. The lock is released by
//! [`FileLockGuard`]'s `Drop`, so a JSON-parse error between acquiring the
//! lock and returning still releases it.

use std::path::Path;

use tg_core::clock::Clock;
use tg_core::{State, Status};

use crate::atomic::atomic_write_fs;
use crate::error::StorageError;
use crate::lockfile::FileLockGuard;

/// Load the status at `path`, returning `Status::new(now)` (`REGISTERED`) if
/// the file does not exist yet — mirroring a Job/Task that has been
/// registered in the Context but has no on-disk status yet.
pub fn load_status(path: &Path, clock: &dyn Clock) -> Result<Status, StorageError> {
    let _guard = FileLockGuard::acquire(path)?;
    read_unlocked(path, clock)
}

/// Persist `status` to `path` under lock.
pub fn store_status(path: &Path, status: &Status) -> Result<(), StorageError> {
    let _guard = FileLockGuard::acquire(path)?;
    write_unlocked(path, status)
}

/// Set `state`, leaving `ping` untouched, under a single lock acquisition
/// (read-modify-write).
pub fn set_state(path: &Path, state: State, clock: &dyn Clock) -> Result<Status, StorageError> {
    let _guard = FileLockGuard::acquire(path)?;
    let mut status = read_unlocked(path, clock)?;
    status.set(state);
    write_unlocked(path, &status)?;
    Ok(status)
}

/// Record a liveness heartbeat under a single lock acquisition.
pub fn ping(path: &Path, clock: &dyn Clock) -> Result<Status, StorageError> {
    let _guard = FileLockGuard::acquire(path)?;
    let mut status = read_unlocked(path, clock)?;
    status.ping(clock.now());
    write_unlocked(path, &status)?;
    Ok(status)
}

/// Reset to `ASSIGNED` with a fresh ping, under a single lock acquisition.
pub fn reset(path: &Path, clock: &dyn Clock) -> Result<Status, StorageError> {
    let _guard = FileLockGuard::acquire(path)?;
    let mut status = read_unlocked(path, clock)?;
    status.reset(clock.now());
    write_unlocked(path, &status)?;
    Ok(status)
}

/// Read-modify-write `f` over the status at `path`, under a single lock
/// acquisition, returning the status as left by `f`.
pub fn update(
    path: &Path,
    clock: &dyn Clock,
    f: impl FnOnce(&mut Status),
) -> Result<Status, StorageError> {
    let _guard = FileLockGuard::acquire(path)?;
    let mut status = read_unlocked(path, clock)?;
    f(&mut status);
    write_unlocked(path, &status)?;
    Ok(status)
}

fn read_unlocked(path: &Path, clock: &dyn Clock) -> Result<Status, StorageError> {
    if !path.exists() {
        return Ok(Status::new(clock.now()));
    }
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn write_unlocked(path: &Path, status: &Status) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(status)?;
    atomic_write_fs(path, &bytes)
}

#[cfg(test)]
#[path = "status_store_tests.rs"]
mod tests;
