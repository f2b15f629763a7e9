// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable atomic writes: write to a `.tmp` sibling, fsync it, rename over
//! the destination, fsync the containing directory.
//!
//! The `AtomicWriter` trait abstracts the raw filesystem calls so tests can
//! substitute a fake and assert on call order / inject failures without
//! touching a real filesystem.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Abstracts the filesystem operations behind an atomic write, for
/// testability.
pub trait AtomicWriter: Send + Sync {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), StorageError>;
    fn fsync_file(&self, path: &Path) -> Result<(), StorageError>;
    fn rename(&self, from: &Path, to: &Path) -> Result<(), StorageError>;
    fn fsync_dir(&self, path: &Path) -> Result<(), StorageError>;
}

/// Production writer using real filesystem operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAtomicWriter;

impl AtomicWriter for FsAtomicWriter {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(data)?;
        Ok(())
    }

    fn fsync_file(&self, path: &Path) -> Result<(), StorageError> {
        File::open(path)?.sync_all()?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        std::fs::rename(from, to)?;
        Ok(())
    }

    fn fsync_dir(&self, path: &Path) -> Result<(), StorageError> {
        File::open(path)?.sync_all()?;
        Ok(())
    }
}

/// Write `data` to `path` durably: tmp file, fsync, rename, fsync directory.
pub fn atomic_write(writer: &impl AtomicWriter, path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let tmp_path = tmp_path_for(path);
    writer.write_tmp(&tmp_path, data)?;
    writer.fsync_file(&tmp_path)?;
    writer.rename(&tmp_path, path)?;
    if let Some(parent) = path.parent() {
        writer.fsync_dir(parent)?;
    }
    Ok(())
}

/// Write with the production [`FsAtomicWriter`].
pub fn atomic_write_fs(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    atomic_write(&FsAtomicWriter, path, data)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
