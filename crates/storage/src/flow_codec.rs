// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `flow.json` wire format (§6) and its SHA-256 integrity hash (§4.C).
//!
//! These are plain DTOs: `tg-flow` owns the live `Context`/`Task`/`Dataset`
//! domain types and converts to/from [`FlowFile`] at the Flow/load boundary.
//! Keeping the codec here, one layer below the domain model, is what lets
//! the round-trip and integrity-hash properties (§8, properties 1-3) be
//! tested without constructing a full DAG.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::atomic::atomic_write_fs;
use crate::error::StorageError;

/// A dataset entry in `flow.json`'s `datasets` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub name: String,
    pub path: String,
    pub from_task: Option<String>,
}

/// An image entry in `flow.json`'s `images` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub name: String,
    pub path: String,
}

/// A task entry in `flow.json`'s `tasks` map, keyed by the string form of
/// its `task_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: u32,
    pub name: String,
    pub image: Option<String>,
    pub command: String,
    pub input_data: String,
    pub outputs: IndexMap<String, String>,
    pub partition: String,
    pub secondary_data: IndexMap<String, String>,
    pub binds: IndexMap<String, String>,
    pub envs: IndexMap<String, String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
}

/// The extra, free-form parameters carried alongside a Flow (§3).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtraParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtualenv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_for_trigger: Option<String>,
}

/// The full contents of `flow.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowFile {
    pub path: String,
    pub extra_params: ExtraParams,
    pub datasets: IndexMap<String, DatasetRecord>,
    pub images: IndexMap<String, ImageRecord>,
    pub tasks: IndexMap<String, TaskRecord>,
}

impl FlowFile {
    /// Canonical byte serialization used both to write the file and to
    /// compute its integrity hash. `indexmap` preserves insertion order, so
    /// two calls over an unchanged `FlowFile` are byte-identical.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// SHA-256 of [`Self::canonical_bytes`], hex-encoded.
    pub fn hash(&self) -> Result<String, StorageError> {
        let bytes = self.canonical_bytes()?;
        Ok(hash_bytes(&bytes))
    }
}

/// SHA-256 of arbitrary bytes, hex-encoded. Used to hash both an in-memory
/// candidate `FlowFile` and the bytes already on disk, per §4.C.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Write `flow.json` at `path` (must not already exist as far as the caller
/// is concerned — callers enforce the "written once" invariant of §5).
pub fn dump(flow: &FlowFile, path: &Path) -> Result<(), StorageError> {
    let bytes = flow.canonical_bytes()?;
    atomic_write_fs(path, &bytes)
}

/// Load `flow.json` from `path`.
pub fn load(path: &Path) -> Result<FlowFile, StorageError> {
    if !path.exists() {
        return Err(StorageError::FlowNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// SHA-256 of the `flow.json` currently on disk at `path`.
pub fn hash_on_disk(path: &Path) -> Result<String, StorageError> {
    let bytes = std::fs::read(path)?;
    Ok(hash_bytes(&bytes))
}

#[cfg(test)]
#[path = "flow_codec_tests.rs"]
mod tests;
