// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `jobs/inputs/job_<id>.json` wire format (§6).
//!
//! A job descriptor embeds resolved [`DatasetRecord`]/[`ImageRecord`]
//! sub-objects rather than bare names, so a job runner can execute without
//! reloading the full Context — it only ever reads the one file.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::atomic::atomic_write_fs;
use crate::error::StorageError;
use crate::flow_codec::{DatasetRecord, ImageRecord};

/// An output slot: the filename template (still containing its `%KEY`
/// token) and the dataset it is ultimately published into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub filename_template: String,
    pub dataset: DatasetRecord,
}

/// The full contents of a `jobs/inputs/job_<id>.json` file. Written once at
/// fan-out time and never mutated afterward (§5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: u32,
    pub task_name: String,
    pub command: String,
    pub input_file: String,
    pub input_dataset: DatasetRecord,
    pub image: Option<ImageRecord>,
    pub secondary_data: IndexMap<String, DatasetRecord>,
    pub outputs: IndexMap<String, OutputSpec>,
    pub binds: IndexMap<String, String>,
    pub envs: IndexMap<String, String>,
}

impl JobRecord {
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Write a job descriptor. Callers are responsible for only calling this
/// once per job-id (append-only fan-out, §5).
pub fn dump(job: &JobRecord, path: &Path) -> Result<(), StorageError> {
    let bytes = job.canonical_bytes()?;
    atomic_write_fs(path, &bytes)
}

/// Load a job descriptor.
pub fn load(path: &Path) -> Result<JobRecord, StorageError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
#[path = "job_codec_tests.rs"]
mod tests;
