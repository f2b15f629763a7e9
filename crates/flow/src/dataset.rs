// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A named collection of files produced by, at most, one task (§4.B).

use std::path::{Path, PathBuf};

use crate::error::{FlowError, Result};

/// A registered dataset: a directory of files, optionally tagged with the
/// name of the task that produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    name: String,
    path: PathBuf,
    producer: Option<String>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, producer: Option<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            producer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn producer(&self) -> Option<&str> {
        self.producer.as_deref()
    }

    /// Enumerate the files currently in this dataset's directory, in
    /// lexicographic order of basename, so that job-id assignment in
    /// `_update_jobs` is deterministic (§4.B, §8 property 1).
    ///
    /// Returns an empty list if the directory doesn't exist yet — a
    /// producing task may not have created it before the first poll.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut entries: Vec<PathBuf> = std::fs::read_dir(&self.path)
            .map_err(tg_storage::StorageError::from)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .collect();
        entries.sort();
        Ok(entries)
    }
}

/// Either a dataset name to resolve against the Context, or an owned
/// [`Dataset`] handle already constructed by the caller (§9, "Polymorphic
/// 'dataset or name'").
#[derive(Debug, Clone)]
pub enum DatasetRef {
    ByName(String),
    ByHandle(Dataset),
}

impl From<&str> for DatasetRef {
    fn from(name: &str) -> Self {
        DatasetRef::ByName(name.to_string())
    }
}

impl From<String> for DatasetRef {
    fn from(name: String) -> Self {
        DatasetRef::ByName(name)
    }
}

impl From<Dataset> for DatasetRef {
    fn from(dataset: Dataset) -> Self {
        DatasetRef::ByHandle(dataset)
    }
}

impl DatasetRef {
    /// The dataset's name, without resolving against a Context.
    pub fn name(&self) -> &str {
        match self {
            DatasetRef::ByName(name) => name,
            DatasetRef::ByHandle(dataset) => dataset.name(),
        }
    }

    pub(crate) fn not_found(name: &str) -> FlowError {
        FlowError::DatasetNotFound(name.to_string())
    }
}

#[cfg(test)]
#[path = "dataset_tests.rs"]
mod tests;
