// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for the persistence layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("the declared DAG no longer matches the persisted one at {path} — create a new Flow directory")]
    FlowMutated { path: String },
    #[error("flow.json not found at {0}")]
    FlowNotFound(String),
}
