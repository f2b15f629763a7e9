// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for DAG construction, Task/Dataset/Image validation, and
//! Flow session lifecycle.

use thiserror::Error;
use tg_core::TaskId;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("dataset {0:?} is not registered")]
    DatasetNotFound(String),
    #[error("image {0:?} is not registered")]
    ImageNotFound(String),
    #[error("dataset {0:?} is already registered")]
    DatasetExists(String),
    #[error("image {0:?} is already registered")]
    ImageExists(String),
    #[error("task {0:?} is already registered")]
    TaskExists(String),
    #[error("command for task {task:?} never references placeholder %{placeholder}")]
    PlaceholderMissing { task: String, placeholder: String },
    #[error("adding task {0:?} would introduce a cycle in the DAG")]
    CycleDetected(String),
    #[error("unknown task id {0}")]
    InvalidTaskId(TaskId),
    #[error("invalid config file: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Storage(#[from] tg_storage::StorageError),
    #[error(transparent)]
    Scheduler(#[from] tg_scheduler::SchedulerError),
}

pub type Result<T> = std::result::Result<T, FlowError>;
