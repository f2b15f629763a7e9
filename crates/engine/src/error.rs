// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for the job-runner and task-runner execution paths.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Flow(#[from] tg_flow::FlowError),
    #[error(transparent)]
    Storage(#[from] tg_storage::StorageError),
    #[error(transparent)]
    Scheduler(#[from] tg_scheduler::SchedulerError),
    #[error("unknown task id {0}")]
    UnknownTask(tg_core::TaskId),
}

pub type Result<T> = std::result::Result<T, EngineError>;
