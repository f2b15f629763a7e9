// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for scheduler script construction and submission.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid submit option: {0}")]
    InvalidSubmitOption(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("submission failed: {0}")]
    SubmitFailed(String),
}
