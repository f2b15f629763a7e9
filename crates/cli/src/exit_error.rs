// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A process exit code carried through an `anyhow::Error` chain (§4.K).

use std::fmt;

/// Wraps a non-default exit code so `main` can recover it via
/// `anyhow::Error::downcast_ref` without widening every command's return
/// type to something richer than `anyhow::Result<()>`.
#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
}

impl ExitError {
    pub fn new(code: i32) -> Self {
        Self { code }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exited with code {}", self.code)
    }
}

impl std::error::Error for ExitError {}
