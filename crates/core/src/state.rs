// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The state enumeration shared by Task and Job status records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a Task or a Job.
///
/// Values are stable strings, persisted as such in `status.json` /
/// `job_<id>.json` files; renaming a variant is a wire-format break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    /// Not yet observed; the zero value before a status file exists.
    #[default]
    Unknown,
    /// Entity registered in the Context but no on-disk subtree yet.
    Registered,
    /// Ready to be submitted to the scheduler.
    Assigned,
    /// Submitted, waiting for the scheduler to start it.
    Pending,
    /// Actively executing.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished unsuccessfully.
    Failed,
    /// Never run because an ancestor failed past the tolerance threshold.
    Canceled,
    /// Task finished with a tolerated minority of failed jobs.
    Finalized,
    /// Liveness window exceeded while state was Pending/Running.
    Killed,
}

impl State {
    /// True for the states a job fan-out considers "not yet terminal and
    /// ready to be (re-)submitted".
    pub fn is_assigned(self) -> bool {
        matches!(self, State::Assigned)
    }

    /// True for the states in which a process is expected to be alive and
    /// pinging (§4.A liveness definition).
    pub fn is_running_ish(self) -> bool {
        matches!(self, State::Pending | State::Running)
    }

    /// True for states that will never change again without an explicit
    /// operator reset.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            State::Completed | State::Failed | State::Canceled | State::Finalized | State::Killed
        )
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::Unknown => "UNKNOWN",
            State::Registered => "REGISTERED",
            State::Assigned => "ASSIGNED",
            State::Pending => "PENDING",
            State::Running => "RUNNING",
            State::Completed => "COMPLETED",
            State::Failed => "FAILED",
            State::Canceled => "CANCELED",
            State::Finalized => "FINALIZED",
            State::Killed => "KILLED",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a string doesn't match any [`State`] variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown state: {0}")]
pub struct ParseStateError(String);

impl FromStr for State {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(State::Unknown),
            "REGISTERED" => Ok(State::Registered),
            "ASSIGNED" => Ok(State::Assigned),
            "PENDING" => Ok(State::Pending),
            "RUNNING" => Ok(State::Running),
            "COMPLETED" => Ok(State::Completed),
            "FAILED" => Ok(State::Failed),
            "CANCELED" => Ok(State::Canceled),
            "FINALIZED" => Ok(State::Finalized),
            "KILLED" => Ok(State::Killed),
            other => Err(ParseStateError(other.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
