// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory `(state, last-ping)` pair persisted per Task and per Job.
//!
//! This module holds only the pure state-transition logic. Locking and
//! on-disk persistence live in `tg-storage`, which wraps a [`Status`] with a
//! file-backed, lock-guarded load/store cycle.

use crate::clock::Clock;
use crate::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default liveness window, in seconds, used when a Flow's config does not
/// override it (§4.A, §4.L).
pub const DEFAULT_LIVENESS_WINDOW_SECS: i64 = 60;

/// A persisted `(state, last-ping)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub state: State,
    pub ping: DateTime<Utc>,
}

impl Status {
    /// A freshly registered status: `REGISTERED`, ping set to `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: State::Registered,
            ping: now,
        }
    }

    /// Set the state, leaving `ping` untouched. Mirrors the original's
    /// `status` property setter, which only ever assigns `.state`.
    pub fn set(&mut self, state: State) {
        self.state = state;
    }

    /// Record a liveness heartbeat. Invariant: ping is monotonically
    /// non-decreasing, so a stale write (clock skew, retried call) never
    /// moves `ping` backwards.
    pub fn ping(&mut self, now: DateTime<Utc>) {
        if now > self.ping {
            self.ping = now;
        }
    }

    /// Reset to `ASSIGNED` with a fresh ping, as performed by
    /// `expert reset-task` / `task retry` / the job runner's restart path.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.state = State::Assigned;
        self.ping = now;
    }

    /// True iff state is running-ish and the last ping is within the
    /// liveness window of `now`.
    pub fn is_alive(&self, now: DateTime<Utc>, liveness_window_secs: i64) -> bool {
        self.state.is_running_ish() && (now - self.ping).num_seconds() <= liveness_window_secs
    }

    /// The watchdog classification named in §9: a running-ish status whose
    /// ping has gone stale is eligible for a `KILLED` transition. This does
    /// not mutate `self`; the caller (an explicit operator action, not an
    /// automatic background task — see §9) applies it via [`Status::set`].
    pub fn is_stale(&self, now: DateTime<Utc>, liveness_window_secs: i64) -> bool {
        self.state.is_running_ish() && !self.is_alive(now, liveness_window_secs)
    }

    /// Convenience constructor using an injected [`Clock`] rather than a
    /// bare timestamp, for call sites that already hold one.
    pub fn new_with_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.now())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
