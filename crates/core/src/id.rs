// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dense integer identifiers for tasks and jobs.
//!
//! Both `task_id` and `job_id` are array indices assigned at construction
//! time (tasks) or fan-out time (jobs): dense, starting at zero, stable for
//! the lifetime of a Flow. [`define_index_id!`] generates a newtype wrapper
//! so the two id spaces can't be confused with each other or with a bare
//! `usize` used for something else.

/// Generates a `u32`-backed dense-index id newtype.
///
/// Unlike a UUID-backed id, these are meant to be constructed directly from
/// a position in a sequence (`TaskId::new(0)`, `JobId::new(len)`), not
/// generated.
macro_rules! define_index_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Construct an id from its raw index.
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// The raw index this id wraps.
            pub const fn index(self) -> u32 {
                self.0
            }

            /// The raw index as a `usize`, for indexing into a `Vec`.
            pub const fn as_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self(v as u32)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u32>().map(Self)
            }
        }
    };
}

define_index_id! {
    /// Identifies a Task within a Flow. Dense, starting at 0, assigned in
    /// declaration order.
    pub struct TaskId;
}

define_index_id! {
    /// Identifies a Job within a Task. Dense, starting at 0, assigned at
    /// fan-out time from the sorted order of input-file basenames.
    pub struct JobId;
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
