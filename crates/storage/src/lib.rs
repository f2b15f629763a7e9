// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! On-disk persistence: advisory file locking, atomic durable writes, the
//! locked Status store (§4.A), and the `flow.json` codec (§6).

pub mod atomic;
pub mod error;
pub mod flow_codec;
pub mod job_codec;
pub mod lockfile;
pub mod status_store;

pub use atomic::{atomic_write_fs, AtomicWriter, FsAtomicWriter};
pub use error::StorageError;
pub use flow_codec::{hash_bytes, DatasetRecord, ExtraParams, FlowFile, ImageRecord, TaskRecord};
pub use job_codec::{JobRecord, OutputSpec};
pub use lockfile::FileLockGuard;
