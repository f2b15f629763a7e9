// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One module per top-level subcommand group (§4.I).

use std::path::Path;

use tg_flow::{Config, SessionOptions};

pub mod expert;
pub mod run;
pub mod task;

/// Layer a Flow directory's optional `.taskgraph/config.toml` under the
/// CLI's own `--virtualenv`/`--tg-binary` overrides (§4.L: CLI flag >
/// constructor argument > config file > built-in default).
pub fn build_options(
    flow_root: &Path,
    virtualenv: Option<String>,
    tg_binary: String,
) -> anyhow::Result<SessionOptions> {
    let config = Config::load(flow_root)?;
    Ok(SessionOptions {
        virtualenv: config.virtualenv_or(virtualenv),
        partition_for_trigger: config.partition.clone(),
        tg_binary,
    })
}
