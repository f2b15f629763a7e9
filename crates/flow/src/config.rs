// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional `<flow-root>/.taskgraph/config.toml` layered defaults (§4.L).
//!
//! Resolution order is CLI flag > constructor argument > config file >
//! built-in default; this module only ever produces the config-file layer,
//! read once when a Session/Context is constructed. Absence of the file is
//! not an error.

use std::path::Path;

use serde::Deserialize;
use tg_core::DEFAULT_LIVENESS_WINDOW_SECS;

use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    defaults: RawDefaults,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawDefaults {
    liveness_window_secs: Option<i64>,
    partition: Option<String>,
    virtualenv: Option<String>,
}

/// The defaults a `.taskgraph/config.toml` may override, already layered
/// under the built-in constants.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub liveness_window_secs: i64,
    pub partition: Option<String>,
    pub virtualenv: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            liveness_window_secs: DEFAULT_LIVENESS_WINDOW_SECS,
            partition: None,
            virtualenv: None,
        }
    }
}

impl Config {
    /// Read `<flow_root>/.taskgraph/config.toml`. Returns built-in defaults
    /// unchanged if the file doesn't exist.
    pub fn load(flow_root: &Path) -> Result<Self> {
        let path = flow_root.join(".taskgraph").join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(tg_storage::StorageError::from)?;
        let raw: RawConfig = toml::from_str(&text)?;
        let mut config = Self::default();
        if let Some(window) = raw.defaults.liveness_window_secs {
            config.liveness_window_secs = window;
        }
        config.partition = raw.defaults.partition;
        config.virtualenv = raw.defaults.virtualenv;
        Ok(config)
    }

    /// Overlay `self` under an explicit constructor-argument value: `over`
    /// wins whenever it is `Some`, config value otherwise.
    pub fn virtualenv_or(&self, over: Option<String>) -> Option<String> {
        over.or_else(|| self.virtualenv.clone())
    }

    pub fn partition_or(&self, over: Option<String>) -> Option<String> {
        over.or_else(|| self.partition.clone())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
