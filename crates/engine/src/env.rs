// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed environment composition passed to every user command (§4.G step
//! 7, §6).

use std::path::Path;

use indexmap::IndexMap;
use tg_core::JobId;

/// Build the environment a job's process runs with: the bit-fixed base,
/// then `overlay` (the Task's declared `envs`) applied last so a user can
/// override any of the fixed defaults.
pub fn compose_env(
    job_id: JobId,
    workarea: &Path,
    overlay: &IndexMap<String, String>,
) -> IndexMap<String, String> {
    let mut env = IndexMap::new();
    env.insert("JOB_ID".to_string(), job_id.to_string());
    env.insert(
        "JOB_WORKAREA".to_string(),
        workarea.display().to_string(),
    );
    env.insert("TF_CPP_MIN_LOG_LEVEL".to_string(), "3".to_string());
    env.insert("CUDA_VISIBLE_ORDER".to_string(), "PCI_BUS_ID".to_string());
    env.insert(
        "CUDA_VISIBLE_DEVICES".to_string(),
        std::env::var("CUDA_VISIBLE_DEVICES").unwrap_or_else(|_| "-1".to_string()),
    );
    let cpus = std::env::var("SLURM_CPUS_PER_TASK").unwrap_or_else(|_| "4".to_string());
    env.insert("OMP_NUM_THREADS".to_string(), cpus.clone());
    env.insert("SLURM_CPUS_PER_TASK".to_string(), cpus);
    env.insert(
        "SLURM_MEM_PER_NODE".to_string(),
        std::env::var("SLURM_MEM_PER_NODE").unwrap_or_else(|_| "2048".to_string()),
    );
    for (key, value) in overlay {
        env.insert(key.clone(), value.clone());
    }
    env
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
