// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slurm-compatible batch-script builder and submitter (§4.H).
//!
//! Maintains a closed whitelist of scheduler options; an unknown key is
//! rejected with [`SchedulerError::InvalidSubmitOption`] rather than being
//! silently forwarded to the generated script.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::error::SchedulerError;
use crate::subprocess::{run_with_timeout, SUBMIT_TIMEOUT};

/// Sentinel job-id returned for a dry run, or when `sbatch`'s stdout could
/// not be parsed as a job id.
pub const NO_JOB_ID: i64 = -1;

/// One entry in the option whitelist: the scheduler's CLI flag spelling and
/// whether it takes a value.
struct OptionSpec {
    flag: &'static str,
    takes_value: bool,
}

/// The closed whitelist of Slurm-compatible submission options (§4.H,
/// GLOSSARY). Keys are the option names as used by `SbatchScript::option`.
fn whitelist() -> &'static BTreeMap<&'static str, OptionSpec> {
    static WHITELIST: std::sync::OnceLock<BTreeMap<&'static str, OptionSpec>> =
        std::sync::OnceLock::new();
    WHITELIST.get_or_init(|| {
        let entries: &[(&str, &str, bool)] = &[
            ("JOB_NAME", "--job-name", true),
            ("OUTPUT_FILE", "--output", true),
            ("ERROR_FILE", "--error", true),
            ("PARTITION", "--partition", true),
            ("TIME", "--time", true),
            ("EXTRA_NODE_INFO", "--extra-node-info", true),
            ("BURST_BUFFER", "--bb", true),
            ("BURST_BUFFER_FILE", "--bbf", true),
            ("BEGIN", "--begin", true),
            ("CHDIR", "--chdir", true),
            ("CLUSTER_CONSTRAINT", "--cluster-constraint", true),
            ("COMMENT", "--comment", true),
            ("CONTIGUOUS", "--contiguous", false),
            ("CORES_PER_SOCKET", "--cores-per-socket", true),
            ("CPU_FREQ", "--cpu-freq", true),
            ("CPUS_PER_TASK", "--cpus-per-task", true),
            ("DEADLINE", "--deadline", true),
            ("DEPENDENCY", "--dependency", true),
            ("EXPORT_FILE", "--export-file", true),
            ("NODE_FILE", "--nodefile", true),
            ("GID", "--gid", true),
            ("GPUS_PER_SOCKET", "--gpus-per-socket", true),
            ("HOLD", "--hold", false),
            ("INPUT", "--input", true),
            ("KILL_ON_INVALID_DEP", "--kill-on-invalid-dep", true),
            ("LICENSES", "--licenses", true),
            ("MAIL_TYPE", "--mail-type", true),
            ("MAIL_USER", "--mail-user", true),
            ("MIN_CPUS", "--mincpus", true),
            ("NODES", "--nodes", true),
            ("NTASKS", "--ntasks", true),
            ("NICE", "--nice", true),
            ("NTASKS_PER_CORE", "--ntasks-per-core", true),
            ("NTASKS_PER_NODE", "--ntasks-per-node", true),
            ("NTASKS_PER_SOCKET", "--ntasks-per-socket", true),
            ("PRIORITY", "--priority", true),
            ("PROPAGATE", "--propagate", true),
            ("REBOOT", "--reboot", false),
            ("OVERSUBSCRIBE", "--oversubscribe", false),
            ("CORE_SPEC", "--core-spec", true),
            ("SOCKETS_PER_NODE", "--sockets-per-node", true),
            ("THREAD_SPEC", "--thread-spec", true),
            ("THREADS_PER_CORE", "--threads-per-core", true),
            ("TIME_MIN", "--time-min", true),
            ("TMP", "--tmp", true),
            ("UID", "--uid", true),
            ("VERBOSE", "--verbose", false),
            ("NODE_LIST", "--nodelist", true),
            ("WRAP", "--wrap", true),
            ("EXCLUDE", "--exclude", true),
            ("ARRAY", "--array", true),
            ("ACCOUNT", "--account", true),
            ("QOS", "--qos", true),
            ("MEM", "--mem", true),
            ("MEM_PER_CPU", "--mem-per-cpu", true),
            ("GRES", "--gres", true),
            ("EXCLUSIVE", "--exclusive", false),
        ];
        entries
            .iter()
            .map(|(key, flag, takes_value)| {
                (
                    *key,
                    OptionSpec {
                        flag,
                        takes_value: *takes_value,
                    },
                )
            })
            .collect()
    })
}

/// A generated Slurm batch script under construction.
pub struct SbatchScript {
    path: PathBuf,
    directives: Vec<String>,
    body: Vec<String>,
}

impl SbatchScript {
    /// Start a new script at `path`, applying `options` as `#SBATCH`
    /// directives in insertion order and sourcing `virtualenv`'s activate
    /// script, if given, right after the shebang and directives.
    pub fn new(
        path: impl Into<PathBuf>,
        options: impl IntoIterator<Item = (String, Option<String>)>,
        virtualenv: Option<&str>,
    ) -> Result<Self, SchedulerError> {
        let whitelist = whitelist();
        let mut directives = Vec::new();
        for (key, value) in options {
            let spec = whitelist
                .get(key.as_str())
                .ok_or_else(|| SchedulerError::InvalidSubmitOption(key.clone()))?;
            let line = if spec.takes_value {
                let value = value.unwrap_or_default();
                format!("#SBATCH {}={}", spec.flag, value)
            } else {
                format!("#SBATCH {}", spec.flag)
            };
            directives.push(line);
        }
        let mut body = Vec::new();
        if let Some(venv) = virtualenv {
            body.push(format!("source {venv}/bin/activate"));
        }
        Ok(Self {
            path: path.into(),
            directives,
            body,
        })
    }

    /// Append a line to the script body (after directives and the
    /// virtualenv activation, in the order appended).
    pub fn add_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.body.push(line.into());
        self
    }

    /// Render the full script text.
    pub fn render(&self) -> String {
        let mut out = String::from("#!/bin/bash\n");
        for directive in &self.directives {
            out.push_str(directive);
            out.push('\n');
        }
        for line in &self.body {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Write the script to its path.
    pub fn dump(&self) -> Result<(), SchedulerError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, self.render())?;
        Ok(())
    }

    /// Path the script was (or will be) written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the script and submit it via the external `sbatch` binary,
    /// parsing the last whitespace-delimited token of stdout as the job id.
    /// Returns [`NO_JOB_ID`] on parse failure or non-zero exit, never an
    /// error — submission failure is a recoverable condition the caller
    /// handles by leaving jobs `ASSIGNED` (§7).
    pub async fn submit(&self, dry_run: bool) -> Result<i64, SchedulerError> {
        if dry_run {
            return Ok(NO_JOB_ID);
        }
        self.dump()?;
        let mut cmd = Command::new("sbatch");
        cmd.arg(&self.path);
        let output = run_with_timeout(cmd, SUBMIT_TIMEOUT, "sbatch")
            .await
            .map_err(SchedulerError::SubmitFailed)?;
        if !output.status.success() {
            return Ok(NO_JOB_ID);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_job_id(&stdout))
    }
}

/// Parse the last whitespace token of `sbatch`'s stdout
/// (`"Submitted batch job 123"`) as an integer job id.
fn parse_job_id(stdout: &str) -> i64 {
    stdout
        .split_whitespace()
        .last()
        .and_then(|tok| tok.parse::<i64>().ok())
        .unwrap_or(NO_JOB_ID)
}

#[cfg(test)]
#[path = "sbatch_tests.rs"]
mod tests;
