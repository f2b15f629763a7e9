// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executes exactly one job: stage inputs, run the user command inside its
//! container, publish outputs (§4.G).

use std::path::{Path, PathBuf};
use std::time::Duration;

use tg_core::clock::SystemClock;
use tg_core::{JobId, State};
use tg_flow::{template, Job};
use tokio::process::Command;

use crate::env::compose_env;
use crate::error::{EngineError, Result};

const PING_INTERVAL: Duration = Duration::from_secs(10);

/// Run one job to completion, given its descriptor file and a scratch
/// workarea directory (layout: `<task>/works/job_<id>/`).
///
/// Every terminal path below records the job's final status and returns
/// `Ok(())`, including command failure and a missing output file: the
/// scheduler's array element must exit 0 so the `afterok`-gated task-next
/// script still runs and classifies the failure (§4.G, §6 exit-code
/// contract). Only a malformed job descriptor — an argument/parse failure,
/// not a job-execution failure — propagates an error here.
pub async fn run_job(job_path: &Path, workarea: &Path) -> Result<()> {
    let job = Job::load(job_path)?;
    let status_path = job_status_path(workarea, job.job_id);
    let clock = SystemClock;

    let outcome = execute(&job, workarea).await;

    match outcome {
        Ok(published) => {
            for (source, destination) in &published {
                if !source.exists() {
                    tracing::error!(
                        job_id = %job.job_id,
                        output = %source.display(),
                        "output file missing from workarea, marking job failed"
                    );
                    tg_storage::status_store::set_state(&status_path, State::Failed, &clock)?;
                    return Ok(());
                }
                if let Some(parent) = destination.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::rename(source, destination)?;
                let _ = std::fs::remove_file(source);
                symlink_force(destination, source)?;
            }
            tg_storage::status_store::set_state(&status_path, State::Completed, &clock)?;
        }
        Err(err) => {
            tracing::error!(job_id = %job.job_id, error = %err, "job execution failed");
            tg_storage::status_store::set_state(&status_path, State::Failed, &clock)?;
        }
    }
    Ok(())
}

/// Stage, run, and monitor the job's command, returning the
/// (workarea-source, dataset-destination) pairs still to be published.
async fn execute(job: &Job, workarea: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    let status_path = job_status_path(workarea, job.job_id);
    let clock = SystemClock;
    tg_storage::status_store::reset(&status_path, &clock)?;
    tg_storage::status_store::set_state(&status_path, State::Pending, &clock)?;

    std::fs::create_dir_all(workarea)?;

    let mut command_text = job.command.clone();

    let image_link = match &job.image {
        Some(image) => {
            let basename = image
                .path()
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| std::ffi::OsString::from("image.sif"));
            let link = workarea.join(&basename);
            symlink_force(image.path(), &link)?;
            Some(link)
        }
        None => None,
    };

    for (key, dataset) in &job.secondary_data {
        let link = workarea.join(dataset.name());
        symlink_force(dataset.path(), &link)?;
        command_text = template::substitute(&command_text, key, &link.display().to_string());
    }

    let input_basename = job
        .input_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let input_link = workarea.join(format!("{}.{}", job.input_dataset.name(), input_basename));
    symlink_force(&job.input_file, &input_link)?;
    command_text = template::substitute(&command_text, "IN", &input_link.display().to_string());

    let mut published = Vec::new();
    for (key, spec) in &job.outputs {
        let versioned = versioned_filename(&spec.filename_template, job.job_id);
        let workarea_path = workarea.join(&versioned);
        command_text =
            template::substitute(&command_text, key, &workarea_path.display().to_string());
        let destination = spec.dataset.path().join(&versioned);
        published.push((workarea_path, destination));
    }

    let entrypoint_path = workarea.join("entrypoint.sh");
    std::fs::write(
        &entrypoint_path,
        format!("#!/bin/bash\ncd {}\n{}\n", workarea.display(), command_text),
    )?;

    let binds: Vec<(String, String)> = job
        .binds
        .iter()
        .map(|(src, dst)| (src.clone(), dst.clone()))
        .collect();
    let outer_command = tg_scheduler::compose_command(
        image_link.as_ref().map(|p| p.to_str().unwrap_or_default()),
        &binds,
        "entrypoint.sh",
    );

    let env = compose_env(job.job_id, workarea, &job.envs);
    let mut cmd = Command::new("bash");
    cmd.arg("-c")
        .arg(&outer_command)
        .current_dir(workarea)
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let mut child = cmd.spawn()?;
    tg_storage::status_store::set_state(&status_path, State::Running, &clock)?;

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        tokio::time::sleep(PING_INTERVAL).await;
        tg_storage::status_store::ping(&status_path, &clock)?;
    };

    if !status.success() {
        return Err(EngineError::Storage(tg_storage::StorageError::Io(
            std::io::Error::other(format!("job command exited with {status}")),
        )));
    }

    Ok(published)
}

fn job_status_path(workarea: &Path, job_id: JobId) -> PathBuf {
    task_root_from_workarea(workarea)
        .join("jobs")
        .join("status")
        .join(format!("job_{job_id}.json"))
}

/// `workarea` is `<task-root>/works/job_<id>`; its grandparent is the task
/// root, which owns `jobs/status/`.
fn task_root_from_workarea(workarea: &Path) -> PathBuf {
    workarea
        .parent()
        .and_then(|p| p.parent())
        .map(PathBuf::from)
        .unwrap_or_else(|| workarea.to_path_buf())
}

fn versioned_filename(template: &str, job_id: JobId) -> String {
    let path = Path::new(template);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{}.{}.{}",
            stem.to_string_lossy(),
            job_id,
            ext.to_string_lossy()
        ),
        (Some(stem), None) => format!("{}.{}", stem.to_string_lossy(), job_id),
        _ => format!("{template}.{job_id}"),
    }
}

/// Symlink `target` at `link`, replacing any existing entry — staging
/// always overwrites (§4.G step 3).
fn symlink_force(target: &Path, link: &Path) -> Result<()> {
    if let Some(parent) = link.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match std::fs::symlink_metadata(link) {
        Ok(_) => std::fs::remove_file(link)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }
    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link)?;
    #[cfg(not(unix))]
    std::fs::copy(target, link).map(|_| ())?;
    Ok(())
}

#[cfg(test)]
#[path = "job_runner_tests.rs"]
mod tests;
