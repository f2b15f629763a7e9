// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task-init and task-next phases that advance the DAG (§4.E, §4.F).

use std::path::Path;

use tg_core::{State, TaskId};
use tg_flow::{Session, SessionOptions};
use tg_scheduler::NO_JOB_ID;

use crate::error::{EngineError, Result};

/// The fraction of a task's jobs that may fail before the task itself is
/// classified `FAILED` rather than `FINALIZED` (§4.F). A design constant,
/// not configurable in this iteration.
const FAILURE_TOLERANCE: f64 = 0.10;

/// Task-init phase (§4.E): bring the job set up to date, submit the array
/// covering newly-assigned jobs, then submit the gated task-next script.
pub async fn run_task_init(
    flow_dir: &Path,
    task_id: TaskId,
    options: SessionOptions,
    dry_run: bool,
) -> Result<()> {
    let mut session = Session::load(flow_dir, options.clone())?;
    let flow_path = session.path().to_path_buf();
    let ctx = session.context();
    let task = ctx
        .task_by_id(task_id)
        .ok_or(EngineError::UnknownTask(task_id))?;

    task.update_jobs()?;

    let array_id = if task.has_jobs()? {
        task.set_state(State::Running)?;
        let id = task
            .submit(options.virtualenv.as_deref(), &options.tg_binary, dry_run)
            .await?;
        Some(id)
    } else {
        None
    };

    task.submit_next(
        &flow_path,
        array_id,
        options.virtualenv.as_deref(),
        &options.tg_binary,
        dry_run,
    )
    .await?;

    Ok(())
}

/// Task-next phase (§4.F): classify the task from its job outcomes,
/// cascade `CANCELED` on failure, or advance direct successors on success.
pub async fn run_task_next(
    flow_dir: &Path,
    task_id: TaskId,
    options: SessionOptions,
    dry_run: bool,
) -> Result<State> {
    let mut session = Session::load(flow_dir, options.clone())?;
    let flow_path = session.path().to_path_buf();
    let ctx = session.context();
    let task = ctx
        .task_by_id(task_id)
        .ok_or(EngineError::UnknownTask(task_id))?;

    let job_ids = task.job_ids()?;
    let total = job_ids.len();
    let mut completed = 0usize;
    let mut failed = 0usize;
    for job_id in &job_ids {
        match task.job_status(*job_id)?.state {
            State::Completed => completed += 1,
            State::Failed => failed += 1,
            _ => {}
        }
    }

    let final_state = classify(total, completed, failed);
    let task_name = task.name().to_string();
    task.set_state(final_state)?;

    match final_state {
        State::Failed => {
            for successor_name in ctx.transitive_successors(&task_name) {
                if let Some(successor) = ctx.task(&successor_name) {
                    successor.set_state(State::Canceled)?;
                }
            }
        }
        State::Completed | State::Finalized => {
            for successor_name in ctx.successors_of(&task_name) {
                if let Some(successor) = ctx.task(&successor_name) {
                    successor.mkdir()?;
                    let id = successor
                        .submit_init_trigger(
                            &flow_path,
                            options.virtualenv.as_deref(),
                            &options.tg_binary,
                            dry_run,
                        )
                        .await?;
                    if id == NO_JOB_ID && !dry_run {
                        tracing::warn!(
                            task = successor.name(),
                            "task-init trigger submission failed"
                        );
                    }
                }
            }
        }
        _ => {}
    }

    Ok(final_state)
}

/// Classify a task from its job outcomes (§4.F, §8 property 9).
fn classify(total: usize, completed: usize, failed: usize) -> State {
    if total == 0 || completed == total {
        return State::Completed;
    }
    if failed as f64 / total as f64 > FAILURE_TOLERANCE {
        State::Failed
    } else {
        State::Finalized
    }
}

#[cfg(test)]
#[path = "task_runner_tests.rs"]
mod tests;
