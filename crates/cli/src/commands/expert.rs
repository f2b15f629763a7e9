// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tg expert {list-jobs,change-jobs-status,change-task-status,reset-task}` —
//! low-level operator escape hatches for inspecting and forcing state
//! outside the normal task-init/task-next flow (§4.I).

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Subcommand};
use tg_core::clock::SystemClock;
use tg_core::{State, TaskId};
use tg_flow::{Session, SessionOptions};

use crate::color;
use crate::commands::build_options;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ExpertArgs {
    #[command(subcommand)]
    pub command: ExpertCommand,
}

#[derive(Subcommand)]
pub enum ExpertCommand {
    /// List every job across the Flow, optionally filtered by state.
    ListJobs {
        /// Flow directory holding `flow.json`
        #[arg(short = 'i', long = "flow")]
        flow: PathBuf,
        /// Comma-separated list of states to include (default: all)
        #[arg(long = "filter-status", value_delimiter = ',')]
        filter_status: Option<Vec<String>>,
    },
    /// Force every job of a task from one state to another.
    ChangeJobsStatus {
        /// Flow directory holding `flow.json`
        #[arg(short = 'i', long = "flow")]
        flow: PathBuf,
        /// Task whose jobs to mutate
        #[arg(long = "task-id")]
        task_id: TaskId,
        /// Only jobs currently in this state are changed
        #[arg(short = 'f', long = "from")]
        from: String,
        /// State to set matching jobs to
        #[arg(short = 't', long = "to")]
        to: String,
    },
    /// Force a task's own status to an arbitrary state.
    ChangeTaskStatus {
        /// Flow directory holding `flow.json`
        #[arg(short = 'i', long = "flow")]
        flow: PathBuf,
        /// Task to mutate
        #[arg(long = "task-id")]
        task_id: TaskId,
        /// State to set the task to
        #[arg(long = "new-status")]
        new_status: String,
    },
    /// Reset a task's jobs and its own status back to `ASSIGNED`.
    ResetTask {
        /// Flow directory holding `flow.json`
        #[arg(short = 'i', long = "flow")]
        flow: PathBuf,
        /// Task to reset
        #[arg(long = "task-id")]
        task_id: TaskId,
        /// Reset even if the task is currently running-ish
        #[arg(long)]
        force: bool,
        /// Also remove the task's scratch workarea
        #[arg(long)]
        delete_workarea: bool,
    },
}

pub fn handle(
    args: ExpertArgs,
    virtualenv: Option<String>,
    tg_binary: String,
) -> anyhow::Result<()> {
    match args.command {
        ExpertCommand::ListJobs {
            flow,
            filter_status,
        } => {
            let options = build_options(&flow, virtualenv, tg_binary)?;
            list_jobs(flow, filter_status, options)
        }
        ExpertCommand::ChangeJobsStatus {
            flow,
            task_id,
            from,
            to,
        } => {
            let options = build_options(&flow, virtualenv, tg_binary)?;
            change_jobs_status(flow, task_id, from, to, options)
        }
        ExpertCommand::ChangeTaskStatus {
            flow,
            task_id,
            new_status,
        } => {
            let options = build_options(&flow, virtualenv, tg_binary)?;
            change_task_status(flow, task_id, new_status, options)
        }
        ExpertCommand::ResetTask {
            flow,
            task_id,
            force,
            delete_workarea,
        } => {
            let options = build_options(&flow, virtualenv, tg_binary)?;
            reset_task(flow, task_id, force, delete_workarea, options)
        }
    }
}

fn list_jobs(
    flow: PathBuf,
    filter_status: Option<Vec<String>>,
    options: SessionOptions,
) -> anyhow::Result<()> {
    let filter = filter_status
        .map(|states| {
            states
                .iter()
                .map(|s| State::from_str(s.trim()))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let mut session = Session::load(&flow, options)?;
    let ctx = session.context();

    let mut table = Table::new(vec![
        Column::left("TASK"),
        Column::right("JOB"),
        Column::left("STATE").status(),
    ]);
    for task in ctx.tasks() {
        for job_id in task.job_ids()? {
            let status = task.job_status(job_id)?;
            if let Some(states) = &filter {
                if !states.contains(&status.state) {
                    continue;
                }
            }
            table.row(vec![
                task.name().to_string(),
                job_id.to_string(),
                status.state.to_string(),
            ]);
        }
    }
    println!("{}", color::header("Jobs"));
    table.print();
    Ok(())
}

fn change_jobs_status(
    flow: PathBuf,
    task_id: TaskId,
    from: String,
    to: String,
    options: SessionOptions,
) -> anyhow::Result<()> {
    let from = State::from_str(from.trim())?;
    let to = State::from_str(to.trim())?;
    let clock = SystemClock;

    let mut session = Session::load(&flow, options)?;
    let ctx = session.context();
    let task = ctx
        .task_by_id(task_id)
        .ok_or_else(|| anyhow::anyhow!("unknown task id {task_id}"))?;

    let mut changed = 0usize;
    for job_id in task.job_ids()? {
        let status = task.job_status(job_id)?;
        if status.state == from {
            tg_storage::status_store::set_state(&task.job_status_path(job_id), to, &clock)?;
            changed += 1;
        }
    }
    tracing::info!(task_id = %task_id, %from, %to, changed, "jobs status changed");
    Ok(())
}

fn change_task_status(
    flow: PathBuf,
    task_id: TaskId,
    new_status: String,
    options: SessionOptions,
) -> anyhow::Result<()> {
    let new_status = State::from_str(new_status.trim())?;
    let mut session = Session::load(&flow, options)?;
    let ctx = session.context();
    let task = ctx
        .task_by_id(task_id)
        .ok_or_else(|| anyhow::anyhow!("unknown task id {task_id}"))?;
    task.set_state(new_status)?;
    tracing::info!(task_id = %task_id, new_status = %new_status, "task status changed");
    Ok(())
}

fn reset_task(
    flow: PathBuf,
    task_id: TaskId,
    force: bool,
    delete_workarea: bool,
    options: SessionOptions,
) -> anyhow::Result<()> {
    let clock = SystemClock;
    let mut session = Session::load(&flow, options)?;
    let ctx = session.context();
    let task = ctx
        .task_by_id(task_id)
        .ok_or_else(|| anyhow::anyhow!("unknown task id {task_id}"))?;

    let status = task.status()?;
    if status.state.is_running_ish() && !force {
        anyhow::bail!(
            "task {task_id} is {}; pass --force to reset a running-ish task",
            status.state
        );
    }

    for job_id in task.job_ids()? {
        tg_storage::status_store::reset(&task.job_status_path(job_id), &clock)?;
    }
    tg_storage::status_store::reset(&task.status_path(), &clock)?;

    if delete_workarea {
        let works_dir = task.works_dir();
        if works_dir.exists() {
            std::fs::remove_dir_all(&works_dir)?;
        }
    }

    tracing::info!(task_id = %task_id, delete_workarea, "task reset");
    Ok(())
}
