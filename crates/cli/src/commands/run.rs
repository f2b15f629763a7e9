// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tg run {job,task,next}` — the three runner entry points invoked by the
//! scheduler, never directly by an operator (§4.E, §4.F, §4.G).

use std::path::PathBuf;

use clap::{Args, Subcommand};
use tg_core::TaskId;
use tracing::Instrument;

use crate::commands::build_options;

#[derive(Args)]
pub struct RunArgs {
    #[command(subcommand)]
    pub command: RunCommand,
}

#[derive(Subcommand)]
pub enum RunCommand {
    /// Execute exactly one job to completion (§4.G).
    Job {
        /// Path to the job's input descriptor (`jobs/inputs/job_<id>.json`)
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
        /// Scratch workarea directory for this job
        #[arg(short = 'o', long = "workarea")]
        workarea: PathBuf,
    },
    /// Run the task-init phase for one task (§4.E).
    Task {
        /// Flow directory holding `flow.json`
        #[arg(short = 't', long = "flow")]
        flow: PathBuf,
        /// Task id to initialize
        #[arg(short = 'i', long = "task-id")]
        task_id: TaskId,
        /// Submit nothing to the scheduler; report what would happen
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the task-next phase for one task (§4.F).
    Next {
        /// Flow directory holding `flow.json`
        #[arg(short = 't', long = "flow")]
        flow: PathBuf,
        /// Task id to classify and advance
        #[arg(short = 'i', long = "task-id")]
        task_id: TaskId,
        /// Submit nothing to the scheduler; report what would happen
        #[arg(long)]
        dry_run: bool,
    },
}

pub async fn handle(
    args: RunArgs,
    virtualenv: Option<String>,
    tg_binary: String,
) -> anyhow::Result<()> {
    match args.command {
        RunCommand::Job { input, workarea } => {
            let span = tracing::info_span!("run_job", job = %input.display());
            tg_engine::run_job(&input, &workarea)
                .instrument(span)
                .await?;
        }
        RunCommand::Task {
            flow,
            task_id,
            dry_run,
        } => {
            let options = build_options(&flow, virtualenv, tg_binary)?;
            let span = tracing::info_span!("task_init", task_id = %task_id);
            tg_engine::run_task_init(&flow, task_id, options, dry_run)
                .instrument(span)
                .await?;
        }
        RunCommand::Next {
            flow,
            task_id,
            dry_run,
        } => {
            let options = build_options(&flow, virtualenv, tg_binary)?;
            let span = tracing::info_span!("task_next", task_id = %task_id);
            let state = tg_engine::run_task_next(&flow, task_id, options, dry_run)
                .instrument(span)
                .await?;
            tracing::info!(task_id = %task_id, final_state = %state, "task classified");
        }
    }
    Ok(())
}
