// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tg task {create,list,retry}` — operator-facing commands that build,
//! inspect, and restart a Flow (§4.I, §9 Design Notes).

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Subcommand};
use indexmap::IndexMap;
use tg_core::{clock::SystemClock, State};
use tg_flow::{Dataset, DatasetRef, Image, ImageRef, Session, SessionOptions, TaskSpec};

use crate::color;
use crate::commands::build_options;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Build a single-task Flow from its input directory and run it.
    Create {
        /// Task name, also used as the prefix of its output datasets
        #[arg(short = 'n', long)]
        name: String,
        /// Command template, must reference %IN and every output/secondary key
        #[arg(short = 'c', long)]
        command: String,
        /// JSON object mapping output key to filename template, e.g. {"OUT":"out.json"}
        #[arg(short = 'o', long)]
        outputs: String,
        /// Scheduler partition to submit into
        #[arg(short = 'p', long)]
        partition: String,
        /// Path to a Singularity image (`.sif`) to wrap the command in
        #[arg(short = 'm', long = "image")]
        image: Option<PathBuf>,
        /// JSON object mapping container bind source to destination
        #[arg(short = 'b', long)]
        binds: Option<String>,
        /// Flow directory to create (`flow.json`, `tasks/<name>/...`)
        #[arg(short = 'd', long = "output-dir")]
        output_dir: PathBuf,
        /// Directory of input files to fan out over
        #[arg(short = 'i', long = "input-dir")]
        input_dir: PathBuf,
        /// Submit nothing to the scheduler; report what would happen
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a table of the Flow's tasks, datasets, and images.
    List {
        /// Flow directory holding `flow.json`
        #[arg(short = 'i', long = "flow")]
        flow: PathBuf,
    },
    /// Reset incomplete tasks and jobs to `ASSIGNED` and re-trigger root tasks.
    Retry {
        /// Flow directory holding `flow.json`
        #[arg(short = 'i', long = "flow")]
        flow: PathBuf,
        /// Submit nothing to the scheduler; report what would happen
        #[arg(long)]
        dry_run: bool,
    },
}

pub async fn handle(
    args: TaskArgs,
    virtualenv: Option<String>,
    tg_binary: String,
) -> anyhow::Result<()> {
    match args.command {
        TaskCommand::Create {
            name,
            command,
            outputs,
            partition,
            image,
            binds,
            output_dir,
            input_dir,
            dry_run,
        } => {
            let options = build_options(&output_dir, virtualenv, tg_binary)?;
            create(
                name, command, outputs, partition, image, binds, output_dir, input_dir, dry_run,
                options,
            )
        }
        TaskCommand::List { flow } => {
            let options = build_options(&flow, virtualenv, tg_binary)?;
            list(flow, options)
        }
        TaskCommand::Retry { flow, dry_run } => {
            let options = build_options(&flow, virtualenv, tg_binary)?;
            retry(flow, dry_run, options).await
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn create(
    name: String,
    command: String,
    outputs: String,
    partition: String,
    image: Option<PathBuf>,
    binds: Option<String>,
    output_dir: PathBuf,
    input_dir: PathBuf,
    dry_run: bool,
    options: SessionOptions,
) -> anyhow::Result<()> {
    let outputs: IndexMap<String, String> =
        serde_json::from_str(&outputs).context("parsing --outputs as a JSON object")?;
    let binds: IndexMap<String, String> = match binds {
        Some(raw) => serde_json::from_str(&raw).context("parsing --binds as a JSON object")?,
        None => IndexMap::new(),
    };

    let mut session = Session::new(&output_dir, options);
    session.register_dataset(Dataset::new("input", &input_dir, None))?;
    let image_ref = if let Some(path) = &image {
        session.register_image(Image::new("image", path))?;
        Some(ImageRef::from("image"))
    } else {
        None
    };

    session.add_task(TaskSpec {
        name,
        command,
        input_data: DatasetRef::from("input"),
        image: image_ref,
        secondary_data: IndexMap::new(),
        outputs,
        partition,
        binds,
        envs: IndexMap::new(),
    })?;

    session.run(dry_run)?;
    Ok(())
}

fn list(flow: PathBuf, options: SessionOptions) -> anyhow::Result<()> {
    let mut session = Session::load(&flow, options)?;
    let ctx = session.context();

    let mut tasks = Table::new(vec![
        Column::left("TASK"),
        Column::left("STATE").status(),
        Column::left("PARTITION"),
        Column::right("JOBS"),
    ]);
    for task in ctx.tasks() {
        let status = task.status()?;
        let job_ids = task.job_ids()?;
        tasks.row(vec![
            task.name().to_string(),
            status.state.to_string(),
            task.partition().to_string(),
            job_ids.len().to_string(),
        ]);
    }
    println!("{}", color::header("Tasks"));
    tasks.print();

    let mut datasets = Table::new(vec![
        Column::left("DATASET"),
        Column::left("PRODUCER"),
        Column::left("PATH"),
    ]);
    for dataset in ctx.datasets() {
        datasets.row(vec![
            dataset.name().to_string(),
            dataset.producer().unwrap_or("-").to_string(),
            dataset.path().display().to_string(),
        ]);
    }
    println!();
    println!("{}", color::header("Datasets"));
    datasets.print();

    let mut images = Table::new(vec![Column::left("IMAGE"), Column::left("PATH")]);
    for image in ctx.images() {
        images.row(vec![
            image.name().to_string(),
            image.path().display().to_string(),
        ]);
    }
    println!();
    println!("{}", color::header("Images"));
    images.print();

    Ok(())
}

async fn retry(flow: PathBuf, dry_run: bool, options: SessionOptions) -> anyhow::Result<()> {
    let clock = SystemClock;
    let mut session = Session::load(&flow, options.clone())?;
    let ctx = session.context();

    let task_names: Vec<String> = ctx.tasks().map(|t| t.name().to_string()).collect();
    for name in &task_names {
        let Some(task) = ctx.task(name) else {
            continue;
        };
        let status = task.status()?;
        if status.state == State::Completed || status.state == State::Finalized {
            continue;
        }
        for job_id in task.job_ids()? {
            let job_status = task.job_status(job_id)?;
            if job_status.state != State::Completed {
                tg_storage::status_store::reset(&task.job_status_path(job_id), &clock)?;
            }
        }
        task.set_state(State::Assigned)?;
    }

    let flow_path = session.path().to_path_buf();
    let ctx = session.context();
    let roots = ctx.root_tasks();
    for root_name in &roots {
        if let Some(task) = ctx.task(root_name) {
            task.mkdir()?;
            task.submit_init_trigger(
                &flow_path,
                options.virtualenv.as_deref(),
                &options.tg_binary,
                dry_run,
            )
            .await?;
        }
    }

    Ok(())
}
