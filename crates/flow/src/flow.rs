// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Flow/Session lifecycle: first-run layout creation and root-task
//! spawning, or integrity verification on every subsequent run (§4.C).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tg_storage::{DatasetRecord, ExtraParams, FlowFile, ImageRecord, TaskRecord};

use crate::context::Context;
use crate::dataset::Dataset;
use crate::error::{FlowError, Result};
use crate::image::Image;
use crate::task::Task;

/// Extra parameters carried alongside a Flow (§3, §4.C), layered under
/// explicit constructor arguments per the configuration precedence of
/// §4.L: CLI flag > constructor argument > config file > built-in default.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub virtualenv: Option<String>,
    pub partition_for_trigger: Option<String>,
    pub tg_binary: String,
}

/// The outcome of [`Session::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// `flow.json` did not exist: the layout was created and these root
    /// tasks had a task-init process spawned for them.
    Created { roots: Vec<String> },
    /// `flow.json` already existed and matched the in-memory DAG: no new
    /// root submissions were made.
    AlreadyRunning,
}

/// A scoped construction context for one Flow directory (§4.C). Building a
/// Session clears the Context and fixes `path` and the extra parameters;
/// datasets, images, and tasks are then registered against it before
/// calling [`Session::run`].
pub struct Session {
    ctx: Context,
    path: PathBuf,
    options: SessionOptions,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>, options: SessionOptions) -> Self {
        Self {
            ctx: Context::new(),
            path: path.into(),
            options,
        }
    }

    pub fn context(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flow_json_path(&self) -> PathBuf {
        self.path.join("flow.json")
    }

    pub fn register_dataset(&mut self, dataset: Dataset) -> Result<()> {
        self.ctx.register_dataset(dataset)
    }

    pub fn register_image(&mut self, image: Image) -> Result<()> {
        self.ctx.register_image(image)
    }

    pub fn add_task(&mut self, spec: crate::task::TaskSpec) -> Result<Task> {
        Task::new(&mut self.ctx, &self.path, spec)
    }

    /// Reload a Session from an existing `flow.json`, trusting its contents
    /// rather than re-running placeholder/acyclicity validation (§4.E,
    /// §4.F: the task-init and task-next phases each start from a fresh
    /// Context loaded this way).
    pub fn load(path: impl Into<PathBuf>, options: SessionOptions) -> Result<Self> {
        let path = path.into();
        let flow_json_path = path.join("flow.json");
        let file = tg_storage::flow_codec::load(&flow_json_path)?;

        let mut ctx = Context::new();
        for record in file.datasets.values() {
            ctx.register_dataset(Dataset::new(
                record.name.clone(),
                record.path.clone(),
                record.from_task.clone(),
            ))?;
        }
        for record in file.images.values() {
            ctx.register_image(Image::new(record.name.clone(), record.path.clone()))?;
        }
        for record in file.tasks.values() {
            let input_data = ctx
                .dataset(&record.input_data)
                .cloned()
                .ok_or_else(|| FlowError::DatasetNotFound(record.input_data.clone()))?;
            let image = record
                .image
                .as_ref()
                .map(|name| {
                    ctx.image(name)
                        .cloned()
                        .ok_or_else(|| FlowError::ImageNotFound(name.clone()))
                })
                .transpose()?;
            let secondary_data = record
                .secondary_data
                .iter()
                .map(|(key, name)| {
                    ctx.dataset(name)
                        .cloned()
                        .ok_or_else(|| FlowError::DatasetNotFound(name.clone()))
                        .map(|d| (key.clone(), d))
                })
                .collect::<Result<IndexMap<_, _>>>()?;
            let outputs = record
                .outputs
                .iter()
                .map(|(key, filename_template)| {
                    let dataset_name = format!("{}.{}", record.name, filename_template);
                    ctx.dataset(&dataset_name)
                        .cloned()
                        .ok_or_else(|| FlowError::DatasetNotFound(dataset_name.clone()))
                        .map(|dataset| {
                            (
                                key.clone(),
                                crate::task::OutputSpec {
                                    filename_template: filename_template.clone(),
                                    dataset,
                                },
                            )
                        })
                })
                .collect::<Result<IndexMap<_, _>>>()?;

            let task = Task::reconstruct(
                tg_core::TaskId::new(record.task_id),
                record.name.clone(),
                record.command.clone(),
                input_data,
                image,
                secondary_data,
                outputs,
                record.partition.clone(),
                record.binds.clone(),
                record.envs.clone(),
                path.join("tasks").join(&record.name),
            );
            ctx.insert_task_unchecked(task);
        }

        Ok(Self {
            ctx,
            path,
            options,
        })
    }

    fn to_flow_file(&self) -> FlowFile {
        let mut datasets = IndexMap::new();
        for dataset in self.ctx.datasets() {
            datasets.insert(
                dataset.name().to_string(),
                DatasetRecord {
                    name: dataset.name().to_string(),
                    path: dataset.path().display().to_string(),
                    from_task: dataset.producer().map(str::to_string),
                },
            );
        }
        let mut images = IndexMap::new();
        for image in self.ctx.images() {
            images.insert(
                image.name().to_string(),
                ImageRecord {
                    name: image.name().to_string(),
                    path: image.path().display().to_string(),
                },
            );
        }
        let mut tasks = IndexMap::new();
        for task in self.ctx.tasks() {
            let outputs = task
                .outputs()
                .iter()
                .map(|(k, spec)| (k.clone(), spec.filename_template.clone()))
                .collect();
            let secondary_data = task
                .secondary_data()
                .iter()
                .map(|(k, dataset)| (k.clone(), dataset.name().to_string()))
                .collect();
            tasks.insert(
                task.task_id().to_string(),
                TaskRecord {
                    task_id: task.task_id().index(),
                    name: task.name().to_string(),
                    image: task.image().map(|i| i.name().to_string()),
                    command: task.command().to_string(),
                    input_data: task.input_data().name().to_string(),
                    outputs,
                    partition: task.partition().to_string(),
                    secondary_data,
                    binds: task.binds().clone(),
                    envs: task.envs().clone(),
                    next: self.ctx.successors_of(task.name()),
                    prev: self.ctx.predecessors_of(task.name()),
                },
            );
        }
        FlowFile {
            path: self.path.display().to_string(),
            extra_params: ExtraParams {
                virtualenv: self.options.virtualenv.clone(),
                partition_for_trigger: self.options.partition_for_trigger.clone(),
            },
            datasets,
            images,
            tasks,
        }
    }

    fn create_layout(&self) -> Result<()> {
        for dir in [
            self.path.join("tasks"),
            self.path.join("datasets"),
            self.path.join("images"),
            self.path.join(".taskgraph"),
        ] {
            std::fs::create_dir_all(&dir).map_err(tg_storage::StorageError::from)?;
        }
        for dataset in self.ctx.datasets() {
            std::fs::create_dir_all(dataset.path()).map_err(tg_storage::StorageError::from)?;
        }
        for image in self.ctx.images() {
            if let Some(parent) = image.path().parent() {
                std::fs::create_dir_all(parent).map_err(tg_storage::StorageError::from)?;
            }
        }
        Ok(())
    }

    /// Create the Flow directory and spawn root tasks on first run;
    /// otherwise verify that the in-memory DAG still matches `flow.json`
    /// (§4.C, §8 property 3). A divergence is an [`FlowError::Storage`]
    /// wrapping [`tg_storage::StorageError::FlowMutated`].
    pub fn run(&self, dry_run: bool) -> Result<RunOutcome> {
        tracing::info!(path = %self.path.display(), "running flow");
        let flow_json_path = self.flow_json_path();
        let candidate = self.to_flow_file();

        if !flow_json_path.exists() {
            tracing::info!("no existing flow.json, initializing");
            self.create_layout()?;
            tg_storage::flow_codec::dump(&candidate, &flow_json_path)?;

            let roots = self.ctx.root_tasks();
            for name in &roots {
                #[allow(clippy::expect_used)]
                let task = self
                    .ctx
                    .task(name)
                    .expect("root task name came from the same context");
                task.mkdir()?;
                self.spawn_task_init(task, dry_run)?;
            }
            Ok(RunOutcome::Created { roots })
        } else {
            tracing::info!("existing flow.json found, verifying integrity");
            let candidate_hash = candidate.hash()?;
            let on_disk_hash = tg_storage::flow_codec::hash_on_disk(&flow_json_path)?;
            if candidate_hash != on_disk_hash {
                return Err(FlowError::Storage(
                    tg_storage::StorageError::FlowMutated {
                        path: flow_json_path.display().to_string(),
                    },
                ));
            }
            Ok(RunOutcome::AlreadyRunning)
        }
    }

    /// Spawn a task-init process for `task`, mirroring the original's
    /// blocking `os.system(f"... run task ...")`: this process waits for
    /// the child to exit (the child only submits the array and the gated
    /// next-phase script; it does not wait for job completion).
    fn spawn_task_init(&self, task: &Task, dry_run: bool) -> Result<()> {
        let mut cmd = std::process::Command::new(&self.options.tg_binary);
        cmd.arg("run")
            .arg("task")
            .arg("-t")
            .arg(&self.path)
            .arg("-i")
            .arg(task.task_id().to_string());
        if dry_run {
            cmd.arg("--dry-run");
        }
        tracing::info!(task = task.name(), ?cmd, "spawning task-init");
        if dry_run {
            return Ok(());
        }
        let status = cmd.status().map_err(tg_storage::StorageError::from)?;
        if !status.success() {
            tracing::warn!(task = task.name(), "task-init process exited non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod tests;
