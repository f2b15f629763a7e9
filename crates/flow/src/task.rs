// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A node in the DAG: one command, fanned out over an input Dataset (§4.D).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tg_core::clock::SystemClock;
use tg_core::{Clock, JobId, State, Status, TaskId};
use tg_scheduler::{SbatchScript, NO_JOB_ID};

use crate::context::Context;
use crate::dataset::{Dataset, DatasetRef};
use crate::error::{FlowError, Result};
use crate::image::{Image, ImageRef};
use crate::job::Job;
use crate::template;

/// An output slot declared on a Task: a filename template (still containing
/// its `%KEY` token) and the Dataset it publishes into. Shared by [`Task`]
/// (the declared shape) and [`crate::job::Job`] (the per-job instance).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub filename_template: String,
    pub dataset: Dataset,
}

/// The not-yet-resolved shape of a Task, as a caller assembles it before
/// handing it to [`Task::new`] for validation and registration.
pub struct TaskSpec {
    pub name: String,
    pub command: String,
    pub input_data: DatasetRef,
    pub image: Option<ImageRef>,
    pub secondary_data: IndexMap<String, DatasetRef>,
    pub outputs: IndexMap<String, String>,
    pub partition: String,
    pub binds: IndexMap<String, String>,
    pub envs: IndexMap<String, String>,
}

/// A node in the DAG: one command template, fanned out over every file in
/// its input Dataset.
#[derive(Debug, Clone)]
pub struct Task {
    task_id: TaskId,
    name: String,
    command: String,
    input_data: Dataset,
    image: Option<Image>,
    secondary_data: IndexMap<String, Dataset>,
    outputs: IndexMap<String, OutputSpec>,
    partition: String,
    binds: IndexMap<String, String>,
    envs: IndexMap<String, String>,
    root: PathBuf,
}

impl Task {
    /// Validate `spec` against `ctx` (placeholder completeness, dataset/
    /// image resolution, acyclicity, name uniqueness), register its
    /// output datasets and itself into `ctx`, and return the constructed
    /// Task.
    pub fn new(ctx: &mut Context, flow_root: &Path, spec: TaskSpec) -> Result<Task> {
        if !template::contains_token(&spec.command, "IN") {
            return Err(FlowError::PlaceholderMissing {
                task: spec.name.clone(),
                placeholder: "IN".to_string(),
            });
        }
        for key in spec.secondary_data.keys().chain(spec.outputs.keys()) {
            if !template::contains_token(&spec.command, key) {
                return Err(FlowError::PlaceholderMissing {
                    task: spec.name.clone(),
                    placeholder: key.clone(),
                });
            }
        }

        let input_data = ctx.resolve_dataset(&spec.input_data)?;
        let image = spec
            .image
            .as_ref()
            .map(|r| ctx.resolve_image(r))
            .transpose()?;
        let secondary_data = spec
            .secondary_data
            .iter()
            .map(|(key, reference)| ctx.resolve_dataset(reference).map(|d| (key.clone(), d)))
            .collect::<Result<IndexMap<_, _>>>()?;

        let datasets_root = flow_root.join("datasets");
        let mut outputs = IndexMap::new();
        for (key, filename_template) in &spec.outputs {
            let dataset_name = format!("{}.{}", spec.name, filename_template);
            let dataset = Dataset::new(
                dataset_name.clone(),
                datasets_root.join(&dataset_name),
                Some(spec.name.clone()),
            );
            ctx.register_dataset(dataset.clone())?;
            outputs.insert(
                key.clone(),
                OutputSpec {
                    filename_template: filename_template.clone(),
                    dataset,
                },
            );
        }

        let task_id = TaskId::new(ctx.tasks().count() as u32);
        let task = Task {
            task_id,
            name: spec.name.clone(),
            command: spec.command,
            input_data,
            image,
            secondary_data,
            outputs,
            partition: spec.partition,
            binds: spec.binds,
            envs: spec.envs,
            root: flow_root.join("tasks").join(&spec.name),
        };

        ctx.register_task(task.clone())?;
        Ok(task)
    }

    /// Reconstruct a Task directly from already-validated, already-resolved
    /// parts, bypassing placeholder/acyclicity checks. Used when reloading
    /// a Flow from an existing `flow.json` (§4.E, §4.F): the data was
    /// validated once at creation time and is trusted thereafter.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn reconstruct(
        task_id: TaskId,
        name: String,
        command: String,
        input_data: Dataset,
        image: Option<Image>,
        secondary_data: IndexMap<String, Dataset>,
        outputs: IndexMap<String, OutputSpec>,
        partition: String,
        binds: IndexMap<String, String>,
        envs: IndexMap<String, String>,
        root: PathBuf,
    ) -> Task {
        Task {
            task_id,
            name,
            command,
            input_data,
            image,
            secondary_data,
            outputs,
            partition,
            binds,
            envs,
            root,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn input_data(&self) -> &Dataset {
        &self.input_data
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn secondary_data(&self) -> &IndexMap<String, Dataset> {
        &self.secondary_data
    }

    pub fn outputs(&self) -> &IndexMap<String, OutputSpec> {
        &self.outputs
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn binds(&self) -> &IndexMap<String, String> {
        &self.binds
    }

    pub fn envs(&self) -> &IndexMap<String, String> {
        &self.envs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn status_path(&self) -> PathBuf {
        self.root.join("status").join("status.json")
    }

    pub fn jobs_inputs_dir(&self) -> PathBuf {
        self.root.join("jobs").join("inputs")
    }

    pub fn jobs_status_dir(&self) -> PathBuf {
        self.root.join("jobs").join("status")
    }

    pub fn works_dir(&self) -> PathBuf {
        self.root.join("works")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn job_status_path(&self, job_id: JobId) -> PathBuf {
        self.jobs_status_dir().join(format!("job_{}.json", job_id))
    }

    pub fn job_input_path(&self, job_id: JobId) -> PathBuf {
        self.jobs_inputs_dir().join(format!("job_{}.json", job_id))
    }

    /// Materialize the task subtree and bring the on-disk job set up to
    /// date with the current contents of the input Dataset (§4.D).
    pub fn mkdir(&self) -> Result<()> {
        for dir in [
            self.root.join("status"),
            self.jobs_inputs_dir(),
            self.jobs_status_dir(),
            self.works_dir(),
            self.scripts_dir(),
            self.logs_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(tg_storage::StorageError::from)?;
        }
        self.update_jobs()?;
        Ok(())
    }

    /// Synchronize the on-disk job set with the input Dataset's current
    /// contents. Existing job descriptors are never rewritten: this makes
    /// fan-out idempotent and restart-safe (§8 properties 1-2).
    pub fn update_jobs(&self) -> Result<usize> {
        let inputs_dir = self.jobs_inputs_dir();
        std::fs::create_dir_all(&inputs_dir).map_err(tg_storage::StorageError::from)?;

        let mut existing_basenames = HashSet::new();
        let mut existing_count = 0usize;
        let mut entries: Vec<_> = std::fs::read_dir(&inputs_dir)
            .map_err(tg_storage::StorageError::from)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        entries.sort();
        for entry in &entries {
            let record = tg_storage::job_codec::load(entry)?;
            if let Some(basename) = Path::new(&record.input_file).file_name() {
                existing_basenames.insert(basename.to_string_lossy().into_owned());
            }
            existing_count += 1;
        }

        let clock = SystemClock;
        let mut created = 0usize;
        for file in self.input_data.files()? {
            let Some(basename) = file.file_name().map(|f| f.to_string_lossy().into_owned()) else {
                continue;
            };
            if existing_basenames.contains(&basename) {
                continue;
            }
            let job_id = JobId::new((existing_count + created) as u32);
            let job = Job {
                job_id,
                task_name: self.name.clone(),
                command: self.command.clone(),
                input_file: file.clone(),
                input_dataset: self.input_data.clone(),
                image: self.image.clone(),
                secondary_data: self.secondary_data.clone(),
                outputs: self
                    .outputs
                    .iter()
                    .map(|(k, spec)| {
                        (
                            k.clone(),
                            crate::job::OutputSpec {
                                filename_template: spec.filename_template.clone(),
                                dataset: spec.dataset.clone(),
                            },
                        )
                    })
                    .collect(),
                binds: self.binds.clone(),
                envs: self.envs.clone(),
            };
            job.dump(&self.job_input_path(job_id))?;
            let mut status = Status::new(clock.now());
            status.set(State::Assigned);
            tg_storage::status_store::store_status(&self.job_status_path(job_id), &status)?;
            created += 1;
        }
        Ok(created)
    }

    /// True iff at least one job is currently `ASSIGNED` (§4.D).
    pub fn has_jobs(&self) -> Result<bool> {
        Ok(!self.assigned_job_ids()?.is_empty())
    }

    /// Every job-id with a status file under `jobs/status/`, ascending.
    pub fn job_ids(&self) -> Result<Vec<JobId>> {
        let status_dir = self.jobs_status_dir();
        if !status_dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids: Vec<JobId> = std::fs::read_dir(&status_dir)
            .map_err(tg_storage::StorageError::from)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                let stem = path.file_stem()?.to_str()?.to_string();
                stem.strip_prefix("job_")?.parse::<u32>().ok()
            })
            .map(JobId::new)
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Current status of one job.
    pub fn job_status(&self, job_id: JobId) -> Result<Status> {
        let clock = SystemClock;
        Ok(tg_storage::status_store::load_status(
            &self.job_status_path(job_id),
            &clock,
        )?)
    }

    /// Current status of the task itself.
    pub fn status(&self) -> Result<Status> {
        let clock = SystemClock;
        std::fs::create_dir_all(self.root.join("status")).map_err(tg_storage::StorageError::from)?;
        Ok(tg_storage::status_store::load_status(
            &self.status_path(),
            &clock,
        )?)
    }

    /// Set the task's own status state.
    pub fn set_state(&self, state: State) -> Result<Status> {
        let clock = SystemClock;
        std::fs::create_dir_all(self.root.join("status")).map_err(tg_storage::StorageError::from)?;
        Ok(tg_storage::status_store::set_state(
            &self.status_path(),
            state,
            &clock,
        )?)
    }

    fn assigned_job_ids(&self) -> Result<Vec<JobId>> {
        let clock = SystemClock;
        let status_dir = self.jobs_status_dir();
        if !status_dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        let mut entries: Vec<_> = std::fs::read_dir(&status_dir)
            .map_err(tg_storage::StorageError::from)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        entries.sort();
        for entry in entries {
            let Some(stem) = entry.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(id_str) = stem.strip_prefix("job_") else {
                continue;
            };
            let Ok(job_id) = id_str.parse::<u32>() else {
                continue;
            };
            let status = tg_storage::status_store::load_status(&entry, &clock)?;
            if status.state.is_assigned() {
                ids.push(JobId::new(job_id));
            }
        }
        Ok(ids)
    }

    /// Build and submit an array-job script covering exactly the jobs
    /// currently `ASSIGNED`, targeting `scripts/run_task_<id>.sh` (§4.D).
    /// Returns the submitted array job-id, or [`NO_JOB_ID`] on dry-run or
    /// when there is nothing to submit.
    pub async fn submit(
        &self,
        virtualenv: Option<&str>,
        tg_binary: &str,
        dry_run: bool,
    ) -> Result<i64> {
        let ids = self.assigned_job_ids()?;
        if ids.is_empty() {
            return Ok(NO_JOB_ID);
        }
        let array_spec = ids
            .iter()
            .map(|id| id.index().to_string())
            .collect::<Vec<_>>()
            .join(",");

        let script_path = self
            .scripts_dir()
            .join(format!("run_task_{}.sh", self.task_id));
        let options = vec![
            ("JOB_NAME".to_string(), Some(format!("tg-{}", self.name))),
            (
                "OUTPUT_FILE".to_string(),
                Some(
                    self.logs_dir()
                        .join("job_%a.out")
                        .display()
                        .to_string(),
                ),
            ),
            (
                "ERROR_FILE".to_string(),
                Some(self.logs_dir().join("job_%a.err").display().to_string()),
            ),
            ("PARTITION".to_string(), Some(self.partition.clone())),
            ("ARRAY".to_string(), Some(array_spec)),
        ];
        let mut script = SbatchScript::new(&script_path, options, virtualenv)?;
        script.add_line(format!(
            "{tg_binary} run job -i {}/job_${{SLURM_ARRAY_TASK_ID}}.json -o {}/job_${{SLURM_ARRAY_TASK_ID}}",
            self.jobs_inputs_dir().display(),
            self.works_dir().display(),
        ));
        let job_id = script.submit(dry_run).await?;
        Ok(job_id)
    }

    /// Build and submit the task-next phase script, gated on the array's
    /// completion with `afterok` when `array_job_id` is a real id (§4.E).
    pub async fn submit_next(
        &self,
        flow_dir: &Path,
        array_job_id: Option<i64>,
        virtualenv: Option<&str>,
        tg_binary: &str,
        dry_run: bool,
    ) -> Result<i64> {
        let script_path = self
            .scripts_dir()
            .join(format!("run_next_{}.sh", self.task_id));
        let mut options = vec![
            (
                "JOB_NAME".to_string(),
                Some(format!("tg-{}-next", self.name)),
            ),
            (
                "OUTPUT_FILE".to_string(),
                Some(self.logs_dir().join("next.out").display().to_string()),
            ),
            (
                "ERROR_FILE".to_string(),
                Some(self.logs_dir().join("next.err").display().to_string()),
            ),
            ("PARTITION".to_string(), Some(self.partition.clone())),
        ];
        if let Some(array_id) = array_job_id {
            if array_id != NO_JOB_ID {
                options.push((
                    "DEPENDENCY".to_string(),
                    Some(format!("afterok:{array_id}")),
                ));
            }
        }
        let mut script = SbatchScript::new(&script_path, options, virtualenv)?;
        script.add_line(format!(
            "{tg_binary} run next -t {} -i {}",
            flow_dir.display(),
            self.task_id,
        ));
        Ok(script.submit(dry_run).await?)
    }

    /// Build and submit the task-init trigger script for this task, run
    /// when an upstream task-next decides to advance the DAG into it
    /// (§4.F step 4).
    pub async fn submit_init_trigger(
        &self,
        flow_dir: &Path,
        virtualenv: Option<&str>,
        tg_binary: &str,
        dry_run: bool,
    ) -> Result<i64> {
        let script_path = self
            .scripts_dir()
            .join(format!("run_init_{}.sh", self.task_id));
        let options = vec![
            (
                "JOB_NAME".to_string(),
                Some(format!("tg-{}-init", self.name)),
            ),
            (
                "OUTPUT_FILE".to_string(),
                Some(self.logs_dir().join("init.out").display().to_string()),
            ),
            (
                "ERROR_FILE".to_string(),
                Some(self.logs_dir().join("init.err").display().to_string()),
            ),
            ("PARTITION".to_string(), Some(self.partition.clone())),
        ];
        let mut script = SbatchScript::new(&script_path, options, virtualenv)?;
        script.add_line(format!(
            "{tg_binary} run task -t {} -i {}",
            flow_dir.display(),
            self.task_id,
        ));
        Ok(script.submit(dry_run).await?)
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
