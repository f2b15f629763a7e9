// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single fanned-out unit of work within a Task (§4.D, §4.G).
//!
//! A [`Job`] embeds fully resolved [`Dataset`]/[`Image`] handles rather than
//! bare names, mirroring the wire format in [`tg_storage::JobRecord`]: a job
//! runner loads exactly one file and never touches the Context.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tg_core::JobId;
use tg_storage::{DatasetRecord, ImageRecord, JobRecord, OutputSpec as RecordOutputSpec};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::image::Image;

/// An output slot declared on the owning Task: the filename template (still
/// containing its `%KEY` token, substituted by the job runner with a
/// per-job versioned name) and the Dataset it publishes into.
#[derive(Debug, Clone)]
pub struct OutputSpec {
    pub filename_template: String,
    pub dataset: Dataset,
}

/// One element of a Task's array job.
#[derive(Debug, Clone)]
pub struct Job {
    pub job_id: JobId,
    pub task_name: String,
    pub command: String,
    pub input_file: PathBuf,
    pub input_dataset: Dataset,
    pub image: Option<Image>,
    pub secondary_data: IndexMap<String, Dataset>,
    pub outputs: IndexMap<String, OutputSpec>,
    pub binds: IndexMap<String, String>,
    pub envs: IndexMap<String, String>,
}

fn dataset_record(dataset: &Dataset) -> DatasetRecord {
    DatasetRecord {
        name: dataset.name().to_string(),
        path: dataset.path().display().to_string(),
        from_task: dataset.producer().map(str::to_string),
    }
}

fn image_record(image: &Image) -> ImageRecord {
    ImageRecord {
        name: image.name().to_string(),
        path: image.path().display().to_string(),
    }
}

impl Job {
    /// Convert to the on-disk wire format.
    pub fn to_record(&self) -> JobRecord {
        JobRecord {
            job_id: self.job_id.index(),
            task_name: self.task_name.clone(),
            command: self.command.clone(),
            input_file: self.input_file.display().to_string(),
            input_dataset: dataset_record(&self.input_dataset),
            image: self.image.as_ref().map(image_record),
            secondary_data: self
                .secondary_data
                .iter()
                .map(|(key, dataset)| (key.clone(), dataset_record(dataset)))
                .collect(),
            outputs: self
                .outputs
                .iter()
                .map(|(key, spec)| {
                    (
                        key.clone(),
                        RecordOutputSpec {
                            filename_template: spec.filename_template.clone(),
                            dataset: dataset_record(&spec.dataset),
                        },
                    )
                })
                .collect(),
            binds: self.binds.clone(),
            envs: self.envs.clone(),
        }
    }

    /// Write the job descriptor to `path`. Callers must only call this once
    /// per job-id (§5, append-only fan-out).
    pub fn dump(&self, path: &Path) -> Result<()> {
        tg_storage::job_codec::dump(&self.to_record(), path)?;
        Ok(())
    }

    /// Load a previously dumped job descriptor back into a [`Job`].
    pub fn load(path: &Path) -> Result<Job> {
        let record = tg_storage::job_codec::load(path)?;
        Ok(Job::from_record(record))
    }

    fn from_record(record: JobRecord) -> Job {
        let to_dataset = |r: DatasetRecord| Dataset::new(r.name, r.path, r.from_task);
        Job {
            job_id: JobId::new(record.job_id),
            task_name: record.task_name,
            command: record.command,
            input_file: PathBuf::from(record.input_file),
            input_dataset: to_dataset(record.input_dataset),
            image: record
                .image
                .map(|r| Image::new(r.name, r.path)),
            secondary_data: record
                .secondary_data
                .into_iter()
                .map(|(key, r)| (key, to_dataset(r)))
                .collect(),
            outputs: record
                .outputs
                .into_iter()
                .map(|(key, spec)| {
                    (
                        key,
                        OutputSpec {
                            filename_template: spec.filename_template,
                            dataset: to_dataset(spec.dataset),
                        },
                    )
                })
                .collect(),
            binds: record.binds,
            envs: record.envs,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
