// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The live registry of Datasets, Images, and Tasks building up a Flow's DAG
//! (§4.B, §9 "Process-wide Context").
//!
//! An explicit `Arc<Mutex<Context>>` handle is threaded through
//! constructors rather than a process-global, so construction-time
//! discipline — unique names, resolvable references, acyclicity — is
//! enforced by the type system instead of by convention.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tg_core::TaskId;

use crate::dataset::{Dataset, DatasetRef};
use crate::error::{FlowError, Result};
use crate::image::{Image, ImageRef};
use crate::task::Task;

pub type SharedContext = Arc<Mutex<Context>>;

/// The registry of everything declared so far while a Flow is being built.
#[derive(Default)]
pub struct Context {
    datasets: IndexMap<String, Dataset>,
    images: IndexMap<String, Image>,
    tasks: IndexMap<String, Task>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedContext {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn register_dataset(&mut self, dataset: Dataset) -> Result<()> {
        if self.datasets.contains_key(dataset.name()) {
            return Err(FlowError::DatasetExists(dataset.name().to_string()));
        }
        self.datasets.insert(dataset.name().to_string(), dataset);
        Ok(())
    }

    pub fn register_image(&mut self, image: Image) -> Result<()> {
        if self.images.contains_key(image.name()) {
            return Err(FlowError::ImageExists(image.name().to_string()));
        }
        self.images.insert(image.name().to_string(), image);
        Ok(())
    }

    pub fn resolve_dataset(&self, reference: &DatasetRef) -> Result<Dataset> {
        match reference {
            DatasetRef::ByHandle(dataset) => Ok(dataset.clone()),
            DatasetRef::ByName(name) => self
                .datasets
                .get(name)
                .cloned()
                .ok_or_else(|| FlowError::DatasetNotFound(name.clone())),
        }
    }

    pub fn resolve_image(&self, reference: &ImageRef) -> Result<Image> {
        match reference {
            ImageRef::ByHandle(image) => Ok(image.clone()),
            ImageRef::ByName(name) => self
                .images
                .get(name)
                .cloned()
                .ok_or_else(|| FlowError::ImageNotFound(name.clone())),
        }
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.get(name)
    }

    pub fn image(&self, name: &str) -> Option<&Image> {
        self.images.get(name)
    }

    pub fn datasets(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.values()
    }

    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.images.values()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn task_by_id(&self, id: TaskId) -> Option<&Task> {
        self.tasks.values().find(|t| t.task_id() == id)
    }

    /// Direct predecessor task names of `task`: the producers of its input
    /// dataset and every secondary dataset, deduplicated, in encounter
    /// order.
    fn direct_predecessors(&self, task: &Task) -> Vec<String> {
        let mut preds = Vec::new();
        if let Some(producer) = task.input_data().producer() {
            preds.push(producer.to_string());
        }
        for dataset in task.secondary_data().values() {
            if let Some(producer) = dataset.producer() {
                if !preds.contains(&producer.to_string()) {
                    preds.push(producer.to_string());
                }
            }
        }
        preds
    }

    /// True iff `target` is reachable by following predecessor edges
    /// starting at `start` (inclusive) — used to reject a Task construction
    /// that would close a cycle (§8 property 6).
    fn reaches(&self, start: &str, target: &str) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![start.to_string()];
        while let Some(name) = stack.pop() {
            if name == target {
                return true;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(task) = self.tasks.get(&name) {
                stack.extend(self.direct_predecessors(task));
            }
        }
        false
    }

    /// Register a fully constructed Task after checking name uniqueness and
    /// acyclicity against the tasks already in scope.
    pub(crate) fn register_task(&mut self, task: Task) -> Result<()> {
        if self.tasks.contains_key(task.name()) {
            return Err(FlowError::TaskExists(task.name().to_string()));
        }
        for predecessor in self.direct_predecessors(&task) {
            if self.reaches(&predecessor, task.name()) {
                return Err(FlowError::CycleDetected(task.name().to_string()));
            }
        }
        self.tasks.insert(task.name().to_string(), task);
        Ok(())
    }

    /// Insert an already-validated Task without re-running name/cycle
    /// checks. Used only when reloading a trusted `flow.json` (§4.C).
    pub(crate) fn insert_task_unchecked(&mut self, task: Task) {
        self.tasks.insert(task.name().to_string(), task);
    }

    /// Names of the tasks directly downstream of `task_name`.
    pub fn successors_of(&self, task_name: &str) -> Vec<String> {
        self.tasks
            .values()
            .filter(|t| self.direct_predecessors(t).iter().any(|p| p == task_name))
            .map(|t| t.name().to_string())
            .collect()
    }

    /// Names of the tasks directly upstream of `task_name`.
    pub fn predecessors_of(&self, task_name: &str) -> Vec<String> {
        self.tasks
            .get(task_name)
            .map(|t| self.direct_predecessors(t))
            .unwrap_or_default()
    }

    /// Every task reachable downstream of `task_name`, transitively,
    /// excluding `task_name` itself (§4.F cascade, §8 property 8).
    pub fn transitive_successors(&self, task_name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut stack = self.successors_of(task_name);
        let mut out = Vec::new();
        while let Some(name) = stack.pop() {
            if seen.insert(name.clone()) {
                out.push(name.clone());
                stack.extend(self.successors_of(&name));
            }
        }
        out
    }

    /// Tasks with no predecessor: the roots a Flow session spawns task-init
    /// processes for on first creation (§4.C).
    pub fn root_tasks(&self) -> Vec<String> {
        self.tasks
            .values()
            .filter(|t| self.direct_predecessors(t).is_empty())
            .map(|t| t.name().to_string())
            .collect()
    }

    /// A flattened view used to build [`tg_storage::FlowFile`] (§6).
    pub fn task_records(&self) -> IndexMap<String, Task> {
        self.tasks.clone()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
