//! Embedding surface: a typed facade plus a JSON operation registry.

pub mod ops;

use crate::error::EngineResult;
use crate::store::{ProjectSnapshot, TaskStore, snapshot};
use crate::types::{
    ComplexityReport, DependencyInfo, IngestReport, Status, Subtask, Task, TaskDescriptor,
    TaskSpec, TaskSummary,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use ops::OperationRegistry;

/// Typed entry point for embedders. Clones share the underlying store.
#[derive(Clone)]
pub struct WorkflowApi {
    store: Arc<TaskStore>,
}

impl WorkflowApi {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn create_project(&self, name: &str) -> EngineResult<()> {
        self.store.create_project(name)
    }

    pub fn project_names(&self) -> Vec<String> {
        self.store.project_names()
    }

    pub fn add_task(&self, project: &str, spec: TaskSpec) -> EngineResult<Task> {
        self.store.add_task(project, spec)
    }

    pub fn add_subtask(&self, project: &str, task_id: &str, title: &str) -> EngineResult<Subtask> {
        self.store.add_subtask(project, task_id, title)
    }

    pub fn add_dependency(&self, project: &str, from: &str, to: &str) -> EngineResult<()> {
        self.store.add_dependency(project, from, to)
    }

    pub fn set_task_status(&self, project: &str, task_id: &str, to: Status) -> EngineResult<Task> {
        self.store.set_task_status(project, task_id, to)
    }

    pub fn set_subtask_status(
        &self,
        project: &str,
        task_id: &str,
        subtask_id: &str,
        to: Status,
    ) -> EngineResult<Subtask> {
        self.store.set_subtask_status(project, task_id, subtask_id, to)
    }

    pub fn get_task(&self, project: &str, task_id: &str) -> EngineResult<Task> {
        self.store.get_task(project, task_id)
    }

    pub fn list_tasks(
        &self,
        project: &str,
        status: Option<Status>,
    ) -> EngineResult<Vec<TaskSummary>> {
        self.store.list_tasks(project, status)
    }

    /// Highest-priority unblocked todo task, or `None` when nothing is ready.
    pub fn next_task(&self, project: &str) -> EngineResult<Option<Task>> {
        self.store.next_task(project)
    }

    pub fn topological_order(&self, project: &str) -> EngineResult<Vec<String>> {
        self.store.topological_order(project)
    }

    pub fn dependency_info(&self, project: &str, task_id: &str) -> EngineResult<DependencyInfo> {
        self.store.dependency_info(project, task_id)
    }

    pub fn ingest_prd(
        &self,
        project: &str,
        descriptors: Vec<TaskDescriptor>,
    ) -> EngineResult<IngestReport> {
        self.store.ingest_prd(project, descriptors)
    }

    pub fn estimate_complexity(
        &self,
        project: &str,
        task_id: &str,
    ) -> EngineResult<ComplexityReport> {
        self.store.estimate(project, task_id)
    }

    pub fn export_project(&self, project: &str) -> EngineResult<ProjectSnapshot> {
        self.store.export_project(project)
    }

    pub fn import_project(&self, snapshot: ProjectSnapshot) -> EngineResult<String> {
        self.store.import_project(snapshot)
    }

    /// Write a project's snapshot into `dir` under its canonical file name.
    pub fn save_project(&self, project: &str, dir: &Path) -> anyhow::Result<PathBuf> {
        let snapshot = self.store.export_project(project)?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(snapshot::default_file_name(project));
        snapshot.write_file(&path)?;
        Ok(path)
    }

    /// Load a snapshot file and install it as a new project.
    pub fn load_project(&self, path: &Path) -> anyhow::Result<String> {
        let snapshot = ProjectSnapshot::from_file(path)?;
        Ok(self.store.import_project(snapshot)?)
    }
}
