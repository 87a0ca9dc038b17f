//! Task store: canonical project records behind per-project locks.

pub mod project;
pub mod snapshot;

mod deps;
mod ingest;
mod tasks;

pub use project::ProjectState;
pub use snapshot::{ProjectSnapshot, SCHEMA_VERSION};

use crate::complexity::ComplexityWeights;
use crate::error::{EngineError, EngineResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Store owning every project's canonical state.
///
/// One `RwLock` per project: mutations hold it exclusively, reads share
/// it, and unrelated projects never contend. The outer registry lock is
/// held only long enough to look up a handle, except on first use of a
/// project name, where it stays held across the creating mutation so a
/// failed first operation leaves no project behind. No engine operation
/// suspends while holding either lock. Lock results are unwrapped: a
/// poisoned lock means a panic mid-mutation, and continuing would expose
/// a half-applied write.
#[derive(Clone)]
pub struct TaskStore {
    projects: Arc<RwLock<HashMap<String, Arc<RwLock<ProjectState>>>>>,
    weights: Arc<ComplexityWeights>,
}

impl TaskStore {
    pub fn new(weights: ComplexityWeights) -> Self {
        Self {
            projects: Arc::new(RwLock::new(HashMap::new())),
            weights: Arc::new(weights),
        }
    }

    /// Store with default weights (for testing and simple embedding).
    pub fn with_defaults() -> Self {
        Self::new(ComplexityWeights::default())
    }

    pub fn weights(&self) -> &ComplexityWeights {
        &self.weights
    }

    /// Register an empty project. First task creation also does this
    /// implicitly; the explicit form conflicts when the name is taken.
    pub fn create_project(&self, name: &str) -> EngineResult<()> {
        validate_project_name(name)?;
        let mut map = self.projects.write().unwrap();
        if map.contains_key(name) {
            return Err(EngineError::project_exists(name));
        }
        map.insert(
            name.to_string(),
            Arc::new(RwLock::new(ProjectState::new(name))),
        );
        info!(project = %name, "Project created");
        Ok(())
    }

    pub fn contains_project(&self, name: &str) -> bool {
        self.projects.read().unwrap().contains_key(name)
    }

    /// Registered project names, sorted for deterministic output.
    pub fn project_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.projects.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Install a fully built project, e.g. from a validated snapshot.
    pub(crate) fn install_project(&self, state: ProjectState) -> EngineResult<()> {
        let mut map = self.projects.write().unwrap();
        if map.contains_key(state.name()) {
            return Err(EngineError::project_exists(state.name()));
        }
        let name = state.name().to_string();
        map.insert(name.clone(), Arc::new(RwLock::new(state)));
        info!(project = %name, "Project installed from snapshot");
        Ok(())
    }

    fn handle(&self, project: &str) -> EngineResult<Arc<RwLock<ProjectState>>> {
        self.projects
            .read()
            .unwrap()
            .get(project)
            .cloned()
            .ok_or_else(|| EngineError::project_not_found(project))
    }

    /// Run a read query under the project's shared lock.
    pub fn with_project<F, T>(&self, project: &str, f: F) -> EngineResult<T>
    where
        F: FnOnce(&ProjectState) -> EngineResult<T>,
    {
        let handle = self.handle(project)?;
        let state = handle.read().unwrap();
        f(&state)
    }

    /// Run a mutation under the project's exclusive lock. The closure
    /// validates before it applies; on error the state is untouched.
    pub fn with_project_mut<F, T>(&self, project: &str, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut ProjectState) -> EngineResult<T>,
    {
        let handle = self.handle(project)?;
        let mut state = handle.write().unwrap();
        f(&mut state)
    }

    /// Mutation variant that creates the project on first use. The new
    /// project is built aside and registered only if the closure
    /// succeeds, so a failed first operation leaves no trace.
    pub(crate) fn with_project_mut_or_create<F, T>(&self, project: &str, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut ProjectState) -> EngineResult<T>,
    {
        validate_project_name(project)?;

        let existing = self.projects.read().unwrap().get(project).cloned();
        if let Some(handle) = existing {
            let mut state = handle.write().unwrap();
            return f(&mut state);
        }

        // First use. Hold the registry lock across the check-and-insert
        // so two first calls for the same name cannot interleave.
        let mut map = self.projects.write().unwrap();
        if let Some(handle) = map.get(project).cloned() {
            drop(map);
            let mut state = handle.write().unwrap();
            return f(&mut state);
        }
        let mut state = ProjectState::new(project);
        let value = f(&mut state)?;
        map.insert(
            project.to_string(),
            Arc::new(RwLock::new(state)),
        );
        info!(project = %project, "Project created on first use");
        Ok(value)
    }
}

fn validate_project_name(name: &str) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(EngineError::invalid_value(
            "project",
            "project name must not be empty",
        ));
    }
    Ok(())
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
