//! Task and subtask operations.

use super::{TaskStore, now_ms};
use crate::complexity;
use crate::error::{EngineError, EngineResult};
use crate::graph::DependencyGraph;
use crate::status;
use crate::types::{ComplexityReport, Status, Subtask, Task, TaskSpec, TaskSummary};
use tracing::{debug, info};
use uuid::Uuid;

impl TaskStore {
    /// Create a task. Creates the project on first use; dependency ids
    /// must reference existing tasks in the same project.
    pub fn add_task(&self, project: &str, spec: TaskSpec) -> EngineResult<Task> {
        let title = spec.title.trim().to_string();
        if title.is_empty() {
            return Err(EngineError::invalid_value(
                "title",
                "title must not be empty",
            ));
        }
        let mut subtask_titles = Vec::with_capacity(spec.subtasks.len());
        for raw in &spec.subtasks {
            let sub_title = raw.trim();
            if sub_title.is_empty() {
                return Err(EngineError::invalid_value(
                    "subtasks",
                    "subtask title must not be empty",
                ));
            }
            subtask_titles.push(sub_title.to_string());
        }

        self.with_project_mut_or_create(project, |state| {
            let mut depends_on: Vec<String> = Vec::new();
            for dep in &spec.depends_on {
                state.require(dep)?;
                if !depends_on.contains(dep) {
                    depends_on.push(dep.clone());
                }
            }

            let id = Uuid::now_v7().to_string();
            // A task without dependents cannot close a cycle; every edge
            // still goes through the same check before commit.
            let graph = DependencyGraph::new(state);
            for dep in &depends_on {
                graph.check_edge(&id, dep)?;
            }

            let now = now_ms();
            let subtasks = subtask_titles
                .iter()
                .map(|sub_title| Subtask {
                    id: Uuid::now_v7().to_string(),
                    title: sub_title.clone(),
                    status: Status::Todo,
                    created_at: now,
                    updated_at: now,
                })
                .collect();
            let task = Task {
                id: id.clone(),
                title,
                description: spec.description,
                priority: spec.priority.unwrap_or_default(),
                status: Status::Todo,
                subtasks,
                depends_on: depends_on.clone(),
                complexity: None,
                created_at: now,
                updated_at: now,
            };
            state.push_task(task);

            let mut touched = depends_on;
            touched.push(id.clone());
            state.refresh_complexity(&touched, self.weights());

            info!(project = %project, task = %id, "Task created");
            Ok(state.require(&id)?.clone())
        })
    }

    /// Append a subtask to an existing task.
    pub fn add_subtask(&self, project: &str, task_id: &str, title: &str) -> EngineResult<Subtask> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(EngineError::invalid_value(
                "title",
                "subtask title must not be empty",
            ));
        }

        self.with_project_mut(project, |state| {
            state.require(task_id)?;
            let now = now_ms();
            let subtask = Subtask {
                id: Uuid::now_v7().to_string(),
                title,
                status: Status::Todo,
                created_at: now,
                updated_at: now,
            };
            let task = state.require_mut(task_id)?;
            task.subtasks.push(subtask.clone());
            task.updated_at = now;
            state.refresh_complexity(&[task_id.to_string()], self.weights());

            info!(project = %project, task = %task_id, subtask = %subtask.id, "Subtask added");
            Ok(subtask)
        })
    }

    /// Transition a task's status. Entering done requires every subtask
    /// and every dependency done.
    pub fn set_task_status(&self, project: &str, task_id: &str, to: Status) -> EngineResult<Task> {
        self.with_project_mut(project, |state| {
            let task = state.require(task_id)?;
            status::ensure_task_transition(state, task, to)?;

            let now = now_ms();
            let task = state.require_mut(task_id)?;
            task.status = to;
            task.updated_at = now;
            let updated = task.clone();

            info!(project = %project, task = %task_id, status = %to.as_str(), "Task status updated");
            Ok(updated)
        })
    }

    /// Transition one subtask's status. Never promotes the parent task.
    pub fn set_subtask_status(
        &self,
        project: &str,
        task_id: &str,
        subtask_id: &str,
        to: Status,
    ) -> EngineResult<Subtask> {
        self.with_project_mut(project, |state| {
            let task = state.require(task_id)?;
            let current = task
                .subtasks
                .iter()
                .find(|s| s.id == subtask_id)
                .ok_or_else(|| EngineError::subtask_not_found(subtask_id))?
                .status;
            status::ensure_transition(current, to)?;

            let now = now_ms();
            let task = state.require_mut(task_id)?;
            let subtask = task
                .subtasks
                .iter_mut()
                .find(|s| s.id == subtask_id)
                .ok_or_else(|| EngineError::subtask_not_found(subtask_id))?;
            subtask.status = to;
            subtask.updated_at = now;
            let updated = subtask.clone();
            task.updated_at = now;

            info!(
                project = %project,
                task = %task_id,
                subtask = %subtask_id,
                status = %to.as_str(),
                "Subtask status updated"
            );
            Ok(updated)
        })
    }

    /// Full record of one task.
    pub fn get_task(&self, project: &str, task_id: &str) -> EngineResult<Task> {
        self.with_project(project, |state| Ok(state.require(task_id)?.clone()))
    }

    /// Ordered task summaries, optionally filtered by status. The blocked
    /// flag is derived here, never stored.
    pub fn list_tasks(
        &self,
        project: &str,
        status: Option<Status>,
    ) -> EngineResult<Vec<TaskSummary>> {
        self.with_project(project, |state| {
            Ok(state
                .tasks()
                .iter()
                .filter(|t| status.is_none_or(|s| t.status == s))
                .map(|t| state.summary(t))
                .collect())
        })
    }

    /// The next actionable task, or None when nothing is ready.
    pub fn next_task(&self, project: &str) -> EngineResult<Option<Task>> {
        self.with_project(project, |state| {
            let next = DependencyGraph::new(state).next_actionable().cloned();
            debug!(
                project = %project,
                next = %next.as_ref().map(|t| t.id.as_str()).unwrap_or("none"),
                "Next task query"
            );
            Ok(next)
        })
    }

    /// Dependencies-first ordering over the whole project.
    pub fn topological_order(&self, project: &str) -> EngineResult<Vec<String>> {
        self.with_project(project, |state| DependencyGraph::new(state).topological_order())
    }

    /// Complexity report for one task, computed from the live view.
    pub fn estimate(&self, project: &str, task_id: &str) -> EngineResult<ComplexityReport> {
        self.with_project(project, |state| {
            let task = state.require(task_id)?;
            Ok(complexity::score_task(state, task, self.weights()))
        })
    }
}
