//! Dependency edge operations.

use super::{TaskStore, now_ms};
use crate::error::EngineResult;
use crate::graph::DependencyGraph;
use crate::types::{DependencyInfo, Task, TaskRef};
use tracing::info;

fn task_ref(task: &Task) -> TaskRef {
    TaskRef {
        id: task.id.clone(),
        title: task.title.clone(),
        status: task.status,
    }
}

impl TaskStore {
    /// Add an edge: `from` depends_on `to`. Fails with a cycle error when
    /// `to` already reaches `from`; a duplicate edge is a no-op.
    pub fn add_dependency(&self, project: &str, from: &str, to: &str) -> EngineResult<()> {
        self.with_project_mut(project, |state| {
            let from_task = state.require(from)?;
            state.require(to)?;
            if from_task.depends_on.iter().any(|dep| dep == to) {
                return Ok(());
            }
            DependencyGraph::new(state).check_edge(from, to)?;

            let now = now_ms();
            let task = state.require_mut(from)?;
            task.depends_on.push(to.to_string());
            task.updated_at = now;
            state.refresh_complexity(&[from.to_string(), to.to_string()], self.weights());

            info!(project = %project, from = %from, to = %to, "Dependency added");
            Ok(())
        })
    }

    /// Both directions of one task's dependency relation, with current
    /// statuses resolved.
    pub fn dependency_info(&self, project: &str, task_id: &str) -> EngineResult<DependencyInfo> {
        self.with_project(project, |state| {
            let task = state.require(task_id)?;
            let depends_on = task
                .depends_on
                .iter()
                .filter_map(|id| state.task(id))
                .map(task_ref)
                .collect();
            let dependents = state
                .dependents_of(task_id)
                .into_iter()
                .map(task_ref)
                .collect();
            Ok(DependencyInfo {
                task_id: task_id.to_string(),
                depends_on,
                dependents,
            })
        })
    }
}
