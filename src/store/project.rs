//! In-memory state of one project.

use crate::complexity::{self, ComplexityWeights};
use crate::error::{EngineError, EngineResult};
use crate::types::{Complexity, Status, Task, TaskSummary};
use std::collections::HashMap;

/// Canonical record set of one project: tasks in insertion order plus an
/// id index kept in step with the list. Tasks are never removed, so
/// positions are stable for the life of the project.
#[derive(Debug)]
pub struct ProjectState {
    name: String,
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl ProjectState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.index.contains_key(task_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.index.get(task_id).map(|&pos| &self.tasks[pos])
    }

    pub(crate) fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        let pos = *self.index.get(task_id)?;
        Some(&mut self.tasks[pos])
    }

    pub fn require(&self, task_id: &str) -> EngineResult<&Task> {
        self.task(task_id)
            .ok_or_else(|| EngineError::task_not_found(task_id))
    }

    pub(crate) fn require_mut(&mut self, task_id: &str) -> EngineResult<&mut Task> {
        match self.index.get(task_id) {
            Some(&pos) => Ok(&mut self.tasks[pos]),
            None => Err(EngineError::task_not_found(task_id)),
        }
    }

    /// Append a task. The caller has already validated id uniqueness and
    /// dependency references.
    pub(crate) fn push_task(&mut self, task: Task) {
        self.index.insert(task.id.clone(), self.tasks.len());
        self.tasks.push(task);
    }

    /// Find a task by exact title, earliest insertion first.
    pub fn task_by_title(&self, title: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.title == title)
    }

    /// Tasks that depend on the given task, in insertion order.
    pub fn dependents_of(&self, task_id: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.depends_on.iter().any(|dep| dep == task_id))
            .collect()
    }

    /// Ids of the task's dependencies that are not done yet.
    pub fn unmet_dependencies(&self, task: &Task) -> Vec<String> {
        task.depends_on
            .iter()
            .filter(|dep| {
                self.task(dep)
                    .is_none_or(|dep_task| dep_task.status != Status::Done)
            })
            .cloned()
            .collect()
    }

    /// Derived at query time, never stored: any dependency not done.
    pub fn is_blocked(&self, task: &Task) -> bool {
        !self.unmet_dependencies(task).is_empty()
    }

    /// A todo task whose every dependency is done.
    pub fn is_actionable(&self, task: &Task) -> bool {
        task.status == Status::Todo && !self.is_blocked(task)
    }

    /// Compact view of one task for list output.
    pub fn summary(&self, task: &Task) -> TaskSummary {
        TaskSummary {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority,
            status: task.status,
            blocked: self.is_blocked(task),
            complexity: task.complexity,
            subtasks_done: task
                .subtasks
                .iter()
                .filter(|s| s.status == Status::Done)
                .count(),
            subtasks_total: task.subtasks.len(),
        }
    }

    /// Recompute and store the cached complexity category for the given
    /// tasks. Runs on mutation paths only; reads never write the cache.
    pub(crate) fn refresh_complexity(&mut self, ids: &[String], weights: &ComplexityWeights) {
        let updates: Vec<(String, Complexity)> = ids
            .iter()
            .filter_map(|id| {
                self.task(id)
                    .map(|task| (id.clone(), complexity::categorize_task(self, task, weights)))
            })
            .collect();
        for (id, category) in updates {
            if let Some(task) = self.task_mut(&id) {
                task.complexity = Some(category);
            }
        }
    }
}
