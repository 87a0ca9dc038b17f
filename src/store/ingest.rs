//! PRD ingestion: batch expansion of a requirements document into tasks.

use super::{TaskStore, now_ms};
use crate::error::{EngineError, EngineResult};
use crate::graph;
use crate::types::{IngestReport, Status, Subtask, Task, TaskDescriptor};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

impl TaskStore {
    /// Expand a parsed PRD into tasks and dependency edges, all or nothing.
    ///
    /// Dependency titles resolve against the batch first (first occurrence
    /// wins), then against tasks already in the project. An unresolved
    /// title produces a warning and the edge is omitted. A batch whose
    /// edges would leave the project cyclic is rejected whole.
    pub fn ingest_prd(
        &self,
        project: &str,
        descriptors: Vec<TaskDescriptor>,
    ) -> EngineResult<IngestReport> {
        if descriptors.is_empty() {
            return Err(EngineError::invalid_value(
                "tasks",
                "PRD batch must contain at least one task",
            ));
        }
        for descriptor in &descriptors {
            if descriptor.title.trim().is_empty() {
                return Err(EngineError::invalid_value(
                    "title",
                    "every PRD task needs a non-empty title",
                ));
            }
            for raw in &descriptor.subtasks {
                if raw.trim().is_empty() {
                    return Err(EngineError::invalid_value(
                        "subtasks",
                        "subtask title must not be empty",
                    ));
                }
            }
        }

        self.with_project_mut_or_create(project, |state| {
            let ids: Vec<String> = descriptors
                .iter()
                .map(|_| Uuid::now_v7().to_string())
                .collect();
            let mut warnings: Vec<String> = Vec::new();

            // Titles resolve to the first batch occurrence.
            let mut by_title: HashMap<&str, usize> = HashMap::new();
            for (pos, descriptor) in descriptors.iter().enumerate() {
                let title = descriptor.title.trim();
                if by_title.contains_key(title) {
                    warnings.push(format!(
                        "duplicate title '{}' in batch; references resolve to the first occurrence",
                        title
                    ));
                } else {
                    by_title.insert(title, pos);
                }
            }

            let mut staged_deps: Vec<Vec<String>> = Vec::with_capacity(descriptors.len());
            let mut edges_created = 0usize;
            for descriptor in &descriptors {
                let mut resolved: Vec<String> = Vec::new();
                for wanted in &descriptor.suggested_dependencies {
                    let wanted = wanted.trim();
                    let dep_id = by_title
                        .get(wanted)
                        .map(|&pos| ids[pos].clone())
                        .or_else(|| state.task_by_title(wanted).map(|t| t.id.clone()));
                    match dep_id {
                        Some(dep_id) => {
                            if !resolved.contains(&dep_id) {
                                resolved.push(dep_id);
                            }
                        }
                        None => warnings.push(format!(
                            "task '{}' references unknown dependency title '{}'; edge omitted",
                            descriptor.title.trim(),
                            wanted
                        )),
                    }
                }
                edges_created += resolved.len();
                staged_deps.push(resolved);
            }

            // Acyclicity is judged on the union of existing and staged tasks.
            let mut nodes: Vec<(&str, &[String])> = state
                .tasks()
                .iter()
                .map(|t| (t.id.as_str(), t.depends_on.as_slice()))
                .collect();
            for (pos, deps) in staged_deps.iter().enumerate() {
                nodes.push((ids[pos].as_str(), deps.as_slice()));
            }
            graph::kahn_order(&nodes).map_err(|cycle| {
                EngineError::batch_rejected("the batch would introduce a dependency cycle", cycle)
            })?;

            let now = now_ms();
            for (pos, descriptor) in descriptors.iter().enumerate() {
                let subtasks = descriptor
                    .subtasks
                    .iter()
                    .map(|sub_title| Subtask {
                        id: Uuid::now_v7().to_string(),
                        title: sub_title.trim().to_string(),
                        status: Status::Todo,
                        created_at: now,
                        updated_at: now,
                    })
                    .collect();
                let task = Task {
                    id: ids[pos].clone(),
                    title: descriptor.title.trim().to_string(),
                    description: descriptor.description.clone(),
                    priority: descriptor.priority.unwrap_or_default(),
                    status: Status::Todo,
                    subtasks,
                    depends_on: staged_deps[pos].clone(),
                    complexity: None,
                    created_at: now,
                    updated_at: now,
                };
                state.push_task(task);
            }

            let mut touched: Vec<String> = ids.clone();
            for deps in &staged_deps {
                for dep in deps {
                    if !touched.contains(dep) {
                        touched.push(dep.clone());
                    }
                }
            }
            state.refresh_complexity(&touched, self.weights());

            for warning in &warnings {
                warn!(project = %project, detail = %warning, "PRD warning");
            }
            info!(
                project = %project,
                created = ids.len(),
                edges = edges_created,
                "PRD ingested"
            );

            Ok(IngestReport {
                project: project.to_string(),
                created: ids,
                edges_created,
                warnings,
            })
        })
    }
}
