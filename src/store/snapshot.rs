//! Persisted project layout: one JSON document per project.
//!
//! The envelope carries no volatile metadata, so loading a document and
//! saving it again reproduces it structurally unchanged. Import validates
//! every record invariant before the project becomes visible in the
//! store; a corrupt document can never install an inconsistent state.

use super::{ProjectState, TaskStore};
use crate::error::{EngineError, EngineResult};
use crate::graph;
use crate::types::Task;
use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Schema version of the persisted project document.
pub const SCHEMA_VERSION: i32 = 1;

/// One persisted project: name plus tasks in insertion order, each with
/// its ordered subtasks and dependency-id array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub schema_version: i32,
    pub project: String,
    pub tasks: Vec<Task>,
}

impl ProjectSnapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a snapshot from a file (plain JSON or gzip).
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use std::fs::File;
        use std::io::{BufReader, Read};

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        // Check for gzip magic bytes
        let mut magic = [0u8; 2];
        reader.read_exact(&mut magic)?;

        // Reset to start
        drop(reader);
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        if magic == [0x1f, 0x8b] {
            let decoder = flate2::read::GzDecoder::new(reader);
            let snapshot: ProjectSnapshot = serde_json::from_reader(decoder)?;
            Ok(snapshot)
        } else {
            let snapshot: ProjectSnapshot = serde_json::from_reader(reader)?;
            Ok(snapshot)
        }
    }

    /// Serialize to JSON with pretty formatting.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to a file, gzip-compressed when the path ends in `.gz`.
    pub fn write_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json_pretty()?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            let file = std::fs::File::create(path)?;
            let mut encoder =
                flate2::write::GzEncoder::new(file, flate2::Compression::default());
            encoder.write_all(json.as_bytes())?;
            encoder.finish()?;
        } else {
            std::fs::write(path, json)?;
        }
        Ok(())
    }
}

/// Canonical file name for a project's snapshot.
pub fn default_file_name(project: &str) -> String {
    format!("{}.json", project.to_snake_case())
}

impl TaskStore {
    /// Snapshot one project's canonical records.
    pub fn export_project(&self, project: &str) -> EngineResult<ProjectSnapshot> {
        self.with_project(project, |state| {
            Ok(ProjectSnapshot {
                schema_version: SCHEMA_VERSION,
                project: state.name().to_string(),
                tasks: state.tasks().to_vec(),
            })
        })
    }

    /// Validate a snapshot and install it as a new project. Fails with a
    /// conflict when the project name is already registered.
    pub fn import_project(&self, snapshot: ProjectSnapshot) -> EngineResult<String> {
        if snapshot.schema_version != SCHEMA_VERSION {
            return Err(EngineError::invalid_value(
                "schema_version",
                format!(
                    "unsupported schema version {} (expected {})",
                    snapshot.schema_version, SCHEMA_VERSION
                ),
            ));
        }
        if snapshot.project.trim().is_empty() {
            return Err(EngineError::invalid_value(
                "project",
                "project name must not be empty",
            ));
        }

        let mut ids: HashSet<&str> = HashSet::with_capacity(snapshot.tasks.len());
        for task in &snapshot.tasks {
            if task.title.trim().is_empty() {
                return Err(EngineError::invalid_value(
                    "title",
                    format!("task {} has an empty title", task.id),
                ));
            }
            if !ids.insert(task.id.as_str()) {
                return Err(EngineError::invalid_value(
                    "tasks",
                    format!("duplicate task id: {}", task.id),
                ));
            }
            let mut subtask_ids: HashSet<&str> = HashSet::with_capacity(task.subtasks.len());
            for subtask in &task.subtasks {
                if !subtask_ids.insert(subtask.id.as_str()) {
                    return Err(EngineError::invalid_value(
                        "subtasks",
                        format!("duplicate subtask id {} in task {}", subtask.id, task.id),
                    ));
                }
            }
        }
        for task in &snapshot.tasks {
            let mut seen: HashSet<&str> = HashSet::with_capacity(task.depends_on.len());
            for dep in &task.depends_on {
                if !ids.contains(dep.as_str()) {
                    return Err(EngineError::invalid_value(
                        "depends_on",
                        format!(
                            "task {} depends on unknown task id: {}",
                            task.id, dep
                        ),
                    ));
                }
                if !seen.insert(dep.as_str()) {
                    return Err(EngineError::invalid_value(
                        "depends_on",
                        format!("task {} lists dependency {} twice", task.id, dep),
                    ));
                }
            }
        }

        let nodes: Vec<(&str, &[String])> = snapshot
            .tasks
            .iter()
            .map(|t| (t.id.as_str(), t.depends_on.as_slice()))
            .collect();
        graph::kahn_order(&nodes).map_err(EngineError::cycle_detected)?;

        let name = snapshot.project.clone();
        let mut state = ProjectState::new(&name);
        for task in snapshot.tasks {
            state.push_task(task);
        }
        self.install_project(state)?;

        info!(project = %name, "Project imported");
        Ok(name)
    }
}
