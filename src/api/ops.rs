//! Operation registry: name to handler, dispatched over JSON arguments.

use super::WorkflowApi;
use crate::error::EngineError;
use crate::store::ProjectSnapshot;
use crate::types::{Priority, Status, TaskDescriptor, TaskSpec};
use anyhow::Result;
use serde_json::{Value, json};
use std::collections::HashMap;

type Handler = fn(&WorkflowApi, &Value) -> Result<Value>;

/// Dispatch table built once at construction. Transports map their
/// request envelope onto `dispatch` and render `ErrorBody` on failure.
pub struct OperationRegistry {
    api: WorkflowApi,
    handlers: HashMap<&'static str, Handler>,
}

impl OperationRegistry {
    pub fn new(api: WorkflowApi) -> Self {
        let mut handlers: HashMap<&'static str, Handler> = HashMap::new();
        handlers.insert("create_project", op_create_project);
        handlers.insert("add_task", op_add_task);
        handlers.insert("add_subtask", op_add_subtask);
        handlers.insert("add_dependency", op_add_dependency);
        handlers.insert("update_status", op_update_status);
        handlers.insert("get_next_task", op_get_next_task);
        handlers.insert("get_task", op_get_task);
        handlers.insert("list_tasks", op_list_tasks);
        handlers.insert("get_dependencies", op_get_dependencies);
        handlers.insert("ingest_prd", op_ingest_prd);
        handlers.insert("estimate_complexity", op_estimate_complexity);
        handlers.insert("export_project", op_export_project);
        handlers.insert("import_project", op_import_project);
        Self { api, handlers }
    }

    /// Registered operation names, sorted.
    pub fn operation_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Call an operation by name.
    pub fn dispatch(&self, name: &str, args: &Value) -> Result<Value> {
        match self.handlers.get(name) {
            Some(handler) => handler(&self.api, args),
            None => Err(EngineError::unknown_operation(name).into()),
        }
    }
}

fn op_create_project(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    api.create_project(project)?;
    Ok(json!({ "success": true, "project": project }))
}

fn op_add_task(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let spec = TaskSpec {
        title: require_str(args, "title")?.to_string(),
        description: optional_str(args, "description")?
            .unwrap_or_default()
            .to_string(),
        priority: parse_priority(args)?,
        depends_on: optional_string_array(args, "depends_on")?,
        subtasks: optional_string_array(args, "subtasks")?,
    };
    let task = api.add_task(project, spec)?;
    Ok(serde_json::to_value(task)?)
}

fn op_add_subtask(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let task_id = require_str(args, "task_id")?;
    let title = require_str(args, "title")?;
    let subtask = api.add_subtask(project, task_id, title)?;
    Ok(serde_json::to_value(subtask)?)
}

fn op_add_dependency(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let from = require_str(args, "from")?;
    let to = require_str(args, "to")?;
    api.add_dependency(project, from, to)?;
    Ok(json!({ "success": true, "from": from, "to": to }))
}

fn op_update_status(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let task_id = require_str(args, "task_id")?;
    let status = parse_status(args)?;
    match optional_str(args, "subtask_id")? {
        Some(subtask_id) => {
            let subtask = api.set_subtask_status(project, task_id, subtask_id, status)?;
            Ok(serde_json::to_value(subtask)?)
        }
        None => {
            let task = api.set_task_status(project, task_id, status)?;
            Ok(serde_json::to_value(task)?)
        }
    }
}

fn op_get_next_task(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let task = api.next_task(project)?;
    Ok(json!({ "task": task }))
}

fn op_get_task(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let task_id = require_str(args, "task_id")?;
    let task = api.get_task(project, task_id)?;
    Ok(serde_json::to_value(task)?)
}

fn op_list_tasks(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let filter = match optional_str(args, "status")? {
        Some(raw) => Some(Status::from_str(raw).ok_or_else(|| {
            anyhow::Error::from(EngineError::invalid_value(
                "status",
                format!("unknown status '{}'", raw),
            ))
        })?),
        None => None,
    };
    let tasks = api.list_tasks(project, filter)?;
    Ok(json!({ "count": tasks.len(), "tasks": tasks }))
}

fn op_get_dependencies(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let task_id = require_str(args, "task_id")?;
    let info = api.dependency_info(project, task_id)?;
    Ok(serde_json::to_value(info)?)
}

fn op_ingest_prd(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let raw = match args.get("tasks") {
        Some(value) => value.clone(),
        None => return Err(EngineError::missing_field("tasks").into()),
    };
    let descriptors: Vec<TaskDescriptor> = serde_json::from_value(raw)
        .map_err(|e| EngineError::invalid_value("tasks", e.to_string()))?;
    let report = api.ingest_prd(project, descriptors)?;
    Ok(serde_json::to_value(report)?)
}

fn op_estimate_complexity(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let task_id = require_str(args, "task_id")?;
    let report = api.estimate_complexity(project, task_id)?;
    Ok(serde_json::to_value(report)?)
}

fn op_export_project(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let project = require_str(args, "project")?;
    let snapshot = api.export_project(project)?;
    Ok(serde_json::to_value(snapshot)?)
}

fn op_import_project(api: &WorkflowApi, args: &Value) -> Result<Value> {
    let raw = match args.get("snapshot") {
        Some(value) => value.clone(),
        None => return Err(EngineError::missing_field("snapshot").into()),
    };
    let snapshot: ProjectSnapshot = serde_json::from_value(raw)
        .map_err(|e| EngineError::invalid_value("snapshot", e.to_string()))?;
    let tasks = snapshot.tasks.len();
    let project = api.import_project(snapshot)?;
    Ok(json!({ "success": true, "project": project, "tasks": tasks }))
}

/// Helper to get a required string from arguments.
fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Null) | None => Err(EngineError::missing_field(key).into()),
        Some(_) => Err(EngineError::invalid_value(key, format!("{} must be a string", key)).into()),
    }
}

/// Helper to get an optional string from arguments.
fn optional_str<'a>(args: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(EngineError::invalid_value(key, format!("{} must be a string", key)).into()),
    }
}

/// Helper to get a string array from arguments; absent means empty.
fn optional_string_array(args: &Value, key: &str) -> Result<Vec<String>> {
    match args.get(key) {
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => out.push(s.to_string()),
                    None => {
                        return Err(EngineError::invalid_value(
                            key,
                            format!("{} must be an array of strings", key),
                        )
                        .into());
                    }
                }
            }
            Ok(out)
        }
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(EngineError::invalid_value(
            key,
            format!("{} must be an array of strings", key),
        )
        .into()),
    }
}

fn parse_priority(args: &Value) -> Result<Option<Priority>> {
    match optional_str(args, "priority")? {
        Some(raw) => match Priority::from_str(raw) {
            Some(priority) => Ok(Some(priority)),
            None => Err(EngineError::invalid_value(
                "priority",
                format!("unknown priority '{}'", raw),
            )
            .into()),
        },
        None => Ok(None),
    }
}

fn parse_status(args: &Value) -> Result<Status> {
    let raw = require_str(args, "status")?;
    match Status::from_str(raw) {
        Some(status) => Ok(status),
        None => {
            Err(EngineError::invalid_value("status", format!("unknown status '{}'", raw)).into())
        }
    }
}
