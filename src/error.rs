//! Structured error types for engine operations.

use serde::Serialize;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidFieldValue,

    // Not found errors
    ProjectNotFound,
    TaskNotFound,
    SubtaskNotFound,
    UnknownOperation,

    // Cycle errors
    DependencyCycle,

    // Conflict errors
    InvalidTransition,
    SubtasksIncomplete,
    DependencyNotSatisfied,
    AlreadyExists,

    // Ingestion errors
    BatchRejected,

    // Boundary fallback, never produced by engine operations
    Internal,
}

/// Engine error taxonomy. Every operation fails with exactly one of these;
/// no error path leaves partially applied state behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Malformed input: empty title, unknown priority or status value,
    /// missing or ill-typed argument.
    #[error("{message}")]
    Validation {
        code: ErrorCode,
        message: String,
        field: Option<String>,
    },

    /// Referenced project, task, subtask, or operation does not exist.
    #[error("{message}")]
    NotFound { code: ErrorCode, message: String },

    /// A proposed dependency edge would create a cycle. `path` lists the
    /// task ids along the offending cycle, ending where it started.
    #[error("{message}")]
    Cycle { message: String, path: Vec<String> },

    /// Illegal status transition or unmet completeness precondition.
    #[error("{message}")]
    Conflict {
        code: ErrorCode,
        message: String,
        details: Option<String>,
    },

    /// PRD batch validation failed; the whole batch was rejected.
    #[error("{message}")]
    Ingestion { message: String, cycle: Vec<String> },
}

/// Serialized error shape handed to the transport layer.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cycle: Vec<String>,
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. }
            | Self::NotFound { code, .. }
            | Self::Conflict { code, .. } => *code,
            Self::Cycle { .. } => ErrorCode::DependencyCycle,
            Self::Ingestion { .. } => ErrorCode::BatchRejected,
        }
    }

    /// Build the transport-facing body for this error.
    pub fn body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
            field: None,
            details: None,
            cycle: Vec::new(),
        };
        match self {
            Self::Validation { field, .. } => body.field = field.clone(),
            Self::Conflict { details, .. } => body.details = details.clone(),
            Self::Cycle { path, .. } => body.cycle = path.clone(),
            Self::Ingestion { cycle, .. } => body.cycle = cycle.clone(),
            Self::NotFound { .. } => {}
        }
        body
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::Validation {
            code: ErrorCode::MissingRequiredField,
            message: format!("{} is required", field),
            field: Some(field.to_string()),
        }
    }

    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::InvalidFieldValue,
            message: reason.into(),
            field: Some(field.to_string()),
        }
    }

    pub fn project_not_found(name: &str) -> Self {
        Self::NotFound {
            code: ErrorCode::ProjectNotFound,
            message: format!("Project not found: {}", name),
        }
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::NotFound {
            code: ErrorCode::TaskNotFound,
            message: format!("Task not found: {}", task_id),
        }
    }

    pub fn subtask_not_found(subtask_id: &str) -> Self {
        Self::NotFound {
            code: ErrorCode::SubtaskNotFound,
            message: format!("Subtask not found: {}", subtask_id),
        }
    }

    pub fn unknown_operation(name: &str) -> Self {
        Self::NotFound {
            code: ErrorCode::UnknownOperation,
            message: format!("Unknown operation: {}", name),
        }
    }

    pub fn dependency_cycle(from: &str, to: &str, path: Vec<String>) -> Self {
        Self::Cycle {
            message: format!(
                "Adding dependency {} -> {} would create a cycle",
                from, to
            ),
            path,
        }
    }

    pub fn cycle_detected(path: Vec<String>) -> Self {
        Self::Cycle {
            message: format!("Dependency cycle detected: {}", path.join(" -> ")),
            path,
        }
    }

    pub fn invalid_transition(from: &str, to: &str, exits: &[&str]) -> Self {
        Self::Conflict {
            code: ErrorCode::InvalidTransition,
            message: format!(
                "Invalid transition from '{}' to '{}'. Allowed transitions: {:?}",
                from, to, exits
            ),
            details: None,
        }
    }

    pub fn subtasks_incomplete(task_id: &str, remaining: &[String]) -> Self {
        Self::Conflict {
            code: ErrorCode::SubtasksIncomplete,
            message: format!(
                "Task {} has {} unfinished subtask(s)",
                task_id,
                remaining.len()
            ),
            details: Some(remaining.join(", ")),
        }
    }

    pub fn deps_not_satisfied(task_id: &str, blockers: &[String]) -> Self {
        Self::Conflict {
            code: ErrorCode::DependencyNotSatisfied,
            message: format!("Task {} blocked by: {}", task_id, blockers.join(", ")),
            details: None,
        }
    }

    pub fn project_exists(name: &str) -> Self {
        Self::Conflict {
            code: ErrorCode::AlreadyExists,
            message: format!("Project already exists: {}", name),
            details: None,
        }
    }

    pub fn batch_rejected(reason: impl Into<String>, cycle: Vec<String>) -> Self {
        Self::Ingestion {
            message: format!("PRD batch rejected: {}", reason.into()),
            cycle,
        }
    }
}

/// Build an error body from a boundary error, recovering the structured
/// engine error when one is wrapped inside.
pub fn error_body(err: &anyhow::Error) -> ErrorBody {
    match err.downcast_ref::<EngineError>() {
        Some(engine_err) => engine_err.body(),
        None => ErrorBody {
            code: ErrorCode::Internal,
            message: err.to_string(),
            field: None,
            details: None,
            cycle: Vec::new(),
        },
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
