//! Core types for the task graph engine.

use serde::{Deserialize, Serialize};

/// Task priority. Ordering for next-task selection is high > medium > low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    /// Selection rank, lower is more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// Task or subtask status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Status::Todo),
            "in_progress" => Some(Status::InProgress),
            "done" => Some(Status::Done),
            _ => None,
        }
    }
}

/// Complexity category derived from task structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }
}

/// A unit of work scoped to one task. Carries no dependency edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A task in the project graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub subtasks: Vec<Subtask>,
    /// Ids of tasks this task depends on, in the same project.
    pub depends_on: Vec<String>,
    /// Cached complexity category, refreshed by structural mutations.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub complexity: Option<Complexity>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// Subtasks not yet done, by id.
    pub fn unfinished_subtasks(&self) -> Vec<String> {
        self.subtasks
            .iter()
            .filter(|s| s.status != Status::Done)
            .map(|s| s.id.clone())
            .collect()
    }
}

/// Input for creating a single task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<Priority>,
    /// Ids of existing tasks the new task depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Titles of subtasks created with the task.
    #[serde(default)]
    pub subtasks: Vec<String>,
}

/// One structured task descriptor from an externally parsed PRD.
/// Dependencies are suggested by title, resolved at ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub suggested_dependencies: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<String>,
}

/// Compact task representation for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub status: Status,
    /// Derived at query time: true when any dependency is not done.
    pub blocked: bool,
    pub complexity: Option<Complexity>,
    pub subtasks_done: usize,
    pub subtasks_total: usize,
}

/// A task reference with enough context to act on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: String,
    pub title: String,
    pub status: Status,
}

/// Both directions of a task's dependency relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyInfo {
    pub task_id: String,
    /// Tasks this task depends on.
    pub depends_on: Vec<TaskRef>,
    /// Tasks depending on this task.
    pub dependents: Vec<TaskRef>,
}

/// Outcome of a committed PRD batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub project: String,
    /// Ids of created tasks, in batch order.
    pub created: Vec<String>,
    /// Number of dependency edges resolved and committed.
    pub edges_created: usize,
    /// Unresolved or ambiguous dependency titles, one message each.
    pub warnings: Vec<String>,
}

/// Breakdown returned by complexity estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityReport {
    pub task_id: String,
    pub subtask_count: usize,
    /// Number of tasks depending on this one.
    pub fan_out: usize,
    /// Number of this task's own dependencies.
    pub fan_in: usize,
    pub description_bucket: u32,
    pub score: u32,
    pub complexity: Complexity,
    pub estimated_hours: u32,
}
