//! Status transition rules for tasks and subtasks.
//!
//! The table is fixed: todo → in_progress, in_progress → done,
//! in_progress → todo (reset), done → in_progress (reopen). There is no
//! direct todo → done; starting work leaves a traceable signal. Entering
//! done additionally requires every subtask and every dependency done.

use crate::error::{EngineError, EngineResult};
use crate::store::ProjectState;
use crate::types::{Status, Task};

/// Legal exits from a status.
pub fn exits(from: Status) -> &'static [Status] {
    match from {
        Status::Todo => &[Status::InProgress],
        Status::InProgress => &[Status::Done, Status::Todo],
        Status::Done => &[Status::InProgress],
    }
}

pub fn is_valid_transition(from: Status, to: Status) -> bool {
    exits(from).contains(&to)
}

/// Check the transition table alone. Subtask moves need nothing more.
pub fn ensure_transition(from: Status, to: Status) -> EngineResult<()> {
    if is_valid_transition(from, to) {
        Ok(())
    } else {
        let allowed: Vec<&str> = exits(from).iter().map(|s| s.as_str()).collect();
        Err(EngineError::invalid_transition(
            from.as_str(),
            to.as_str(),
            &allowed,
        ))
    }
}

/// Check a task transition, including the completeness preconditions that
/// gate entry into done. The project view must come from the same lock
/// hold that will apply the change.
pub fn ensure_task_transition(
    project: &ProjectState,
    task: &Task,
    to: Status,
) -> EngineResult<()> {
    ensure_transition(task.status, to)?;
    if to == Status::Done {
        let unfinished = task.unfinished_subtasks();
        if !unfinished.is_empty() {
            return Err(EngineError::subtasks_incomplete(&task.id, &unfinished));
        }
        let blockers = project.unmet_dependencies(task);
        if !blockers.is_empty() {
            return Err(EngineError::deps_not_satisfied(&task.id, &blockers));
        }
    }
    Ok(())
}
