//! Output formatting utilities for markdown and JSON.

use crate::types::{Priority, Status, Task};

/// Output format for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

/// Format a single task as markdown.
pub fn format_task_markdown(task: &Task, blocked_by: &[String]) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Task: {}\n", task.title));
    md.push_str(&format!("- **id**: `{}`\n", task.id));
    md.push_str(&format!("- **status**: {}\n", task.status.as_str()));
    md.push_str(&format!("- **priority**: {}\n", task.priority.as_str()));

    if let Some(complexity) = task.complexity {
        md.push_str(&format!("- **complexity**: {}\n", complexity.as_str()));
    }

    if !task.depends_on.is_empty() {
        let deps: Vec<String> = task.depends_on.iter().map(|id| format!("`{}`", id)).collect();
        md.push_str(&format!("- **depends_on**: {}\n", deps.join(", ")));
    }

    if !blocked_by.is_empty() {
        let blockers: Vec<String> = blocked_by.iter().map(|id| format!("`{}`", id)).collect();
        md.push_str(&format!("- **blocked_by**: {}\n", blockers.join(", ")));
    }

    if !task.subtasks.is_empty() {
        md.push_str("\n### Subtasks\n");
        for subtask in &task.subtasks {
            let mark = if subtask.status == Status::Done { "x" } else { " " };
            md.push_str(&format!("- [{}] {}\n", mark, subtask.title));
        }
    }

    if !task.description.is_empty() {
        md.push_str("\n### Description\n");
        md.push_str(&task.description);
        md.push('\n');
    }

    md
}

/// Format a project's tasks as a markdown board, grouped by status.
/// In-progress work comes first, then the todo backlog, then done.
pub fn format_board_markdown(project: &str, rows: &[(&Task, Vec<String>)]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {} ({} tasks)\n\n", project, rows.len()));

    for status in [Status::InProgress, Status::Todo, Status::Done] {
        let group: Vec<&(&Task, Vec<String>)> =
            rows.iter().filter(|(task, _)| task.status == status).collect();
        if group.is_empty() {
            continue;
        }
        md.push_str(&format!("## {}\n\n", format_state_name(status.as_str())));
        for (task, blocked_by) in group {
            md.push_str(&format_task_short(task, blocked_by));
        }
        md.push('\n');
    }

    md
}

/// Numbered dependency-order listing, one task per line. Ids are printed
/// whole so they stay usable as external references.
pub fn format_order_listing(tasks: &[Task]) -> String {
    let mut md = String::new();
    for (pos, task) in tasks.iter().enumerate() {
        md.push_str(&format!("{}. {} ({})\n", pos + 1, task.title, task.id));
    }
    md
}

/// Format a state name for display (capitalize, replace underscores with spaces).
fn format_state_name(state: &str) -> String {
    state
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a task in short form for lists.
fn format_task_short(task: &Task, blocked_by: &[String]) -> String {
    let priority_marker = match task.priority {
        Priority::High => "!!! ",
        Priority::Medium => "",
        Priority::Low => "",
    };

    // Imported ids are arbitrary strings, so truncate by chars, not bytes.
    let short_id: String = task.id.chars().take(8).collect();

    let blocked = if blocked_by.is_empty() {
        String::new()
    } else {
        format!(" [blocked by {}]", blocked_by.len())
    };

    let subtasks = if task.subtasks.is_empty() {
        String::new()
    } else {
        let done = task
            .subtasks
            .iter()
            .filter(|s| s.status == Status::Done)
            .count();
        format!(" ({}/{} subtasks)", done, task.subtasks.len())
    };

    format!(
        "- {}{} `{}`{}{}\n",
        priority_marker, task.title, short_id, blocked, subtasks,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Subtask;

    fn task(id: &str, title: &str, status: Status, priority: Priority) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            priority,
            status,
            subtasks: Vec::new(),
            depends_on: Vec::new(),
            complexity: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn board_groups_by_status_in_progress_first() {
        let todo = task("t-todo-01", "Write docs", Status::Todo, Priority::Low);
        let doing = task("t-doing-1", "Build core", Status::InProgress, Priority::High);
        let rows = vec![(&doing, vec!["t-todo-01".to_string()]), (&todo, vec![])];
        let md = format_board_markdown("demo", &rows);

        let in_progress = md.find("## In Progress").unwrap();
        let backlog = md.find("## Todo").unwrap();
        assert!(in_progress < backlog);
        assert!(md.contains("- !!! Build core `t-doing-`"));
        assert!(md.contains("[blocked by 1]"));
        assert!(!md.contains("## Done"));
    }

    #[test]
    fn order_listing_numbers_tasks_in_sequence() {
        let first = task("id-design", "Design", Status::Done, Priority::Medium);
        let second = task("id-build", "Build", Status::Todo, Priority::Medium);
        let md = format_order_listing(&[first, second]);
        assert_eq!(md, "1. Design (id-design)\n2. Build (id-build)\n");
    }

    #[test]
    fn board_truncates_multibyte_ids_on_char_boundaries() {
        // Imported snapshots may carry ids where byte 8 falls inside a
        // character; truncation must count chars.
        let t = task("タスク-000199", "Localize", Status::Todo, Priority::Medium);
        let md = format_board_markdown("demo", &[(&t, vec![])]);
        assert!(md.contains("- Localize `タスク-0001`"));
    }

    #[test]
    fn task_detail_renders_subtask_checklist() {
        let mut t = task("t1", "Ship it", Status::InProgress, Priority::Medium);
        t.subtasks.push(Subtask {
            id: "s1".to_string(),
            title: "step one".to_string(),
            status: Status::Done,
            created_at: 0,
            updated_at: 0,
        });
        t.subtasks.push(Subtask {
            id: "s2".to_string(),
            title: "step two".to_string(),
            status: Status::Todo,
            created_at: 0,
            updated_at: 0,
        });
        let md = format_task_markdown(&t, &[]);
        assert!(md.contains("- [x] step one"));
        assert!(md.contains("- [ ] step two"));
    }
}
