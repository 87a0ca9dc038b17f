//! Dependency graph operations and cycle detection.

use crate::error::{EngineError, EngineResult};
use crate::store::ProjectState;
use crate::types::Task;
use std::collections::{HashMap, HashSet, VecDeque};

/// Read-only graph view over one project's tasks and edges. Holds no
/// state of its own; it borrows whatever lock hold produced the project
/// reference.
pub struct DependencyGraph<'a> {
    project: &'a ProjectState,
}

impl<'a> DependencyGraph<'a> {
    pub fn new(project: &'a ProjectState) -> Self {
        Self { project }
    }

    /// Check a proposed edge `from` depends_on `to`. Fails when `to` can
    /// already reach `from` along existing edges; the error carries the
    /// full cycle path the insertion would close.
    pub fn check_edge(&self, from: &str, to: &str) -> EngineResult<()> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut parent: HashMap<&str, &str> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(to);

        while let Some(current) = queue.pop_front() {
            if current == from {
                return Err(EngineError::dependency_cycle(
                    from,
                    to,
                    self.cycle_path(from, to, &parent),
                ));
            }
            if !visited.insert(current) {
                continue;
            }
            let Some(task) = self.project.task(current) else {
                continue;
            };
            for dep in &task.depends_on {
                if !visited.contains(dep.as_str()) {
                    parent.entry(dep.as_str()).or_insert(current);
                    queue.push_back(dep);
                }
            }
        }

        Ok(())
    }

    /// Rebuild the path closed by the proposed edge: from, to, ..., from.
    fn cycle_path(&self, from: &str, to: &str, parent: &HashMap<&str, &str>) -> Vec<String> {
        let mut chain = vec![from];
        let mut node = from;
        while node != to {
            match parent.get(node) {
                Some(&prev) => {
                    chain.push(prev);
                    node = prev;
                }
                None => break,
            }
        }
        chain.reverse();
        let mut path = Vec::with_capacity(chain.len() + 1);
        path.push(from.to_string());
        path.extend(chain.into_iter().map(String::from));
        path
    }

    /// Kahn's algorithm over the project's tasks. Dependencies come before
    /// their dependents; ties resolve by insertion order. A residue after
    /// processing means a cycle, unreachable as long as every edge insert
    /// went through `check_edge`.
    pub fn topological_order(&self) -> EngineResult<Vec<String>> {
        let nodes: Vec<(&str, &[String])> = self
            .project
            .tasks()
            .iter()
            .map(|t| (t.id.as_str(), t.depends_on.as_slice()))
            .collect();
        kahn_order(&nodes).map_err(EngineError::cycle_detected)
    }

    /// The todo task with every dependency done, highest priority first,
    /// insertion order breaking ties. None is the "nothing actionable"
    /// signal, not an error.
    pub fn next_actionable(&self) -> Option<&'a Task> {
        let mut best: Option<&'a Task> = None;
        for task in self.project.tasks() {
            if !self.project.is_actionable(task) {
                continue;
            }
            match best {
                None => best = Some(task),
                Some(current) if task.priority.rank() < current.priority.rank() => {
                    best = Some(task);
                }
                _ => {}
            }
        }
        best
    }
}

/// Kahn's algorithm over (id, dependency ids) pairs in insertion order.
/// Returns the order, or the concrete cycle path among the leftover nodes.
///
/// Shared by the live graph view and by ingestion, which validates the
/// union of existing and staged tasks before anything is committed.
pub(crate) fn kahn_order(nodes: &[(&str, &[String])]) -> Result<Vec<String>, Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for &(id, deps) in nodes {
        in_degree.insert(id, deps.len());
        for dep in deps {
            dependents.entry(dep.as_str()).or_default().push(id);
        }
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .filter(|(_, deps)| deps.is_empty())
        .map(|(id, _)| *id)
        .collect();
    let mut order: Vec<String> = Vec::with_capacity(nodes.len());

    while let Some(current) = queue.pop_front() {
        order.push(current.to_string());
        if let Some(children) = dependents.get(current) {
            for &child in children {
                if let Some(remaining) = in_degree.get_mut(child) {
                    *remaining -= 1;
                    if *remaining == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }
    }

    if order.len() == nodes.len() {
        Ok(order)
    } else {
        Err(trace_cycle(nodes, &in_degree))
    }
}

/// Walk depends_on edges among the stuck nodes until one repeats, giving
/// one concrete cycle for diagnostics.
fn trace_cycle(nodes: &[(&str, &[String])], in_degree: &HashMap<&str, usize>) -> Vec<String> {
    let stuck: HashSet<&str> = nodes
        .iter()
        .filter(|(id, _)| in_degree.get(id).copied().unwrap_or(0) > 0)
        .map(|(id, _)| *id)
        .collect();
    let deps_of: HashMap<&str, &[String]> = nodes.iter().map(|(id, deps)| (*id, *deps)).collect();

    let Some(start) = nodes
        .iter()
        .map(|(id, _)| *id)
        .find(|id| stuck.contains(id))
    else {
        return Vec::new();
    };

    let mut walk: Vec<&str> = vec![start];
    let mut seen: HashMap<&str, usize> = HashMap::from([(start, 0)]);
    loop {
        let current = walk[walk.len() - 1];
        let next = deps_of
            .get(current)
            .and_then(|deps| deps.iter().find(|d| stuck.contains(d.as_str())));
        let Some(next) = next else {
            // Every stuck node keeps a stuck dependency; bail if not.
            return walk.into_iter().map(String::from).collect();
        };
        if let Some(&pos) = seen.get(next.as_str()) {
            let mut cycle: Vec<String> = walk[pos..].iter().map(|s| s.to_string()).collect();
            cycle.push(next.clone());
            return cycle;
        }
        seen.insert(next.as_str(), walk.len());
        walk.push(next.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, Status};

    fn task(id: &str, priority: Priority, status: Status, deps: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: String::new(),
            priority,
            status,
            subtasks: Vec::new(),
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
            complexity: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn project(tasks: Vec<Task>) -> ProjectState {
        let mut project = ProjectState::new("p");
        for t in tasks {
            project.push_task(t);
        }
        project
    }

    #[test]
    fn check_edge_accepts_forward_edge() {
        let p = project(vec![
            task("a", Priority::Medium, Status::Todo, &[]),
            task("b", Priority::Medium, Status::Todo, &["a"]),
        ]);
        assert!(DependencyGraph::new(&p).check_edge("a", "c_unknown").is_ok());
        assert!(DependencyGraph::new(&p).check_edge("b", "a").is_ok());
    }

    #[test]
    fn check_edge_reports_cycle_path() {
        // b -> a exists; proposing a -> b closes a two-cycle
        let p = project(vec![
            task("a", Priority::Medium, Status::Todo, &[]),
            task("b", Priority::Medium, Status::Todo, &["a"]),
        ]);
        let err = DependencyGraph::new(&p).check_edge("a", "b").unwrap_err();
        match err {
            EngineError::Cycle { path, .. } => {
                assert_eq!(path, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn check_edge_rejects_self_dependency() {
        let p = project(vec![task("a", Priority::Medium, Status::Todo, &[])]);
        let err = DependencyGraph::new(&p).check_edge("a", "a").unwrap_err();
        assert!(matches!(err, EngineError::Cycle { .. }));
    }

    #[test]
    fn check_edge_finds_long_cycles() {
        // c -> b -> a; proposing a -> c closes a three-cycle
        let p = project(vec![
            task("a", Priority::Medium, Status::Todo, &[]),
            task("b", Priority::Medium, Status::Todo, &["a"]),
            task("c", Priority::Medium, Status::Todo, &["b"]),
        ]);
        let err = DependencyGraph::new(&p).check_edge("a", "c").unwrap_err();
        match err {
            EngineError::Cycle { path, .. } => {
                assert_eq!(path, vec!["a", "c", "b", "a"]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn topological_order_puts_dependencies_first() {
        let p = project(vec![
            task("build", Priority::Medium, Status::Todo, &["design"]),
            task("design", Priority::Medium, Status::Todo, &[]),
            task("test", Priority::Medium, Status::Todo, &["build"]),
        ]);
        let order = DependencyGraph::new(&p).topological_order().unwrap();
        assert_eq!(order, vec!["design", "build", "test"]);
    }

    #[test]
    fn kahn_reports_concrete_cycle() {
        let deps_a = vec!["c".to_string()];
        let deps_b = vec!["a".to_string()];
        let deps_c = vec!["b".to_string()];
        let nodes: Vec<(&str, &[String])> = vec![
            ("a", deps_a.as_slice()),
            ("b", deps_b.as_slice()),
            ("c", deps_c.as_slice()),
        ];
        let cycle = kahn_order(&nodes).unwrap_err();
        assert_eq!(cycle.len(), 4);
        assert_eq!(cycle.first(), cycle.last());
    }

    #[test]
    fn next_actionable_prefers_priority_then_insertion() {
        let p = project(vec![
            task("first_medium", Priority::Medium, Status::Todo, &[]),
            task("second_medium", Priority::Medium, Status::Todo, &[]),
            task("late_high", Priority::High, Status::Todo, &[]),
        ]);
        let next = DependencyGraph::new(&p).next_actionable().unwrap();
        assert_eq!(next.id, "late_high");

        let p = project(vec![
            task("first_medium", Priority::Medium, Status::Todo, &[]),
            task("second_medium", Priority::Medium, Status::Todo, &[]),
        ]);
        let next = DependencyGraph::new(&p).next_actionable().unwrap();
        assert_eq!(next.id, "first_medium");
    }

    #[test]
    fn next_actionable_skips_blocked_and_started() {
        let p = project(vec![
            task("a", Priority::Low, Status::InProgress, &[]),
            task("b", Priority::High, Status::Todo, &["a"]),
            task("c", Priority::Low, Status::Todo, &[]),
        ]);
        // b has the highest priority but its dependency is not done
        let next = DependencyGraph::new(&p).next_actionable().unwrap();
        assert_eq!(next.id, "c");
    }

    #[test]
    fn next_actionable_none_when_everything_blocked() {
        let p = project(vec![
            task("a", Priority::Medium, Status::Done, &[]),
            task("b", Priority::Medium, Status::InProgress, &[]),
            task("c", Priority::Medium, Status::Todo, &["b"]),
        ]);
        assert!(DependencyGraph::new(&p).next_actionable().is_none());
    }
}
