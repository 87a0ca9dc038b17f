//! Integration tests for PRD batch ingestion.
//!
//! A PRD batch is a sequence of task descriptors whose dependencies are
//! expressed as titles. These tests cover title resolution, warning
//! collection, and the all-or-nothing commit rule.

use task_graph_engine::error::{EngineError, ErrorCode};
use task_graph_engine::store::TaskStore;
use task_graph_engine::types::{Priority, Status, TaskDescriptor};

fn setup_store() -> TaskStore {
    TaskStore::with_defaults()
}

/// Helper to build a descriptor with title-based dependencies.
fn descriptor(title: &str, deps: &[&str]) -> TaskDescriptor {
    TaskDescriptor {
        title: title.to_string(),
        description: String::new(),
        priority: None,
        suggested_dependencies: deps.iter().map(|s| s.to_string()).collect(),
        subtasks: Vec::new(),
    }
}

mod resolution_tests {
    use super::*;

    #[test]
    fn batch_of_three_resolves_internal_titles() {
        let store = setup_store();
        let batch = vec![
            descriptor("Design schema", &[]),
            descriptor("Build API", &["Design schema"]),
            descriptor("Write tests", &["Build API"]),
        ];

        let report = store.ingest_prd("alpha", batch).unwrap();

        assert_eq!(report.created.len(), 3);
        assert_eq!(report.edges_created, 2);
        assert!(report.warnings.is_empty());

        let order = store.topological_order("alpha").unwrap();
        let pos = |id: &String| order.iter().position(|x| x == id).unwrap();
        assert!(pos(&report.created[0]) < pos(&report.created[1]));
        assert!(pos(&report.created[1]) < pos(&report.created[2]));
    }

    #[test]
    fn titles_resolve_against_existing_tasks_after_the_batch() {
        let store = setup_store();
        let first = store
            .ingest_prd("alpha", vec![descriptor("Foundation", &[])])
            .unwrap();

        let second = store
            .ingest_prd("alpha", vec![descriptor("Extension", &["Foundation"])])
            .unwrap();

        assert_eq!(second.edges_created, 1);
        let task = store.get_task("alpha", &second.created[0]).unwrap();
        assert_eq!(task.depends_on, vec![first.created[0].clone()]);
    }

    #[test]
    fn batch_occurrence_shadows_existing_task_with_same_title() {
        let store = setup_store();
        store
            .ingest_prd("alpha", vec![descriptor("Shared name", &[])])
            .unwrap();

        let report = store
            .ingest_prd(
                "alpha",
                vec![
                    descriptor("Shared name", &[]),
                    descriptor("Consumer", &["Shared name"]),
                ],
            )
            .unwrap();

        let consumer = store.get_task("alpha", &report.created[1]).unwrap();
        assert_eq!(consumer.depends_on, vec![report.created[0].clone()]);
    }

    #[test]
    fn unresolved_title_warns_and_omits_the_edge() {
        let store = setup_store();
        let batch = vec![descriptor("Lonely", &["No such task"])];

        let report = store.ingest_prd("alpha", batch).unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.edges_created, 0);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("No such task"));

        let task = store.get_task("alpha", &report.created[0]).unwrap();
        assert!(task.depends_on.is_empty());
    }

    #[test]
    fn duplicate_batch_titles_warn_and_resolve_to_first() {
        let store = setup_store();
        let batch = vec![
            descriptor("Twin", &[]),
            descriptor("Twin", &[]),
            descriptor("Watcher", &["Twin"]),
        ];

        let report = store.ingest_prd("alpha", batch).unwrap();

        assert_eq!(report.created.len(), 3);
        assert!(report.warnings.iter().any(|w| w.contains("Twin")));
        let watcher = store.get_task("alpha", &report.created[2]).unwrap();
        assert_eq!(watcher.depends_on, vec![report.created[0].clone()]);
    }

    #[test]
    fn descriptor_fields_carry_through() {
        let store = setup_store();
        let mut rich = descriptor("Rich task", &[]);
        rich.description = "does the hard part".to_string();
        rich.priority = Some(Priority::High);
        rich.subtasks = vec!["first".to_string(), "second".to_string()];

        let report = store.ingest_prd("alpha", vec![rich]).unwrap();

        let task = store.get_task("alpha", &report.created[0]).unwrap();
        assert_eq!(task.description, "does the hard part");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.subtasks.len(), 2);
        assert_eq!(task.status, Status::Todo);
    }
}

mod rejection_tests {
    use super::*;

    #[test]
    fn empty_batch_is_rejected() {
        let store = setup_store();

        let err = store.ingest_prd("alpha", Vec::new()).unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidFieldValue);
        assert!(!store.contains_project("alpha"));
    }

    #[test]
    fn blank_title_rejects_the_whole_batch() {
        let store = setup_store();
        let batch = vec![descriptor("Fine", &[]), descriptor("   ", &[])];

        let err = store.ingest_prd("alpha", batch).unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidFieldValue);
        assert!(!store.contains_project("alpha"));
    }

    #[test]
    fn cyclic_batch_is_rejected_whole() {
        let store = setup_store();
        store.create_project("alpha").unwrap();
        let batch = vec![
            descriptor("A", &["B"]),
            descriptor("B", &["A"]),
            descriptor("C", &[]),
        ];

        let err = store.ingest_prd("alpha", batch).unwrap_err();

        match err {
            EngineError::Ingestion { cycle, .. } => {
                assert!(!cycle.is_empty());
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("Expected ingestion error, got {:?}", other),
        }
        // Nothing from the batch landed, C included.
        assert!(store.list_tasks("alpha", None).unwrap().is_empty());
    }

    #[test]
    fn self_referencing_descriptor_is_rejected() {
        let store = setup_store();

        let err = store
            .ingest_prd("alpha", vec![descriptor("Ouroboros", &["Ouroboros"])])
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::BatchRejected);
        assert!(!store.contains_project("alpha"));
    }

    #[test]
    fn ingested_tasks_join_the_live_cycle_check() {
        let store = setup_store();
        let base = store
            .ingest_prd("alpha", vec![descriptor("Base", &[])])
            .unwrap();
        store
            .ingest_prd("alpha", vec![descriptor("Top", &["Base"])])
            .unwrap();
        let middle = store
            .ingest_prd("alpha", vec![descriptor("Middle", &["Top"])])
            .unwrap();

        // Base -> Middle -> Top -> Base would close the loop.
        let err = store
            .add_dependency("alpha", &base.created[0], &middle.created[0])
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::DependencyCycle);
        assert_eq!(store.list_tasks("alpha", None).unwrap().len(), 3);
    }
}
