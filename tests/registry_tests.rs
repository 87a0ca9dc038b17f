//! Integration tests for the JSON operation registry.
//!
//! Transports drive the engine through `dispatch(name, args)`; these
//! tests cover argument validation, routing, and the error body a
//! transport would render.

use serde_json::{Value, json};
use std::sync::Arc;
use task_graph_engine::api::{OperationRegistry, WorkflowApi};
use task_graph_engine::error::{ErrorCode, error_body};
use task_graph_engine::store::TaskStore;

/// Registry plus a handle on its store for post-dispatch inspection.
fn setup() -> (Arc<TaskStore>, OperationRegistry) {
    let store = Arc::new(TaskStore::with_defaults());
    let registry = OperationRegistry::new(WorkflowApi::new(Arc::clone(&store)));
    (store, registry)
}

fn dispatch_ok(registry: &OperationRegistry, name: &str, args: Value) -> Value {
    registry
        .dispatch(name, &args)
        .unwrap_or_else(|e| panic!("{} failed: {}", name, e))
}

mod dispatch_tests {
    use super::*;

    #[test]
    fn create_then_add_task_round_trip() {
        let (_store, registry) = setup();

        let created = dispatch_ok(&registry, "create_project", json!({ "project": "alpha" }));
        assert_eq!(created["success"], json!(true));

        let task = dispatch_ok(
            &registry,
            "add_task",
            json!({
                "project": "alpha",
                "title": "First task",
                "priority": "high",
                "subtasks": ["draft"]
            }),
        );
        assert_eq!(task["title"], json!("First task"));
        assert_eq!(task["priority"], json!("high"));
        assert_eq!(task["status"], json!("todo"));
        assert_eq!(task["subtasks"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn update_status_routes_to_task_or_subtask() {
        let (store, registry) = setup();
        let task = dispatch_ok(
            &registry,
            "add_task",
            json!({ "project": "alpha", "title": "Parent", "subtasks": ["step"] }),
        );
        let task_id = task["id"].as_str().unwrap();
        let subtask_id = task["subtasks"][0]["id"].as_str().unwrap();

        let updated = dispatch_ok(
            &registry,
            "update_status",
            json!({
                "project": "alpha",
                "task_id": task_id,
                "subtask_id": subtask_id,
                "status": "in_progress"
            }),
        );
        assert_eq!(updated["status"], json!("in_progress"));

        // Only the subtask moved.
        let parent = store.get_task("alpha", task_id).unwrap();
        assert_eq!(parent.status.as_str(), "todo");
    }

    #[test]
    fn get_next_task_returns_null_when_nothing_is_ready() {
        let (_store, registry) = setup();
        dispatch_ok(&registry, "create_project", json!({ "project": "alpha" }));

        let result = dispatch_ok(&registry, "get_next_task", json!({ "project": "alpha" }));

        assert!(result["task"].is_null());
    }

    #[test]
    fn ingest_prd_reports_created_tasks_and_edges() {
        let (_store, registry) = setup();

        let report = dispatch_ok(
            &registry,
            "ingest_prd",
            json!({
                "project": "alpha",
                "tasks": [
                    { "title": "Design" },
                    { "title": "Build", "suggested_dependencies": ["Design"] }
                ]
            }),
        );

        assert_eq!(report["created"].as_array().unwrap().len(), 2);
        assert_eq!(report["edges_created"], json!(1));
        assert_eq!(report["warnings"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn estimate_complexity_returns_the_report() {
        let (_store, registry) = setup();
        let task = dispatch_ok(
            &registry,
            "add_task",
            json!({ "project": "alpha", "title": "Sized", "subtasks": ["a", "b"] }),
        );

        let report = dispatch_ok(
            &registry,
            "estimate_complexity",
            json!({ "project": "alpha", "task_id": task["id"] }),
        );

        assert_eq!(report["subtask_count"], json!(2));
        assert_eq!(report["score"], json!(4));
        assert_eq!(report["complexity"], json!("medium"));
        assert_eq!(report["estimated_hours"], json!(8));
    }

    #[test]
    fn export_and_import_move_a_project_between_stores() {
        let (_store_a, registry_a) = setup();
        dispatch_ok(
            &registry_a,
            "add_task",
            json!({ "project": "alpha", "title": "Only task" }),
        );
        let snapshot = dispatch_ok(&registry_a, "export_project", json!({ "project": "alpha" }));

        let (store_b, registry_b) = setup();
        let imported = dispatch_ok(
            &registry_b,
            "import_project",
            json!({ "snapshot": snapshot }),
        );

        assert_eq!(imported["project"], json!("alpha"));
        assert_eq!(imported["tasks"], json!(1));
        assert_eq!(store_b.list_tasks("alpha", None).unwrap().len(), 1);
    }

    #[test]
    fn operation_names_are_sorted_and_complete() {
        let (_store, registry) = setup();

        let names = registry.operation_names();

        for expected in [
            "add_dependency",
            "add_subtask",
            "add_task",
            "create_project",
            "estimate_complexity",
            "export_project",
            "get_dependencies",
            "get_next_task",
            "get_task",
            "import_project",
            "ingest_prd",
            "list_tasks",
            "update_status",
        ] {
            assert!(names.contains(&expected), "missing operation {}", expected);
        }
        assert!(names.windows(2).all(|w| w[0] < w[1]));
    }
}

mod error_body_tests {
    use super::*;

    #[test]
    fn unknown_operation_yields_a_structured_body() {
        let (_store, registry) = setup();

        let err = registry.dispatch("frobnicate", &json!({})).unwrap_err();
        let body = error_body(&err);

        assert_eq!(body.code, ErrorCode::UnknownOperation);
        assert!(body.message.contains("frobnicate"));
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let (_store, registry) = setup();

        let err = registry
            .dispatch("add_task", &json!({ "project": "alpha" }))
            .unwrap_err();
        let body = error_body(&err);

        assert_eq!(body.code, ErrorCode::MissingRequiredField);
        assert_eq!(body.field.as_deref(), Some("title"));
    }

    #[test]
    fn wrong_field_type_is_an_invalid_value() {
        let (_store, registry) = setup();

        let err = registry
            .dispatch("add_task", &json!({ "project": "alpha", "title": 42 }))
            .unwrap_err();
        let body = error_body(&err);

        assert_eq!(body.code, ErrorCode::InvalidFieldValue);
    }

    #[test]
    fn unknown_status_value_is_an_invalid_value() {
        let (_store, registry) = setup();
        let task = dispatch_ok(
            &registry,
            "add_task",
            json!({ "project": "alpha", "title": "T" }),
        );

        let err = registry
            .dispatch(
                "update_status",
                &json!({ "project": "alpha", "task_id": task["id"], "status": "paused" }),
            )
            .unwrap_err();
        let body = error_body(&err);

        assert_eq!(body.code, ErrorCode::InvalidFieldValue);
        assert!(body.message.contains("paused"));
    }

    #[test]
    fn conflict_from_the_engine_survives_the_anyhow_boundary() {
        let (_store, registry) = setup();
        let task = dispatch_ok(
            &registry,
            "add_task",
            json!({ "project": "alpha", "title": "T" }),
        );

        let err = registry
            .dispatch(
                "update_status",
                &json!({ "project": "alpha", "task_id": task["id"], "status": "done" }),
            )
            .unwrap_err();
        let body = error_body(&err);

        assert_eq!(body.code, ErrorCode::InvalidTransition);
    }

    #[test]
    fn failed_ingest_body_carries_the_cycle() {
        let (_store, registry) = setup();

        let err = registry
            .dispatch(
                "ingest_prd",
                &json!({
                    "project": "alpha",
                    "tasks": [
                        { "title": "A", "suggested_dependencies": ["B"] },
                        { "title": "B", "suggested_dependencies": ["A"] }
                    ]
                }),
            )
            .unwrap_err();
        let body = error_body(&err);

        assert_eq!(body.code, ErrorCode::BatchRejected);
        assert!(!body.cycle.is_empty());
    }
}
