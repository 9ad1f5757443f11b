// tests/document_roundtrip.rs

//! Persisted pipeline document loading, saving and instantiation.

use flowrun::errors::FlowError;
use flowrun::exec::Executor;
use flowrun::graph::{FlowGraph, PipelineDocument};
use flowrun::module::ModuleRegistry;
use flowrun_test_utils::init_tracing;
use serde_json::json;

const DOC_WITH_GROUPS: &str = r#"{
    "modules": [
        {
            "module_id": "text1",
            "module_type": "text_input",
            "x": 40.0,
            "y": 80.0,
            "width": 160.0,
            "height": 90.0,
            "config": { "text": "hello" }
        },
        {
            "module_id": "print1",
            "module_type": "print",
            "x": 320.0,
            "y": 80.0
        }
    ],
    "connections": [
        {
            "source_module": "text1",
            "source_port": "text",
            "target_module": "print1",
            "target_port": "value"
        }
    ],
    "groups": [
        {
            "group_id": "group_1",
            "title": "io",
            "x": 0.0,
            "y": 0.0,
            "width": 500.0,
            "height": 240.0,
            "members": ["text1", "print1"]
        }
    ]
}"#;

const DOC_WITHOUT_GROUPS: &str = r#"{
    "modules": [
        { "module_id": "text1", "module_type": "text_input", "config": { "text": "hello" } },
        { "module_id": "print1", "module_type": "print" }
    ],
    "connections": [
        {
            "source_module": "text1",
            "source_port": "text",
            "target_module": "print1",
            "target_port": "value"
        }
    ]
}"#;

fn build(doc: &PipelineDocument) -> FlowGraph {
    let registry = ModuleRegistry::with_builtin_modules();
    let (modules, connections) = doc.instantiate(&registry).unwrap();
    FlowGraph::build(modules, connections).unwrap()
}

#[test]
fn groups_are_parsed_but_do_not_affect_execution() {
    init_tracing();
    let with_groups = PipelineDocument::from_json_str(DOC_WITH_GROUPS).unwrap();
    let without_groups = PipelineDocument::from_json_str(DOC_WITHOUT_GROUPS).unwrap();

    assert_eq!(with_groups.groups.len(), 1);
    assert_eq!(with_groups.groups[0].members, vec!["text1", "print1"]);
    assert!(without_groups.groups.is_empty());

    // The derived graphs are identical either way.
    let a = build(&with_groups);
    let b = build(&without_groups);
    assert_eq!(a.layers(), b.layers());
    assert_eq!(a.connections(), b.connections());
}

#[test]
fn stored_config_is_applied_at_instantiation() {
    init_tracing();
    let doc = PipelineDocument::from_json_str(DOC_WITH_GROUPS).unwrap();
    let registry = ModuleRegistry::with_builtin_modules();
    let (modules, _) = doc.instantiate(&registry).unwrap();
    let text1 = modules.iter().find(|m| m.id() == "text1").unwrap();
    assert_eq!(text1.config().get("text"), Some(&json!("hello")));
}

#[test]
fn unknown_module_type_fails_instantiation() {
    init_tracing();
    let doc = PipelineDocument::from_json_str(
        r#"{ "modules": [ { "module_id": "m", "module_type": "camera" } ], "connections": [] }"#,
    )
    .unwrap();
    let registry = ModuleRegistry::with_builtin_modules();
    let err = doc.instantiate(&registry).unwrap_err();
    assert!(matches!(err, FlowError::GraphValidation(_)), "got {err:?}");
}

#[test]
fn invalid_stored_config_fails_instantiation() {
    init_tracing();
    let doc = PipelineDocument::from_json_str(
        r#"{
            "modules": [
                { "module_id": "t", "module_type": "text_input", "config": { "text": 5 } }
            ],
            "connections": []
        }"#,
    )
    .unwrap();
    let registry = ModuleRegistry::with_builtin_modules();
    let err = doc.instantiate(&registry).unwrap_err();
    assert!(matches!(err, FlowError::ConfigValidation(_)), "got {err:?}");
}

#[test]
fn save_and_load_preserve_the_document() {
    init_tracing();
    let doc = PipelineDocument::from_json_str(DOC_WITH_GROUPS).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");

    doc.save(&path).unwrap();
    let reloaded = PipelineDocument::load(&path).unwrap();

    assert_eq!(reloaded.modules.len(), doc.modules.len());
    assert_eq!(reloaded.connections, doc.connections);
    assert_eq!(reloaded.groups.len(), 1);
    assert_eq!(reloaded.modules[0].config, doc.modules[0].config);
}

#[tokio::test]
async fn loaded_document_executes() {
    init_tracing();
    let doc = PipelineDocument::from_json_str(DOC_WITH_GROUPS).unwrap();
    let graph = build(&doc);
    let mut executor = Executor::new(graph);
    let report = executor.run_once().await.unwrap();
    assert_eq!(report.outcomes.len(), 2);
}
