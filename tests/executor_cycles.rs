// tests/executor_cycles.rs

//! Single-cycle semantics: routing, skipping, error isolation.

use flowrun::exec::Executor;
use flowrun::module::{CycleOutcome, ModuleStatus};
use flowrun_test_utils::builders::GraphBuilder;
use flowrun_test_utils::init_tracing;
use flowrun_test_utils::probes::{FailingProbe, RecordingProbe, SourceProbe, value_log};
use serde_json::json;

#[tokio::test]
async fn chain_routes_values_through_layers() {
    init_tracing();
    let first = value_log();
    let second = value_log();
    let graph = GraphBuilder::new()
        .module("source", SourceProbe::boxed(json!(42)))
        .module("stage1", RecordingProbe::boxed(&first))
        .module("stage2", RecordingProbe::boxed(&second))
        .connect("source", "out", "stage1", "in")
        .connect("stage1", "out", "stage2", "in")
        .build();

    let mut executor = Executor::new(graph);
    let report = executor.run_once().await.unwrap();

    assert_eq!(report.cycle, 1);
    for id in ["source", "stage1", "stage2"] {
        assert_eq!(report.outcome_of(id), Some(&CycleOutcome::Completed));
    }
    assert_eq!(*first.lock().unwrap(), vec![json!(42)]);
    assert_eq!(*second.lock().unwrap(), vec![json!(42)]);
}

#[tokio::test]
async fn last_connection_into_an_input_wins() {
    init_tracing();
    let log = value_log();
    let graph = GraphBuilder::new()
        .module("s1", SourceProbe::boxed(json!("first")))
        .module("s2", SourceProbe::boxed(json!("second")))
        .module("sink", RecordingProbe::boxed(&log))
        .connect("s1", "out", "sink", "in")
        .connect("s2", "out", "sink", "in")
        .build();

    let mut executor = Executor::new(graph);
    executor.run_once().await.unwrap();

    // Both connections deliver every cycle; the later declaration wins.
    assert_eq!(*log.lock().unwrap(), vec![json!("second")]);
}

#[tokio::test]
async fn missing_required_input_skips_without_error() {
    init_tracing();
    let log = value_log();
    let graph = GraphBuilder::new()
        .module("orphan", RecordingProbe::boxed(&log))
        .build();

    let mut executor = Executor::new(graph);
    let report = executor.run_once().await.unwrap();

    assert!(matches!(
        report.outcome_of("orphan"),
        Some(CycleOutcome::Skipped { missing }) if missing == "in"
    ));
    assert!(log.lock().unwrap().is_empty());

    let cell = executor.graph().cell("orphan").unwrap();
    let node = cell.lock().unwrap();
    assert!(node.errors().is_empty());
    assert_ne!(node.status(), ModuleStatus::Error);
}

#[tokio::test]
async fn empty_output_map_is_valid_and_routes_nothing() {
    init_tracing();
    let log = value_log();
    // A completing module that emits no outputs: downstream required
    // inputs stay absent and the dependent is skipped, not failed.
    let graph = GraphBuilder::new()
        .module("gate", flowrun::modules::BoolGate::boxed().unwrap())
        .module("flag", SourceProbe::boxed(json!(false)))
        .module("sink", RecordingProbe::boxed(&log))
        .connect("flag", "out", "gate", "flag")
        .connect("gate", "passed", "sink", "in")
        .build();

    let mut executor = Executor::new(graph);
    let report = executor.run_once().await.unwrap();

    assert_eq!(report.outcome_of("gate"), Some(&CycleOutcome::Completed));
    assert!(matches!(
        report.outcome_of("sink"),
        Some(CycleOutcome::Skipped { .. })
    ));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn process_error_is_isolated_to_the_failing_module() {
    init_tracing();
    let log = value_log();
    let graph = GraphBuilder::new()
        .module("broken", FailingProbe::boxed("boom"))
        .module("source", SourceProbe::boxed(json!(7)))
        .module("sink", RecordingProbe::boxed(&log))
        .connect("source", "out", "sink", "in")
        .build();

    let mut executor = Executor::new(graph);
    let report = executor.run_once().await.unwrap();

    // The failing module is marked, with exactly one new record.
    assert!(matches!(
        report.outcome_of("broken"),
        Some(CycleOutcome::Failed(record)) if record.message == "boom" && record.cycle == 1
    ));
    {
        let cell = executor.graph().cell("broken").unwrap();
        let node = cell.lock().unwrap();
        assert_eq!(node.status(), ModuleStatus::Error);
        assert_eq!(node.errors().len(), 1);
    }

    // Unrelated modules in the same cycle still ran and routed normally.
    assert_eq!(report.outcome_of("source"), Some(&CycleOutcome::Completed));
    assert_eq!(report.outcome_of("sink"), Some(&CycleOutcome::Completed));
    assert_eq!(*log.lock().unwrap(), vec![json!(7)]);

    // A second cycle appends a second record; the run keeps going.
    executor.run_once().await.unwrap();
    let cell = executor.graph().cell("broken").unwrap();
    assert_eq!(cell.lock().unwrap().errors().len(), 2);
}

#[tokio::test]
async fn buffers_are_cycle_scoped() {
    init_tracing();
    let log = value_log();
    // `sink` is fed by a gate that only opens when the flag is true; the
    // flag source always emits false, so no value may leak from anywhere.
    let graph = GraphBuilder::new()
        .module("flag", SourceProbe::boxed(json!(false)))
        .module("gate", flowrun::modules::BoolGate::boxed().unwrap())
        .module("sink", RecordingProbe::boxed(&log))
        .connect("flag", "out", "gate", "flag")
        .connect("gate", "flag_out", "sink", "in")
        .build();

    let mut executor = Executor::new(graph);
    for _ in 0..3 {
        let report = executor.run_once().await.unwrap();
        assert!(matches!(
            report.outcome_of("sink"),
            Some(CycleOutcome::Skipped { .. })
        ));
    }
    assert!(log.lock().unwrap().is_empty());
}
