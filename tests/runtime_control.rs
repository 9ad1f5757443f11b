// tests/runtime_control.rs

//! Run-state machine behaviour of the continuous executor loop.

use std::time::Duration;

use flowrun::errors::FlowError;
use flowrun::exec::{ExecState, Executor, ExecutorEvent};
use flowrun::module::ModuleStatus;
use flowrun::types::ExecutionMode;
use flowrun_test_utils::builders::GraphBuilder;
use flowrun_test_utils::init_tracing;
use flowrun_test_utils::probes::{BlockingProbe, RecordingProbe, SourceProbe, value_log};
use serde_json::json;
use tokio::time::timeout;

fn small_graph() -> GraphBuilder {
    let log = value_log();
    GraphBuilder::new()
        .module("source", SourceProbe::boxed(json!(1)))
        .module("slow", BlockingProbe::boxed(Duration::from_millis(5)))
        .module("sink", RecordingProbe::boxed(&log))
        .connect("source", "out", "slow", "in")
        .connect("slow", "out", "sink", "in")
}

#[tokio::test]
async fn loop_runs_until_stopped_via_handle() {
    init_tracing();
    let mut executor = Executor::new(small_graph().build());
    let handle = executor.handle();
    let mut events = executor.event_stream();

    let watcher = tokio::spawn(async move {
        let mut finished = 0u64;
        while let Some(event) = events.recv().await {
            if let ExecutorEvent::CycleFinished { .. } = event {
                finished += 1;
                if finished == 3 {
                    handle.stop();
                }
            }
        }
        finished
    });

    timeout(Duration::from_secs(5), executor.run())
        .await
        .expect("loop did not stop within 5 seconds")
        .unwrap();

    assert_eq!(executor.state(), ExecState::Stopped);
    assert!(executor.cycles_completed() >= 3);

    let status = executor.status();
    assert_eq!(status.state, ExecState::Stopped);
    assert_eq!(status.module_count, 3);
    assert!(status.cycles >= 3);

    let stats = executor.metrics().module_stats("slow").unwrap();
    assert!(stats.exec_count >= 3);
    assert!(stats.max >= stats.average());

    // Stop invoked every module's stop hook.
    let cell = executor.graph().cell("sink").unwrap();
    assert_eq!(cell.lock().unwrap().status(), ModuleStatus::Stopped);

    drop(executor);
    let finished = watcher.await.unwrap();
    assert!(finished >= 3);
}

#[tokio::test]
async fn pause_is_only_observed_at_cycle_boundaries() {
    init_tracing();
    let mut executor = Executor::new(small_graph().build());
    let handle = executor.handle();
    let mut events = executor.event_stream();

    let watcher = tokio::spawn(async move {
        let mut sequence = Vec::new();
        let mut paused = false;
        while let Some(event) = events.recv().await {
            match &event {
                ExecutorEvent::CycleStarted { cycle } => {
                    sequence.push(format!("start:{cycle}"));
                    if !paused {
                        // Issued mid-cycle; must not take effect before the
                        // cycle completes.
                        handle.pause();
                        paused = true;
                    }
                }
                ExecutorEvent::CycleFinished { cycle } => {
                    sequence.push(format!("finish:{cycle}"));
                }
                ExecutorEvent::StateChanged { state } => {
                    sequence.push(format!("state:{state}"));
                    if *state == ExecState::Paused {
                        handle.resume();
                    }
                    if *state == ExecState::Running && paused {
                        handle.stop();
                    }
                }
                _ => {}
            }
        }
        sequence
    });

    timeout(Duration::from_secs(5), executor.run())
        .await
        .expect("loop did not stop within 5 seconds")
        .unwrap();
    drop(executor);

    let sequence = watcher.await.unwrap();
    let paused_at = sequence
        .iter()
        .position(|s| s == "state:paused")
        .expect("pause was applied");

    // Every cycle started before the pause also finished before the pause:
    // a cycle, once started, always runs to completion.
    let starts_before: Vec<_> = sequence[..paused_at]
        .iter()
        .filter_map(|s| s.strip_prefix("start:"))
        .collect();
    for cycle in starts_before {
        assert!(
            sequence[..paused_at]
                .iter()
                .any(|s| s == &format!("finish:{cycle}")),
            "cycle {cycle} was interrupted by pause: {sequence:?}"
        );
    }
}

#[tokio::test]
async fn stop_while_paused_terminates_the_loop() {
    init_tracing();
    let mut executor = Executor::new(small_graph().build());
    let handle = executor.handle();
    let mut events = executor.event_stream();

    let watcher = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ExecutorEvent::CycleFinished { cycle } if cycle == 1 => handle.pause(),
                ExecutorEvent::StateChanged { state } if state == ExecState::Paused => {
                    handle.stop();
                }
                _ => {}
            }
        }
    });

    timeout(Duration::from_secs(5), executor.run())
        .await
        .expect("loop did not stop within 5 seconds")
        .unwrap();

    assert_eq!(executor.state(), ExecState::Stopped);
    drop(executor);
    watcher.await.unwrap();
}

#[tokio::test]
async fn reset_restores_idle_and_clears_module_state() {
    init_tracing();
    let graph = GraphBuilder::new()
        .module(
            "broken",
            flowrun_test_utils::probes::FailingProbe::boxed("boom"),
        )
        .build();
    let mut executor = Executor::new(graph);

    executor.run_once().await.unwrap();
    {
        let cell = executor.graph().cell("broken").unwrap();
        let node = cell.lock().unwrap();
        assert_eq!(node.errors().len(), 1);
    }

    executor.reset().unwrap();
    assert_eq!(executor.state(), ExecState::Idle);
    assert_eq!(executor.cycles_completed(), 0);
    let cell = executor.graph().cell("broken").unwrap();
    let node = cell.lock().unwrap();
    assert!(node.errors().is_empty());
    assert_eq!(node.status(), ModuleStatus::Idle);
}

#[tokio::test]
async fn run_once_is_rejected_while_stopped() {
    init_tracing();
    let mut executor = Executor::new(small_graph().build());
    let handle = executor.handle();
    let mut events = executor.event_stream();

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let ExecutorEvent::CycleFinished { .. } = event {
                handle.stop();
            }
        }
    });

    timeout(Duration::from_secs(5), executor.run())
        .await
        .expect("loop did not stop within 5 seconds")
        .unwrap();
    assert_eq!(executor.state(), ExecState::Stopped);

    let err = executor.run_once().await.unwrap_err();
    assert!(matches!(err, FlowError::InvalidTransition { .. }), "got {err:?}");

    // After an explicit reset the executor accepts cycles again.
    executor.reset().unwrap();
    executor.set_mode(ExecutionMode::Sequential);
    let report = executor.run_once().await.unwrap();
    assert_eq!(report.cycle, 1);
}
