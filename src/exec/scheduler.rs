// src/exec/scheduler.rs

//! Layer execution and output routing.
//!
//! A layer is executed to completion before the next one starts. In
//! sequential (and pipeline) mode every module runs inline in the layer's
//! deterministic order. In adaptive mode, blocking-capable modules are
//! dispatched to dedicated blocking contexts and joined before the layer
//! is considered complete; non-blocking modules still run inline, since
//! cheap CPU-bound work gains nothing from dispatch overhead.
//!
//! After the layer barrier clears, outputs are routed along the graph's
//! connections into downstream pending-input buffers, in connection
//! declaration order (so the last connection into an input wins).

use std::sync::MutexGuard;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::{FlowError, Result};
use crate::exec::events::{EventSink, ExecutorEvent};
use crate::graph::{FlowGraph, ModuleCell};
use crate::module::{CycleOutcome, ModuleNode};
use crate::types::{ExecutionMode, ModuleId};

/// Result of one module's turn within a layer.
#[derive(Debug, Clone)]
pub(crate) struct LayerEntry {
    pub module: ModuleId,
    pub outcome: CycleOutcome,
    pub duration: Option<Duration>,
}

fn lock_cell<'a>(id: &str, cell: &'a ModuleCell) -> Result<MutexGuard<'a, ModuleNode>> {
    cell.lock()
        .map_err(|_| FlowError::RuntimeExecutor(format!("module '{id}' state is poisoned")))
}

/// Run one module's cycle and emit the matching events from the executing
/// context.
fn execute_cell(
    id: ModuleId,
    cell: ModuleCell,
    cycle: u64,
    events: EventSink,
) -> Result<LayerEntry> {
    let mut node = lock_cell(&id, &cell)?;
    let outcome = node.run_cycle(cycle);

    events.emit(ExecutorEvent::Progress {
        module: id.clone(),
        cycle,
    });
    match &outcome {
        CycleOutcome::Completed => {
            events.emit(ExecutorEvent::ModuleResult {
                module: id.clone(),
                outputs: node.current_outputs().clone(),
            });
        }
        CycleOutcome::Skipped { .. } => {}
        CycleOutcome::Failed(record) => {
            events.emit(ExecutorEvent::ModuleError {
                module: id.clone(),
                record: record.clone(),
            });
        }
    }

    let duration = node.last_cycle_duration();
    drop(node);
    Ok(LayerEntry {
        module: id,
        outcome,
        duration,
    })
}

/// Execute every module of one layer according to the execution mode.
///
/// Returns one entry per module. The call only returns once every module
/// in the layer has finished (the synchronization barrier between layers).
pub(crate) async fn run_layer(
    graph: &FlowGraph,
    layer: &[ModuleId],
    mode: ExecutionMode,
    cycle: u64,
    events: &EventSink,
) -> Result<Vec<LayerEntry>> {
    match mode {
        ExecutionMode::Sequential | ExecutionMode::Pipeline => {
            run_layer_sequential(graph, layer, cycle, events)
        }
        ExecutionMode::Adaptive => run_layer_adaptive(graph, layer, cycle, events).await,
    }
}

fn run_layer_sequential(
    graph: &FlowGraph,
    layer: &[ModuleId],
    cycle: u64,
    events: &EventSink,
) -> Result<Vec<LayerEntry>> {
    let mut entries = Vec::with_capacity(layer.len());
    for id in layer {
        let cell = expect_cell(graph, id)?;
        entries.push(execute_cell(id.clone(), cell, cycle, events.clone())?);
    }
    Ok(entries)
}

async fn run_layer_adaptive(
    graph: &FlowGraph,
    layer: &[ModuleId],
    cycle: u64,
    events: &EventSink,
) -> Result<Vec<LayerEntry>> {
    let mut blocking: Vec<(ModuleId, ModuleCell)> = Vec::new();
    let mut inline: Vec<(ModuleId, ModuleCell)> = Vec::new();

    for id in layer {
        let cell = expect_cell(graph, id)?;
        let may_block = lock_cell(id, &cell)?.capabilities().may_block;
        if may_block {
            blocking.push((id.clone(), cell));
        } else {
            inline.push((id.clone(), cell));
        }
    }

    debug!(
        cycle,
        blocking = blocking.len(),
        inline = inline.len(),
        "adaptive layer dispatch"
    );

    // Dispatch blocking-capable modules first so their wait time overlaps
    // with the inline work below.
    let handles: Vec<JoinHandle<Result<LayerEntry>>> = blocking
        .into_iter()
        .map(|(id, cell)| {
            let events = events.clone();
            tokio::task::spawn_blocking(move || execute_cell(id, cell, cycle, events))
        })
        .collect();

    let mut entries = Vec::with_capacity(layer.len());
    for (id, cell) in inline {
        entries.push(execute_cell(id, cell, cycle, events.clone())?);
    }

    // Barrier: the layer is complete only after every dispatched module
    // has returned. The next layer never starts before this clears.
    for handle in handles {
        let entry = handle
            .await
            .map_err(|e| FlowError::RuntimeExecutor(format!("blocking dispatch failed: {e}")))??;
        entries.push(entry);
    }

    // Deterministic reporting order regardless of completion order.
    entries.sort_by(|a, b| a.module.cmp(&b.module));
    Ok(entries)
}

/// Route the completed layer's outputs into downstream pending inputs.
///
/// Connections are applied in declaration order; an upstream module with
/// no value on the source port this cycle routes nothing.
pub(crate) fn route_layer_outputs(graph: &FlowGraph, layer: &[ModuleId]) -> Result<()> {
    for conn in graph.connections() {
        if !layer.contains(&conn.source_module) {
            continue;
        }
        let source = expect_cell(graph, &conn.source_module)?;
        let value = lock_cell(&conn.source_module, &source)?.output_value(&conn.source_port);
        let Some(value) = value else {
            continue;
        };
        let target = expect_cell(graph, &conn.target_module)?;
        lock_cell(&conn.target_module, &target)?.deliver_input(&conn.target_port, value);
    }
    Ok(())
}

fn expect_cell(graph: &FlowGraph, id: &str) -> Result<ModuleCell> {
    graph
        .cell(id)
        .cloned()
        .ok_or_else(|| FlowError::RuntimeExecutor(format!("module '{id}' missing from graph")))
}
