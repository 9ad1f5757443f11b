// src/lib.rs

pub mod cli;
pub mod errors;
pub mod exec;
pub mod graph;
pub mod logging;
pub mod module;
pub mod modules;
pub mod types;
pub mod value;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::exec::{Executor, ExecutorEvent};
use crate::graph::{FlowGraph, PipelineDocument};
use crate::module::ModuleRegistry;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - pipeline document loading
/// - the built-in module registry
/// - graph build + layer derivation
/// - the executor loop, event drain and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let doc = PipelineDocument::load(&args.pipeline)?;
    let registry = ModuleRegistry::with_builtin_modules();
    let (modules, connections) = doc.instantiate(&registry)?;
    let graph = FlowGraph::build(modules, connections)?;

    if args.dry_run {
        print_dry_run(&graph);
        return Ok(());
    }

    let mut executor = Executor::new(graph).with_mode(args.mode);

    if args.once {
        let report = executor.run_once().await?;
        info!(cycle = report.cycle, "single cycle complete");
        return Ok(());
    }

    let mut events = executor.event_stream();
    let handle = executor.handle();

    // Ctrl-C → graceful stop at the next cycle boundary.
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            handle.stop();
        });
    }

    // Drain executor events; with --cycles N, stop after the Nth cycle.
    let cycle_budget = args.cycles;
    let drain = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ExecutorEvent::ModuleResult { module, outputs } => {
                    debug!(module = %module, ?outputs, "module result");
                }
                ExecutorEvent::ModuleError { module, record } => {
                    warn!(module = %module, cycle = record.cycle, error = %record.message, "module error");
                }
                ExecutorEvent::ExecutorError { message } => {
                    warn!(error = %message, "executor error");
                }
                ExecutorEvent::CycleFinished { cycle } => {
                    if cycle_budget.is_some_and(|n| cycle >= n) {
                        info!(cycle, "cycle budget reached; stopping");
                        handle.stop();
                    }
                }
                _ => {}
            }
        }
    });

    let result = executor.run().await;
    drain.abort();
    result.map_err(Into::into)
}

/// Simple dry-run output: modules, connections and the layer plan.
fn print_dry_run(graph: &FlowGraph) {
    println!("flowrun dry-run");
    println!();

    println!("modules ({}):", graph.len());
    for id in graph.module_ids() {
        if let Some(cell) = graph.cell(id) {
            if let Ok(node) = cell.lock() {
                println!("  - {id} ({})", node.type_name());
            }
        }
    }

    println!("connections ({}):", graph.connections().len());
    for conn in graph.connections() {
        println!("  - {conn}");
    }

    println!("layers ({}):", graph.layers().len());
    for (index, layer) in graph.layers().iter().enumerate() {
        println!("  {index}: {}", layer.join(", "));
    }

    debug!("dry-run complete (no execution)");
}
