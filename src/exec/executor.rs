// src/exec/executor.rs

//! The executor: run-state machine plus the cycle loop.
//!
//! The executor owns a built [`FlowGraph`] and drives repeated cycles
//! through its layers. Control (pause / resume / stop) arrives through a
//! cloneable [`ExecutorHandle`] and is observed only at cycle boundaries:
//! a cycle, once started, always runs to completion. Observers receive
//! [`ExecutorEvent`]s through the channel returned by
//! [`Executor::event_stream`].

use std::collections::BTreeMap;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{FlowError, Result};
use crate::exec::events::{EventSink, ExecutorEvent};
use crate::exec::metrics::ExecutorMetrics;
use crate::exec::scheduler;
use crate::exec::state::ExecState;
use crate::graph::FlowGraph;
use crate::module::CycleOutcome;
use crate::types::{ExecutionMode, ModuleId};

/// Control requests delivered to a running executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Stop,
}

/// Cloneable control handle for an executor loop.
///
/// Sending on a handle whose executor has already finished is a no-op.
#[derive(Debug, Clone)]
pub struct ExecutorHandle {
    tx: mpsc::UnboundedSender<ControlCommand>,
}

impl ExecutorHandle {
    pub fn pause(&self) {
        self.send(ControlCommand::Pause);
    }

    pub fn resume(&self) {
        self.send(ControlCommand::Resume);
    }

    pub fn stop(&self) {
        self.send(ControlCommand::Stop);
    }

    fn send(&self, cmd: ControlCommand) {
        if self.tx.send(cmd).is_err() {
            debug!(?cmd, "executor gone; control command dropped");
        }
    }
}

/// Per-cycle outcome report: what happened to every module.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: u64,
    pub outcomes: BTreeMap<ModuleId, CycleOutcome>,
}

impl CycleReport {
    pub fn outcome_of(&self, module: &str) -> Option<&CycleOutcome> {
        self.outcomes.get(module)
    }
}

/// Executor status snapshot for diagnostics.
#[derive(Debug, Clone)]
pub struct ExecutorStatus {
    pub state: ExecState,
    pub mode: ExecutionMode,
    pub module_count: usize,
    pub cycles: u64,
    pub error_count: u64,
    pub average_cycle_secs: f64,
}

pub struct Executor {
    graph: FlowGraph,
    mode: ExecutionMode,
    state: ExecState,
    cycle_index: u64,
    error_count: u64,
    ctrl_tx: mpsc::UnboundedSender<ControlCommand>,
    ctrl_rx: mpsc::UnboundedReceiver<ControlCommand>,
    events: EventSink,
    metrics: ExecutorMetrics,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("cycle_index", &self.cycle_index)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Take ownership of a built graph. Layers were derived at graph build
    /// time and stay cached for the executor's lifetime.
    pub fn new(graph: FlowGraph) -> Self {
        let (ctrl_tx, ctrl_rx) = mpsc::unbounded_channel();
        Self {
            graph,
            mode: ExecutionMode::default(),
            state: ExecState::Idle,
            cycle_index: 0,
            error_count: 0,
            ctrl_tx,
            ctrl_rx,
            events: EventSink::disabled(),
            metrics: ExecutorMetrics::default(),
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn set_mode(&mut self, mode: ExecutionMode) {
        self.mode = mode;
    }

    /// Attach an event stream. Replaces any previously attached stream.
    pub fn event_stream(&mut self) -> mpsc::UnboundedReceiver<ExecutorEvent> {
        let (sink, rx) = EventSink::channel();
        self.events = sink;
        rx
    }

    pub fn handle(&self) -> ExecutorHandle {
        ExecutorHandle {
            tx: self.ctrl_tx.clone(),
        }
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn state(&self) -> ExecState {
        self.state
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycle_index
    }

    pub fn metrics(&self) -> &ExecutorMetrics {
        &self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    pub fn status(&self) -> ExecutorStatus {
        ExecutorStatus {
            state: self.state,
            mode: self.mode,
            module_count: self.graph.len(),
            cycles: self.metrics.cycles(),
            error_count: self.error_count,
            average_cycle_secs: self.metrics.average_cycle_duration().as_secs_f64(),
        }
    }

    /// Run the continuous cycle loop until stopped.
    ///
    /// Valid from Idle or Stopped. Each iteration performs one full cycle
    /// (all layers, in order), then yields and drains queued control
    /// commands before starting the next cycle. While paused the loop
    /// sleeps on the control channel.
    pub async fn run(&mut self) -> Result<()> {
        self.state = self.state.on_run()?;
        self.graph.for_each_module(|m| m.start())?;
        self.emit_state();
        info!(mode = %self.mode, modules = self.graph.len(), "executor loop started");

        loop {
            match self.state {
                ExecState::Running => {
                    if let Err(err) = self.execute_cycle().await {
                        return Err(self.fail_run(err));
                    }
                    // Cycle boundary: the only place control is observed.
                    self.drain_control()?;
                    tokio::task::yield_now().await;
                }
                ExecState::Paused => match self.ctrl_rx.recv().await {
                    Some(cmd) => self.apply_command(cmd)?,
                    None => {
                        // All handles and our own sender gone; treat as stop.
                        self.transition_stop()?;
                    }
                },
                ExecState::Stopped => break,
                ExecState::Idle => {
                    return Err(FlowError::RuntimeExecutor(
                        "executor loop observed idle state while running".to_string(),
                    ));
                }
            }
        }

        info!(cycles = self.cycle_index, "executor loop finished");
        Ok(())
    }

    /// Perform exactly one full cycle without entering the continuous
    /// loop. Valid from Idle or Paused; the persistent run state is
    /// unchanged.
    pub async fn run_once(&mut self) -> Result<CycleReport> {
        self.state.ensure_can_run_once()?;
        let was_idle = self.state == ExecState::Idle;

        if was_idle {
            self.graph.for_each_module(|m| m.start())?;
        }
        let result = self.execute_cycle().await;
        if was_idle {
            self.graph.for_each_module(|m| m.stop())?;
        }

        match result {
            Ok(report) => Ok(report),
            Err(err) => Err(self.fail_run(err)),
        }
    }

    /// Clear all module buffers and error logs and return every module to
    /// idle. Only valid when no run is active.
    pub fn reset(&mut self) -> Result<()> {
        self.state.ensure_can_reset()?;
        self.graph.for_each_module(|m| m.reset())?;
        self.cycle_index = 0;
        self.error_count = 0;
        self.state = ExecState::Idle;
        self.emit_state();
        debug!("executor reset to idle");
        Ok(())
    }

    /// One full pass over every layer, with routing after each layer.
    async fn execute_cycle(&mut self) -> Result<CycleReport> {
        self.cycle_index += 1;
        let cycle = self.cycle_index;
        self.events.emit(ExecutorEvent::CycleStarted { cycle });
        let started = Instant::now();

        self.graph.for_each_module(|m| m.begin_cycle())?;

        let mut outcomes = BTreeMap::new();
        for layer in self.graph.layers() {
            let entries =
                scheduler::run_layer(&self.graph, layer, self.mode, cycle, &self.events).await?;
            for entry in entries {
                if matches!(entry.outcome, CycleOutcome::Failed(_)) {
                    self.error_count += 1;
                }
                if let Some(duration) = entry.duration {
                    self.metrics.record_module(&entry.module, duration);
                }
                outcomes.insert(entry.module, entry.outcome);
            }
            scheduler::route_layer_outputs(&self.graph, layer)?;
        }

        self.metrics.record_cycle(started.elapsed());
        self.events.emit(ExecutorEvent::CycleFinished { cycle });
        Ok(CycleReport { cycle, outcomes })
    }

    /// Apply every queued control command without blocking.
    fn drain_control(&mut self) -> Result<()> {
        while let Ok(cmd) = self.ctrl_rx.try_recv() {
            self.apply_command(cmd)?;
            if self.state == ExecState::Stopped {
                break;
            }
        }
        Ok(())
    }

    fn apply_command(&mut self, cmd: ControlCommand) -> Result<()> {
        match cmd {
            ControlCommand::Pause => match self.state.on_pause() {
                Ok(next) => {
                    self.state = next;
                    self.graph.for_each_module(|m| m.pause())?;
                    self.emit_state();
                    info!("executor paused");
                }
                Err(_) => warn!(state = %self.state, "pause ignored"),
            },
            ControlCommand::Resume => match self.state.on_resume() {
                Ok(next) => {
                    self.state = next;
                    self.graph.for_each_module(|m| m.resume())?;
                    self.emit_state();
                    info!("executor resumed");
                }
                Err(_) => warn!(state = %self.state, "resume ignored"),
            },
            ControlCommand::Stop => match self.state.on_stop() {
                Ok(_) => self.transition_stop()?,
                Err(_) => warn!(state = %self.state, "stop ignored"),
            },
        }
        Ok(())
    }

    fn transition_stop(&mut self) -> Result<()> {
        self.state = ExecState::Stopped;
        self.graph.for_each_module(|m| m.stop())?;
        self.emit_state();
        info!("executor stopped");
        Ok(())
    }

    /// Loop-level failure: report it, stop every module and force the
    /// terminal state.
    fn fail_run(&mut self, err: FlowError) -> FlowError {
        self.error_count += 1;
        self.events.emit(ExecutorEvent::ExecutorError {
            message: err.to_string(),
        });
        warn!(error = %err, "executor runtime failure; forcing stop");
        let _ = self.graph.for_each_module(|m| m.stop());
        self.state = ExecState::Stopped;
        self.emit_state();
        err
    }

    fn emit_state(&self) {
        self.events.emit(ExecutorEvent::StateChanged { state: self.state });
    }
}
