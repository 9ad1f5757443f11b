// src/exec/events.rs

//! Typed executor event channel.
//!
//! The executor writes events synchronously at the point outputs and
//! errors are produced; consumers drain the channel independently on
//! whatever context suits them (a test harness, a CLI printer, a UI
//! layer). The sink is unbounded so that emission never blocks the active
//! layer, including emissions from blocking dispatch contexts.

use tokio::sync::mpsc;
use tracing::trace;

use crate::exec::state::ExecState;
use crate::module::ModuleErrorRecord;
use crate::types::ModuleId;
use crate::value::ValueMap;

#[derive(Debug, Clone)]
pub enum ExecutorEvent {
    StateChanged { state: ExecState },
    CycleStarted { cycle: u64 },
    /// A module finished its turn in the current cycle (completed, skipped
    /// or failed).
    Progress { module: ModuleId, cycle: u64 },
    /// Snapshot of the outputs a module published this cycle.
    ModuleResult { module: ModuleId, outputs: ValueMap },
    ModuleError { module: ModuleId, record: ModuleErrorRecord },
    /// Loop-level failure; the executor transitions to stopped after this.
    ExecutorError { message: String },
    CycleFinished { cycle: u64 },
}

/// Cloneable write side of the event channel.
///
/// A disabled sink drops everything; a sink whose receiver has gone away
/// behaves the same, so observers can simply be dropped.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<ExecutorEvent>>,
}

impl EventSink {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ExecutorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn emit(&self, event: ExecutorEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                trace!("event receiver dropped; event discarded");
            }
        }
    }
}
