// src/module/node.rs

//! Engine-owned module state.
//!
//! A [`ModuleNode`] wraps a [`ModuleBehaviour`] with everything the engine
//! tracks per module: identity, lifecycle status, committed configuration,
//! the per-cycle input/output buffers, the error log and timing. Buffers
//! are cycle-scoped: routing writes into `pending_inputs`, `run_cycle`
//! consumes them, and `begin_cycle` clears everything at the start of each
//! executor pass.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::module::ModuleBehaviour;
use crate::module::capabilities::Capabilities;
use crate::module::config::ConfigValidationError;
use crate::module::port::PortSet;
use crate::types::ModuleId;
use crate::value::{PortValue, ValueMap};

/// Lifecycle status of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    Idle,
    Running,
    Paused,
    Error,
    Stopped,
}

impl std::fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModuleStatus::Idle => "idle",
            ModuleStatus::Running => "running",
            ModuleStatus::Paused => "paused",
            ModuleStatus::Error => "error",
            ModuleStatus::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// One recorded module failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleErrorRecord {
    pub module: ModuleId,
    pub cycle: u64,
    pub message: String,
}

/// What happened to a module during one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// `process` ran and its outputs (possibly none) were published.
    Completed,
    /// A required input was absent; `process` was not invoked. Not an error.
    Skipped { missing: String },
    /// `process` returned an error; recorded, module marked [`ModuleStatus::Error`].
    Failed(ModuleErrorRecord),
}

/// Read-only snapshot of a module's state, for diagnostics and tooling.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSnapshot {
    pub id: ModuleId,
    pub type_name: String,
    pub status: ModuleStatus,
    pub config: ValueMap,
    pub input_ports: Vec<String>,
    pub output_ports: Vec<String>,
    pub errors: Vec<ModuleErrorRecord>,
    pub capabilities: Capabilities,
    pub last_cycle_duration_secs: Option<f64>,
}

/// A module instance as the engine sees it.
pub struct ModuleNode {
    id: ModuleId,
    type_name: String,
    status: ModuleStatus,
    config: ValueMap,
    behaviour: Box<dyn ModuleBehaviour>,
    /// Values delivered by routing, waiting for the next `run_cycle`.
    pending_inputs: ValueMap,
    /// Inputs consumed by the most recent `run_cycle`.
    current_inputs: ValueMap,
    /// Outputs published by the most recent `run_cycle`.
    current_outputs: ValueMap,
    errors: Vec<ModuleErrorRecord>,
    last_cycle_duration: Option<Duration>,
}

impl std::fmt::Debug for ModuleNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleNode")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl ModuleNode {
    pub fn new(id: impl Into<ModuleId>, behaviour: Box<dyn ModuleBehaviour>) -> Self {
        Self {
            id: id.into(),
            type_name: behaviour.type_name().to_string(),
            status: ModuleStatus::Idle,
            config: ValueMap::new(),
            behaviour,
            pending_inputs: ValueMap::new(),
            current_inputs: ValueMap::new(),
            current_outputs: ValueMap::new(),
            errors: Vec::new(),
            last_cycle_duration: None,
        }
    }

    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn status(&self) -> ModuleStatus {
        self.status
    }

    pub fn config(&self) -> &ValueMap {
        &self.config
    }

    pub fn ports(&self) -> &PortSet {
        self.behaviour.ports()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.behaviour.capabilities()
    }

    pub fn errors(&self) -> &[ModuleErrorRecord] {
        &self.errors
    }

    pub fn current_inputs(&self) -> &ValueMap {
        &self.current_inputs
    }

    pub fn current_outputs(&self) -> &ValueMap {
        &self.current_outputs
    }

    pub fn last_cycle_duration(&self) -> Option<Duration> {
        self.last_cycle_duration
    }

    /// Latest published value on an output port, if any.
    pub fn output_value(&self, port: &str) -> Option<PortValue> {
        self.current_outputs.get(port).cloned()
    }

    /// Write a value into the pending input buffer.
    ///
    /// Used by the executor's routing step; values for undeclared ports are
    /// dropped. Repeated deliveries to the same port within one cycle
    /// overwrite each other, so the last applied value wins.
    pub fn deliver_input(&mut self, port: &str, value: PortValue) {
        if self.ports().input(port).is_none() {
            debug!(module = %self.id, port, "dropping value for undeclared input port");
            return;
        }
        self.pending_inputs.insert(port.to_string(), value);
    }

    /// Apply a configuration delta atomically.
    ///
    /// The delta is merged over a copy of the current configuration and the
    /// merged result validated against the behaviour's schema. On failure
    /// the error is logged and recorded and the current configuration is
    /// left byte-for-byte untouched.
    pub fn configure(&mut self, delta: ValueMap) -> Result<(), ConfigValidationError> {
        let mut merged = self.config.clone();
        for (key, value) in delta {
            merged.insert(key, value);
        }

        if let Some(schema) = self.behaviour.config_schema() {
            if let Err(err) = schema.validate(&self.id, &merged) {
                warn!(module = %self.id, error = %err, "configuration delta rejected");
                self.errors.push(ModuleErrorRecord {
                    module: self.id.clone(),
                    cycle: 0,
                    message: err.to_string(),
                });
                return Err(err);
            }
        }

        self.config = merged;
        self.behaviour.on_configure(&self.config);
        debug!(module = %self.id, "configuration committed");
        Ok(())
    }

    /// Clear the per-cycle buffers. Called once per executor pass, before
    /// any layer runs; no value survives from one cycle into the next.
    pub fn begin_cycle(&mut self) {
        self.pending_inputs.clear();
        self.current_inputs.clear();
        self.current_outputs.clear();
    }

    /// Execute one processing step.
    ///
    /// Receives the pending inputs, skips when a required input is absent,
    /// otherwise invokes the behaviour's `process` and publishes the
    /// declared outputs. A process error is caught here: it is appended to
    /// the error log and flips the status to [`ModuleStatus::Error`], but
    /// never propagates to the caller.
    pub fn run_cycle(&mut self, cycle: u64) -> CycleOutcome {
        self.current_inputs = std::mem::take(&mut self.pending_inputs);
        self.current_outputs.clear();

        let missing = self
            .ports()
            .required_inputs()
            .find(|name| !self.current_inputs.contains_key(*name))
            .map(str::to_string);
        if let Some(missing) = missing {
            debug!(module = %self.id, cycle, port = %missing, "required input absent; skipping cycle");
            return CycleOutcome::Skipped { missing };
        }

        let started = Instant::now();
        let result = self.behaviour.process(&self.config, &self.current_inputs);
        self.last_cycle_duration = Some(started.elapsed());

        match result {
            Ok(outputs) => {
                for (port, value) in outputs {
                    if self.ports().output(&port).is_some() {
                        self.current_outputs.insert(port, value);
                    } else {
                        debug!(module = %self.id, port, "dropping value for undeclared output port");
                    }
                }
                if self.status == ModuleStatus::Error {
                    self.status = ModuleStatus::Running;
                }
                CycleOutcome::Completed
            }
            Err(err) => {
                let record = ModuleErrorRecord {
                    module: self.id.clone(),
                    cycle,
                    message: err.message,
                };
                warn!(module = %self.id, cycle, error = %record.message, "process failed");
                self.errors.push(record.clone());
                self.status = ModuleStatus::Error;
                CycleOutcome::Failed(record)
            }
        }
    }

    pub fn start(&mut self) {
        match self.status {
            ModuleStatus::Idle | ModuleStatus::Stopped => {
                self.behaviour.on_start();
                self.status = ModuleStatus::Running;
            }
            other => warn!(module = %self.id, status = %other, "start ignored"),
        }
    }

    pub fn stop(&mut self) {
        match self.status {
            ModuleStatus::Running | ModuleStatus::Paused | ModuleStatus::Error => {
                self.behaviour.on_stop();
                self.status = ModuleStatus::Stopped;
            }
            other => warn!(module = %self.id, status = %other, "stop ignored"),
        }
    }

    pub fn pause(&mut self) {
        if self.status == ModuleStatus::Running {
            self.behaviour.on_pause();
            self.status = ModuleStatus::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.status == ModuleStatus::Paused {
            self.behaviour.on_resume();
            self.status = ModuleStatus::Running;
        }
    }

    /// Return the module to a pristine idle state: buffers and error log
    /// cleared, status back to [`ModuleStatus::Idle`].
    pub fn reset(&mut self) {
        self.behaviour.on_reset();
        self.pending_inputs.clear();
        self.current_inputs.clear();
        self.current_outputs.clear();
        self.errors.clear();
        self.last_cycle_duration = None;
        self.status = ModuleStatus::Idle;
    }

    pub fn snapshot(&self) -> ModuleSnapshot {
        ModuleSnapshot {
            id: self.id.clone(),
            type_name: self.type_name.clone(),
            status: self.status,
            config: self.config.clone(),
            input_ports: self.ports().inputs().iter().map(|p| p.name.clone()).collect(),
            output_ports: self
                .ports()
                .outputs()
                .iter()
                .map(|p| p.name.clone())
                .collect(),
            errors: self.errors.clone(),
            capabilities: self.capabilities(),
            last_cycle_duration_secs: self.last_cycle_duration.map(|d| d.as_secs_f64()),
        }
    }
}
