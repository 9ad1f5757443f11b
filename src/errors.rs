// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! The split mirrors the failure policy of the engine:
//! - build-time errors (`DuplicatePort`, `GraphValidation`, `GraphCycle`)
//!   are fatal: the executor refuses to build a broken graph;
//! - `ConfigValidation` and `Process` are runtime errors scoped to a single
//!   module and never abort the cycle for unrelated modules;
//! - `RuntimeExecutor` is a loop-level fault and forces the run to stop.

use thiserror::Error;

use crate::module::config::ConfigValidationError;
use crate::module::port::PortDirection;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("duplicate {direction} port '{port}'")]
    DuplicatePort {
        direction: PortDirection,
        port: String,
    },

    #[error("graph validation error: {0}")]
    GraphValidation(String),

    #[error("cycle detected in flow graph: {0}")]
    GraphCycle(String),

    #[error(transparent)]
    ConfigValidation(#[from] ConfigValidationError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("executor runtime error: {0}")]
    RuntimeExecutor(String),

    #[error("invalid run-state transition: {requested} while {from}")]
    InvalidTransition {
        from: &'static str,
        requested: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pipeline document error: {0}")]
    Document(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure raised by a module's `process` step.
///
/// Caught at the module boundary: the owning module is marked as errored
/// and the rest of the cycle carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProcessError {
    pub message: String,
}

impl ProcessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
