// src/exec/state.rs

//! Pure run-state machine for the executor.
//!
//! Transitions are plain value-level functions with no IO so the whole
//! machine can be unit tested without Tokio or modules. The async loop in
//! [`executor`](crate::exec::executor) drives it and applies the side
//! effects (module hooks, events).
//!
//! Valid transitions:
//! `Idle → Running ⇄ Paused`, `Running/Paused → Stopped` (terminal for the
//! run; `reset` from Stopped/Idle returns everything to Idle). A stopped
//! executor may be re-run, which starts a fresh run over the same graph.

use serde::Serialize;

use crate::errors::{FlowError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecState {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl ExecState {
    pub fn name(&self) -> &'static str {
        match self {
            ExecState::Idle => "idle",
            ExecState::Running => "running",
            ExecState::Paused => "paused",
            ExecState::Stopped => "stopped",
        }
    }

    fn invalid(self, requested: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            from: self.name(),
            requested,
        }
    }

    pub fn on_run(self) -> Result<ExecState> {
        match self {
            ExecState::Idle | ExecState::Stopped => Ok(ExecState::Running),
            other => Err(other.invalid("run")),
        }
    }

    pub fn on_pause(self) -> Result<ExecState> {
        match self {
            ExecState::Running => Ok(ExecState::Paused),
            other => Err(other.invalid("pause")),
        }
    }

    pub fn on_resume(self) -> Result<ExecState> {
        match self {
            ExecState::Paused => Ok(ExecState::Running),
            other => Err(other.invalid("resume")),
        }
    }

    pub fn on_stop(self) -> Result<ExecState> {
        match self {
            ExecState::Running | ExecState::Paused => Ok(ExecState::Stopped),
            other => Err(other.invalid("stop")),
        }
    }

    /// `run_once` does not transition, but is only valid from Idle or
    /// Paused.
    pub fn ensure_can_run_once(self) -> Result<()> {
        match self {
            ExecState::Idle | ExecState::Paused => Ok(()),
            other => Err(other.invalid("run_once")),
        }
    }

    /// `reset` is only valid once no run is active.
    pub fn ensure_can_reset(self) -> Result<()> {
        match self {
            ExecState::Idle | ExecState::Stopped => Ok(()),
            other => Err(other.invalid("reset")),
        }
    }
}

impl std::fmt::Display for ExecState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_happy_path() {
        let s = ExecState::Idle.on_run().unwrap();
        assert_eq!(s, ExecState::Running);
        let s = s.on_pause().unwrap();
        assert_eq!(s, ExecState::Paused);
        let s = s.on_resume().unwrap();
        assert_eq!(s, ExecState::Running);
        let s = s.on_stop().unwrap();
        assert_eq!(s, ExecState::Stopped);
        // A stopped executor may start a fresh run.
        assert_eq!(s.on_run().unwrap(), ExecState::Running);
    }

    #[test]
    fn pause_requires_running() {
        assert!(ExecState::Idle.on_pause().is_err());
        assert!(ExecState::Stopped.on_pause().is_err());
    }

    #[test]
    fn reset_requires_no_active_run() {
        assert!(ExecState::Running.ensure_can_reset().is_err());
        assert!(ExecState::Paused.ensure_can_reset().is_err());
        assert!(ExecState::Idle.ensure_can_reset().is_ok());
        assert!(ExecState::Stopped.ensure_can_reset().is_ok());
    }

    #[test]
    fn run_once_only_from_idle_or_paused() {
        assert!(ExecState::Idle.ensure_can_run_once().is_ok());
        assert!(ExecState::Paused.ensure_can_run_once().is_ok());
        assert!(ExecState::Running.ensure_can_run_once().is_err());
        assert!(ExecState::Stopped.ensure_can_run_once().is_err());
    }
}
