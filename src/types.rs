use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical module identifier type used throughout the engine.
pub type ModuleId = String;

/// How modules within a single layer are executed.
///
/// - `Sequential`: every module runs inline, one at a time, in the layer's
///   deterministic order (default).
/// - `Adaptive`: blocking-capable modules (`may_block`) are dispatched to
///   run concurrently; the rest run inline. The layer only completes once
///   every dispatched module has returned.
/// - `Pipeline`: reserved identifier; currently behaves exactly like
///   `Sequential`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    Adaptive,
    Pipeline,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Sequential
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(ExecutionMode::Sequential),
            "adaptive" | "parallel" => Ok(ExecutionMode::Adaptive),
            "pipeline" => Ok(ExecutionMode::Pipeline),
            other => Err(format!(
                "invalid execution mode: {other} (expected \"sequential\", \"adaptive\" or \"pipeline\")"
            )),
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Adaptive => "adaptive",
            ExecutionMode::Pipeline => "pipeline",
        };
        f.write_str(s)
    }
}
