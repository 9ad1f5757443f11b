// src/module/capabilities.rs

//! Static capability descriptor exposed by every module behaviour.
//!
//! Only `may_block` influences the engine (adaptive scheduling, §exec);
//! the remaining fields are informational for external tooling.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Capabilities {
    /// The behaviour can drive internal async work on its own.
    pub supports_async: bool,
    /// The behaviour can process batched inputs.
    pub supports_batch: bool,
    /// The behaviour may perform long-latency (IO-bound) work inside
    /// `process`; eligible for concurrent dispatch within a layer.
    pub may_block: bool,
    /// Free-form resource grouping (e.g. "camera", "gpu").
    pub resource_tags: Vec<String>,
    /// Estimated invocations per second; purely a hint.
    pub throughput_hint: f64,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn may_block(mut self) -> Self {
        self.may_block = true;
        self
    }

    pub fn supports_async(mut self) -> Self {
        self.supports_async = true;
        self
    }

    pub fn supports_batch(mut self) -> Self {
        self.supports_batch = true;
        self
    }

    pub fn resource_tag(mut self, tag: impl Into<String>) -> Self {
        self.resource_tags.push(tag.into());
        self
    }

    pub fn throughput_hint(mut self, hint: f64) -> Self {
        self.throughput_hint = hint;
        self
    }
}
