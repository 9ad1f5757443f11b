// src/module/port.rs

//! Port descriptors.
//!
//! Ports are the only attachment points the engine knows about: a module
//! declares an ordered set of named input and output ports once, at
//! construction time, and connections are validated against that set when
//! the graph is built. Type tags are descriptive classification only and
//! are not enforced at connection time.

use serde::{Deserialize, Serialize};

use crate::errors::{FlowError, Result};

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl std::fmt::Display for PortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortDirection::Input => f.write_str("input"),
            PortDirection::Output => f.write_str("output"),
        }
    }
}

/// Descriptor for a single port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    /// Free-form classification tag (e.g. "text", "bool", "image").
    pub type_tag: String,
    #[serde(default)]
    pub description: String,
    /// Only meaningful on input ports: a required input must hold a value
    /// before the module's `process` step runs, otherwise the cycle is
    /// skipped for that module.
    #[serde(default)]
    pub required: bool,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            description: String::new(),
            required: false,
        }
    }

    /// Mark the port as required (input ports only).
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Ordered input and output port declarations of one module.
///
/// Names are unique per direction; a second registration of the same name
/// fails with [`FlowError::DuplicatePort`].
#[derive(Debug, Clone, Default)]
pub struct PortSet {
    inputs: Vec<PortSpec>,
    outputs: Vec<PortSpec>,
}

impl PortSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, direction: PortDirection, spec: PortSpec) -> Result<()> {
        let ports = match direction {
            PortDirection::Input => &mut self.inputs,
            PortDirection::Output => &mut self.outputs,
        };
        if ports.iter().any(|p| p.name == spec.name) {
            return Err(FlowError::DuplicatePort {
                direction,
                port: spec.name,
            });
        }
        ports.push(spec);
        Ok(())
    }

    pub fn add_input(&mut self, spec: PortSpec) -> Result<()> {
        self.register(PortDirection::Input, spec)
    }

    pub fn add_output(&mut self, spec: PortSpec) -> Result<()> {
        self.register(PortDirection::Output, spec)
    }

    pub fn inputs(&self) -> &[PortSpec] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PortSpec] {
        &self.outputs
    }

    pub fn input(&self, name: &str) -> Option<&PortSpec> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&PortSpec> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// Names of required input ports, in declaration order.
    pub fn required_inputs(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }
}
