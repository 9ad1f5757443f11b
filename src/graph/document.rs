// src/graph/document.rs

//! Persisted pipeline document (interchange format).
//!
//! JSON with three top-level arrays: `modules`, `connections` and optional
//! `groups`. Groups are purely organizational metadata for editing tools;
//! execution ignores them and documents without them load unchanged.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::graph::Connection;
use crate::module::{ModuleNode, ModuleRegistry};
use crate::value::ValueMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDocument {
    pub modules: Vec<ModuleEntry>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupEntry>,
}

/// One placed module: identity, canvas position and configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub module_id: String,
    pub module_type: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub config: ValueMap,
    /// Optional module-specific state snapshot; opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

/// Organizational grouping of modules on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupEntry {
    pub group_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub members: Vec<String>,
}

impl PipelineDocument {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let doc = Self::from_json_str(&text)?;
        debug!(
            path = %path.as_ref().display(),
            modules = doc.modules.len(),
            connections = doc.connections.len(),
            "pipeline document loaded"
        );
        Ok(doc)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Instantiate every module through the registry and apply its stored
    /// configuration.
    ///
    /// An unknown module type or a configuration rejected by the module's
    /// schema fails the whole instantiation; the caller gets either a
    /// complete, configured module list or an error.
    pub fn instantiate(&self, registry: &ModuleRegistry) -> Result<(Vec<ModuleNode>, Vec<Connection>)> {
        let mut modules = Vec::with_capacity(self.modules.len());
        for entry in &self.modules {
            let mut node = registry.instantiate(&entry.module_type, entry.module_id.clone())?;
            if !entry.config.is_empty() {
                node.configure(entry.config.clone())?;
            }
            modules.push(node);
        }
        Ok((modules, self.connections.clone()))
    }
}
