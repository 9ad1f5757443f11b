// src/modules/text_input.rs

//! Configured text source.

use crate::errors::{ProcessError, Result};
use crate::module::{ConfigSchema, FieldKind, ModuleBehaviour, PortSet, PortSpec};
use crate::value::ValueMap;
use serde_json::Value;

/// Emits the configured `text` on its `text` output every cycle.
pub struct TextInput {
    ports: PortSet,
}

impl TextInput {
    pub fn new() -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_output(PortSpec::new("text", "text").describe("configured text"))?;
        Ok(Self { ports })
    }

    pub fn boxed() -> Result<Box<dyn ModuleBehaviour>> {
        Ok(Box::new(Self::new()?))
    }
}

impl ModuleBehaviour for TextInput {
    fn type_name(&self) -> &'static str {
        "text_input"
    }

    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn config_schema(&self) -> Option<ConfigSchema> {
        Some(ConfigSchema::new().field("text", FieldKind::String))
    }

    fn process(&mut self, config: &ValueMap, _inputs: &ValueMap)
    -> std::result::Result<ValueMap, ProcessError> {
        let text = config
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let mut outputs = ValueMap::new();
        outputs.insert("text".to_string(), Value::String(text.to_string()));
        Ok(outputs)
    }
}
