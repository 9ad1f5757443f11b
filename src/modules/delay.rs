// src/modules/delay.rs

//! Blocking passthrough delay.

use std::time::Duration;

use serde_json::Value;

use crate::errors::{ProcessError, Result};
use crate::module::{
    Capabilities, ConfigSchema, FieldKind, ModuleBehaviour, PortSet, PortSpec,
};
use crate::value::ValueMap;

/// Sleeps for the configured number of milliseconds, then forwards its
/// input unchanged.
///
/// Declares `may_block`, so in adaptive mode several delays in the same
/// layer overlap their wait time instead of queueing behind each other.
pub struct Delay {
    ports: PortSet,
}

impl Delay {
    pub fn new() -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_input(PortSpec::new("in", "generic").required())?;
        ports.add_output(PortSpec::new("out", "generic"))?;
        Ok(Self { ports })
    }

    pub fn boxed() -> Result<Box<dyn ModuleBehaviour>> {
        Ok(Box::new(Self::new()?))
    }
}

impl ModuleBehaviour for Delay {
    fn type_name(&self) -> &'static str {
        "delay"
    }

    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new().may_block()
    }

    fn config_schema(&self) -> Option<ConfigSchema> {
        Some(ConfigSchema::new().field("millis", FieldKind::Integer))
    }

    fn process(&mut self, config: &ValueMap, inputs: &ValueMap)
    -> std::result::Result<ValueMap, ProcessError> {
        let millis = config.get("millis").and_then(Value::as_u64).unwrap_or(0);
        if millis > 0 {
            std::thread::sleep(Duration::from_millis(millis));
        }

        let mut outputs = ValueMap::new();
        if let Some(value) = inputs.get("in") {
            outputs.insert("out".to_string(), value.clone());
        }
        Ok(outputs)
    }
}
