// src/modules/print.rs

//! Stdout sink.

use serde_json::Value;

use crate::errors::{ProcessError, Result};
use crate::module::{ModuleBehaviour, PortSet, PortSpec};
use crate::value::ValueMap;

/// Prints whatever arrives on `value` to stdout.
///
/// Logging goes to stderr, so pipeline output stays clean on stdout. With
/// no value delivered this cycle the module runs and prints nothing.
pub struct Print {
    ports: PortSet,
}

impl Print {
    pub fn new() -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_input(PortSpec::new("value", "generic").describe("value to print"))?;
        Ok(Self { ports })
    }

    pub fn boxed() -> Result<Box<dyn ModuleBehaviour>> {
        Ok(Box::new(Self::new()?))
    }
}

impl ModuleBehaviour for Print {
    fn type_name(&self) -> &'static str {
        "print"
    }

    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn process(&mut self, _config: &ValueMap, inputs: &ValueMap)
    -> std::result::Result<ValueMap, ProcessError> {
        if let Some(value) = inputs.get("value") {
            match value {
                Value::String(s) => println!("{s}"),
                other => println!("{other}"),
            }
        }
        Ok(ValueMap::new())
    }
}
