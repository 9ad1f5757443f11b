// src/modules/logic.rs

//! Boolean logic over coerced inputs.

use serde_json::Value;

use crate::errors::{ProcessError, Result};
use crate::module::{ConfigSchema, FieldKind, ModuleBehaviour, PortSet, PortSpec};
use crate::value::{ValueMap, coerce_bool};

/// Applies the configured boolean operation to its inputs.
///
/// `op` is one of `and`, `or`, `xor`, `not`. Inputs are coerced the same
/// way the gate coerces its flag; an absent `b` counts as `false`.
pub struct Logic {
    ports: PortSet,
}

impl Logic {
    pub fn new() -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_input(PortSpec::new("a", "bool").required())?;
        ports.add_input(PortSpec::new("b", "bool"))?;
        ports.add_output(PortSpec::new("result", "bool"))?;
        Ok(Self { ports })
    }

    pub fn boxed() -> Result<Box<dyn ModuleBehaviour>> {
        Ok(Box::new(Self::new()?))
    }
}

impl ModuleBehaviour for Logic {
    fn type_name(&self) -> &'static str {
        "logic"
    }

    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn config_schema(&self) -> Option<ConfigSchema> {
        Some(ConfigSchema::new().required_field("op", FieldKind::String))
    }

    fn process(&mut self, config: &ValueMap, inputs: &ValueMap)
    -> std::result::Result<ValueMap, ProcessError> {
        let op = config
            .get("op")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let a = inputs.get("a").map(coerce_bool).unwrap_or(false);
        let b = inputs.get("b").map(coerce_bool).unwrap_or(false);

        let result = match op {
            "and" => a && b,
            "or" => a || b,
            "xor" => a ^ b,
            "not" => !a,
            other => {
                return Err(ProcessError::new(format!(
                    "unsupported logic op '{other}'"
                )));
            }
        };

        let mut outputs = ValueMap::new();
        outputs.insert("result".to_string(), Value::Bool(result));
        Ok(outputs)
    }
}
