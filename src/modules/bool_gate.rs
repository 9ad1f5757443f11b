// src/modules/bool_gate.rs

//! Boolean gate for conditional branches.

use serde_json::Value;

use crate::errors::{ProcessError, Result};
use crate::module::{ModuleBehaviour, PortSet, PortSpec};
use crate::value::{ValueMap, coerce_bool};

/// Passes its branch only when `flag` coerces to true.
///
/// When the gate is open it emits `passed = true` and the final flag on
/// `flag_out`. When closed it emits nothing at all: downstream modules
/// with a required input simply skip their cycle, so only the gated
/// branch stalls and independent branches keep running. The optional
/// `invert` input flips the flag before the decision.
pub struct BoolGate {
    ports: PortSet,
}

impl BoolGate {
    pub fn new() -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_input(PortSpec::new("flag", "bool").required().describe("gate condition"))?;
        ports.add_input(PortSpec::new("invert", "bool").describe("flip the flag"))?;
        ports.add_output(PortSpec::new("passed", "bool"))?;
        ports.add_output(PortSpec::new("flag_out", "bool"))?;
        Ok(Self { ports })
    }

    pub fn boxed() -> Result<Box<dyn ModuleBehaviour>> {
        Ok(Box::new(Self::new()?))
    }
}

impl ModuleBehaviour for BoolGate {
    fn type_name(&self) -> &'static str {
        "bool_gate"
    }

    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn process(&mut self, _config: &ValueMap, inputs: &ValueMap)
    -> std::result::Result<ValueMap, ProcessError> {
        let mut flag = inputs.get("flag").map(coerce_bool).unwrap_or(false);
        if inputs.get("invert").map(coerce_bool).unwrap_or(false) {
            flag = !flag;
        }

        let mut outputs = ValueMap::new();
        if flag {
            outputs.insert("passed".to_string(), Value::Bool(true));
            outputs.insert("flag_out".to_string(), Value::Bool(flag));
        }
        Ok(outputs)
    }
}
