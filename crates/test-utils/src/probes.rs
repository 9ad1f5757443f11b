//! Probe behaviours for exercising the engine without real modules.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use flowrun::errors::{ProcessError, Result};
use flowrun::module::{Capabilities, ModuleBehaviour, PortSet, PortSpec};
use flowrun::value::ValueMap;

/// Shared log of values observed by [`RecordingProbe`]s.
pub type ValueLog = Arc<Mutex<Vec<Value>>>;

pub fn value_log() -> ValueLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Emits a fixed value on `out` every cycle.
pub struct SourceProbe {
    ports: PortSet,
    value: Value,
}

impl SourceProbe {
    pub fn new(value: Value) -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_output(PortSpec::new("out", "generic"))?;
        Ok(Self { ports, value })
    }

    pub fn boxed(value: Value) -> Box<dyn ModuleBehaviour> {
        Box::new(Self::new(value).expect("static ports"))
    }
}

impl ModuleBehaviour for SourceProbe {
    fn type_name(&self) -> &'static str {
        "source_probe"
    }

    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn process(&mut self, _config: &ValueMap, _inputs: &ValueMap)
    -> std::result::Result<ValueMap, ProcessError> {
        let mut outputs = ValueMap::new();
        outputs.insert("out".to_string(), self.value.clone());
        Ok(outputs)
    }
}

/// Records every value arriving on `in` and forwards it on `out`.
///
/// The input is required by default, so a recorder also doubles as a
/// "was this branch reached" check; `optional()` relaxes that.
pub struct RecordingProbe {
    ports: PortSet,
    log: ValueLog,
}

impl RecordingProbe {
    pub fn new(log: ValueLog) -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_input(PortSpec::new("in", "generic").required())?;
        ports.add_output(PortSpec::new("out", "generic"))?;
        Ok(Self { ports, log })
    }

    pub fn optional(log: ValueLog) -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_input(PortSpec::new("in", "generic"))?;
        ports.add_output(PortSpec::new("out", "generic"))?;
        Ok(Self { ports, log })
    }

    pub fn boxed(log: &ValueLog) -> Box<dyn ModuleBehaviour> {
        Box::new(Self::new(Arc::clone(log)).expect("static ports"))
    }

    pub fn boxed_optional(log: &ValueLog) -> Box<dyn ModuleBehaviour> {
        Box::new(Self::optional(Arc::clone(log)).expect("static ports"))
    }
}

impl ModuleBehaviour for RecordingProbe {
    fn type_name(&self) -> &'static str {
        "recording_probe"
    }

    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn process(&mut self, _config: &ValueMap, inputs: &ValueMap)
    -> std::result::Result<ValueMap, ProcessError> {
        let mut outputs = ValueMap::new();
        if let Some(value) = inputs.get("in") {
            self.log.lock().unwrap().push(value.clone());
            outputs.insert("out".to_string(), value.clone());
        }
        Ok(outputs)
    }
}

/// Fails every cycle with the given message.
pub struct FailingProbe {
    ports: PortSet,
    message: String,
}

impl FailingProbe {
    pub fn new(message: impl Into<String>) -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_input(PortSpec::new("in", "generic"))?;
        ports.add_output(PortSpec::new("out", "generic"))?;
        Ok(Self {
            ports,
            message: message.into(),
        })
    }

    pub fn boxed(message: &str) -> Box<dyn ModuleBehaviour> {
        Box::new(Self::new(message).expect("static ports"))
    }
}

impl ModuleBehaviour for FailingProbe {
    fn type_name(&self) -> &'static str {
        "failing_probe"
    }

    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn process(&mut self, _config: &ValueMap, _inputs: &ValueMap)
    -> std::result::Result<ValueMap, ProcessError> {
        Err(ProcessError::new(self.message.clone()))
    }
}

/// Adds its two required numeric inputs and emits the total on `sum`.
pub struct AdderProbe {
    ports: PortSet,
}

impl AdderProbe {
    pub fn new() -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_input(PortSpec::new("a", "number").required())?;
        ports.add_input(PortSpec::new("b", "number").required())?;
        ports.add_output(PortSpec::new("sum", "number"))?;
        Ok(Self { ports })
    }

    pub fn boxed() -> Box<dyn ModuleBehaviour> {
        Box::new(Self::new().expect("static ports"))
    }
}

impl ModuleBehaviour for AdderProbe {
    fn type_name(&self) -> &'static str {
        "adder_probe"
    }

    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn process(&mut self, _config: &ValueMap, inputs: &ValueMap)
    -> std::result::Result<ValueMap, ProcessError> {
        let num = |name: &str| {
            inputs
                .get(name)
                .and_then(Value::as_f64)
                .ok_or_else(|| ProcessError::new(format!("input '{name}' is not a number")))
        };
        let sum = num("a")? + num("b")?;
        let mut outputs = ValueMap::new();
        outputs.insert(
            "sum".to_string(),
            serde_json::Number::from_f64(sum)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        );
        Ok(outputs)
    }
}

/// Blocking passthrough: sleeps, then forwards `in` on `out`.
///
/// Declares `may_block`, so adaptive mode dispatches it concurrently.
pub struct BlockingProbe {
    ports: PortSet,
    sleep: Duration,
}

impl BlockingProbe {
    pub fn new(sleep: Duration) -> Result<Self> {
        let mut ports = PortSet::new();
        ports.add_input(PortSpec::new("in", "generic").required())?;
        ports.add_output(PortSpec::new("out", "generic"))?;
        Ok(Self { ports, sleep })
    }

    pub fn boxed(sleep: Duration) -> Box<dyn ModuleBehaviour> {
        Box::new(Self::new(sleep).expect("static ports"))
    }
}

impl ModuleBehaviour for BlockingProbe {
    fn type_name(&self) -> &'static str {
        "blocking_probe"
    }

    fn ports(&self) -> &PortSet {
        &self.ports
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new().may_block()
    }

    fn process(&mut self, _config: &ValueMap, inputs: &ValueMap)
    -> std::result::Result<ValueMap, ProcessError> {
        std::thread::sleep(self.sleep);
        let mut outputs = ValueMap::new();
        if let Some(value) = inputs.get("in") {
            outputs.insert("out".to_string(), value.clone());
        }
        Ok(outputs)
    }
}
