// src/module/behaviour.rs

//! The behaviour contract implemented by every module type.

use crate::errors::ProcessError;
use crate::module::capabilities::Capabilities;
use crate::module::config::ConfigSchema;
use crate::module::port::PortSet;
use crate::value::ValueMap;

/// A module's processing logic and static declarations.
///
/// Implementations declare their ports once at construction time and keep
/// all engine-facing state (status, buffers, error log) out of the
/// behaviour: that state is owned by the wrapping
/// [`ModuleNode`](crate::module::ModuleNode).
///
/// `process` receives the committed configuration plus the inputs delivered
/// for this cycle and returns the outputs to publish. Returning an empty
/// map is valid and means "no output this cycle". Errors are returned as
/// values; they are caught at the module boundary and never abort the
/// cycle for other modules.
pub trait ModuleBehaviour: Send {
    /// Registry key of this module type.
    fn type_name(&self) -> &'static str;

    /// Declared input/output ports.
    fn ports(&self) -> &PortSet;

    /// Static capability descriptor. Only `may_block` affects scheduling.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Declared configuration schema, if any. With no schema every
    /// configuration delta is accepted as-is.
    fn config_schema(&self) -> Option<ConfigSchema> {
        None
    }

    /// One processing step over this cycle's inputs.
    fn process(&mut self, config: &ValueMap, inputs: &ValueMap)
    -> Result<ValueMap, ProcessError>;

    /// Called after a configuration delta has been validated and committed.
    fn on_configure(&mut self, _config: &ValueMap) {}

    fn on_start(&mut self) {}

    fn on_stop(&mut self) {}

    fn on_pause(&mut self) {}

    fn on_resume(&mut self) {}

    fn on_reset(&mut self) {}
}
