// src/modules/mod.rs

//! Built-in utility module behaviours.
//!
//! These are the small, device-free modules every pipeline tends to need:
//! a text source, a stdout sink, a blocking delay, boolean logic and a
//! boolean gate. Device-facing modules (cameras, inference, fieldbus IO)
//! live outside this crate and integrate through the same
//! [`ModuleBehaviour`](crate::module::ModuleBehaviour) contract.

pub mod bool_gate;
pub mod delay;
pub mod logic;
pub mod print;
pub mod text_input;

pub use bool_gate::BoolGate;
pub use delay::Delay;
pub use logic::Logic;
pub use print::Print;
pub use text_input::TextInput;

use crate::module::ModuleRegistry;

/// Register every built-in behaviour under its canonical type name.
pub fn register_builtin_modules(registry: &mut ModuleRegistry) {
    registry.register("text_input", TextInput::boxed);
    registry.register("print", Print::boxed);
    registry.register("delay", Delay::boxed);
    registry.register("logic", Logic::boxed);
    registry.register("bool_gate", BoolGate::boxed);
}
