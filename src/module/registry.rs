// src/module/registry.rs

//! Explicit module type registry.
//!
//! The registry is a plain object constructed by the host at startup and
//! passed into graph building; there is no ambient discovery and no
//! registration as an import side effect. Factories are fallible so that a
//! behaviour whose port declarations are invalid (duplicate names) fails
//! its own registration without touching anything else.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::errors::{FlowError, Result};
use crate::module::{ModuleBehaviour, ModuleNode};
use crate::types::ModuleId;

type BehaviourFactory = Box<dyn Fn() -> Result<Box<dyn ModuleBehaviour>> + Send + Sync>;

#[derive(Default)]
pub struct ModuleRegistry {
    factories: BTreeMap<String, BehaviourFactory>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in utility behaviours.
    pub fn with_builtin_modules() -> Self {
        let mut registry = Self::new();
        crate::modules::register_builtin_modules(&mut registry);
        registry
    }

    /// Register a factory under a type name.
    ///
    /// Re-registering an existing name replaces the previous factory.
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn ModuleBehaviour>> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if self.factories.contains_key(&type_name) {
            warn!(type_name = %type_name, "replacing existing module type registration");
        }
        debug!(type_name = %type_name, "module type registered");
        self.factories.insert(type_name, Box::new(factory));
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, in sorted order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Create a module instance of the given type.
    pub fn instantiate(&self, type_name: &str, id: impl Into<ModuleId>) -> Result<ModuleNode> {
        let factory = self.factories.get(type_name).ok_or_else(|| {
            FlowError::GraphValidation(format!("unknown module type '{type_name}'"))
        })?;
        let behaviour = factory()?;
        Ok(ModuleNode::new(id, behaviour))
    }
}
