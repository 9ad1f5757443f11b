#![allow(dead_code)]

use flowrun::errors::Result;
use flowrun::graph::{Connection, FlowGraph};
use flowrun::module::{ModuleBehaviour, ModuleNode};

/// Builder for [`FlowGraph`] to simplify test setup.
pub struct GraphBuilder {
    modules: Vec<ModuleNode>,
    connections: Vec<Connection>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn module(mut self, id: &str, behaviour: Box<dyn ModuleBehaviour>) -> Self {
        self.modules.push(ModuleNode::new(id, behaviour));
        self
    }

    /// Add a module with its configuration already applied.
    pub fn configured_module(
        mut self,
        id: &str,
        behaviour: Box<dyn ModuleBehaviour>,
        config: flowrun::value::ValueMap,
    ) -> Self {
        let mut node = ModuleNode::new(id, behaviour);
        node.configure(config)
            .expect("builder config must satisfy the behaviour's schema");
        self.modules.push(node);
        self
    }

    pub fn connect(
        mut self,
        source_module: &str,
        source_port: &str,
        target_module: &str,
        target_port: &str,
    ) -> Self {
        self.connections.push(Connection::new(
            source_module,
            source_port,
            target_module,
            target_port,
        ));
        self
    }

    pub fn build(self) -> FlowGraph {
        self.try_build().expect("Failed to build valid graph from builder")
    }

    pub fn try_build(self) -> Result<FlowGraph> {
        FlowGraph::build(self.modules, self.connections)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
