// src/graph/flow.rs

//! The flow graph: modules plus directed port-to-port connections.
//!
//! A [`FlowGraph`] is immutable once built; structural edits require a
//! rebuild. Building validates every connection against the declared port
//! sets, rejects dependency cycles, and derives the execution layers once.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{FlowError, Result};
use crate::graph::layers::derive_layers;
use crate::module::ModuleNode;
use crate::types::ModuleId;

/// A directed edge from one module's output port to another module's input
/// port. Serde field names match the persisted pipeline document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source_module: ModuleId,
    pub source_port: String,
    pub target_module: ModuleId,
    pub target_port: String,
}

impl Connection {
    pub fn new(
        source_module: impl Into<ModuleId>,
        source_port: impl Into<String>,
        target_module: impl Into<ModuleId>,
        target_port: impl Into<String>,
    ) -> Self {
        Self {
            source_module: source_module.into(),
            source_port: source_port.into(),
            target_module: target_module.into(),
            target_port: target_port.into(),
        }
    }
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.source_module, self.source_port, self.target_module, self.target_port
        )
    }
}

/// Shared handle to one module's engine state.
///
/// Each cell is locked only by the context currently executing that module
/// (or by the single-threaded routing step), so contention never occurs in
/// practice; the mutex exists to let blocking-capable modules run on their
/// own dispatch contexts.
pub type ModuleCell = Arc<Mutex<ModuleNode>>;

/// Validated, layered set of modules and connections.
#[derive(Debug)]
pub struct FlowGraph {
    cells: BTreeMap<ModuleId, ModuleCell>,
    /// Connections in declaration order; routing applies them in this
    /// order, so the last connection into an input wins.
    connections: Vec<Connection>,
    layers: Vec<Vec<ModuleId>>,
    dependencies: BTreeMap<ModuleId, BTreeSet<ModuleId>>,
}

impl FlowGraph {
    /// Validate and build a graph from modules and connections.
    ///
    /// Fails with [`FlowError::GraphValidation`] when a connection
    /// references a missing module or port (or a port in the wrong
    /// direction), and with [`FlowError::GraphCycle`] when the dependency
    /// relation is not acyclic. Nothing is built on failure.
    pub fn build(modules: Vec<ModuleNode>, connections: Vec<Connection>) -> Result<Self> {
        let mut nodes: BTreeMap<ModuleId, ModuleNode> = BTreeMap::new();
        for module in modules {
            let id = module.id().clone();
            if nodes.insert(id.clone(), module).is_some() {
                return Err(FlowError::GraphValidation(format!(
                    "duplicate module id '{id}'"
                )));
            }
        }

        for conn in &connections {
            let source = nodes.get(&conn.source_module).ok_or_else(|| {
                FlowError::GraphValidation(format!(
                    "connection {conn}: unknown source module '{}'",
                    conn.source_module
                ))
            })?;
            if source.ports().output(&conn.source_port).is_none() {
                return Err(FlowError::GraphValidation(format!(
                    "connection {conn}: module '{}' has no output port '{}'",
                    conn.source_module, conn.source_port
                )));
            }
            let target = nodes.get(&conn.target_module).ok_or_else(|| {
                FlowError::GraphValidation(format!(
                    "connection {conn}: unknown target module '{}'",
                    conn.target_module
                ))
            })?;
            if target.ports().input(&conn.target_port).is_none() {
                return Err(FlowError::GraphValidation(format!(
                    "connection {conn}: module '{}' has no input port '{}'",
                    conn.target_module, conn.target_port
                )));
            }
        }

        // Dependency relation: target depends on source.
        let mut dependencies: BTreeMap<ModuleId, BTreeSet<ModuleId>> = nodes
            .keys()
            .map(|id| (id.clone(), BTreeSet::new()))
            .collect();
        for conn in &connections {
            if conn.source_module != conn.target_module {
                dependencies
                    .get_mut(&conn.target_module)
                    .expect("validated above")
                    .insert(conn.source_module.clone());
            } else {
                return Err(FlowError::GraphCycle(format!(
                    "module '{}' is connected to itself",
                    conn.source_module
                )));
            }
        }

        // Cross-check acyclicity with petgraph before layering; a failed
        // toposort names a module on the cycle.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for id in nodes.keys() {
            graph.add_node(id.as_str());
        }
        for conn in &connections {
            graph.add_edge(conn.source_module.as_str(), conn.target_module.as_str(), ());
        }
        if let Err(cycle) = toposort(&graph, None) {
            return Err(FlowError::GraphCycle(format!(
                "cycle involving module '{}'",
                cycle.node_id()
            )));
        }

        let layers = derive_layers(&dependencies)?;
        debug!(
            modules = nodes.len(),
            connections = connections.len(),
            layers = layers.len(),
            "flow graph built"
        );

        let cells = nodes
            .into_iter()
            .map(|(id, node)| (id, Arc::new(Mutex::new(node))))
            .collect();

        Ok(Self {
            cells,
            connections,
            layers,
            dependencies,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn module_ids(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn cell(&self, id: &str) -> Option<&ModuleCell> {
        self.cells.get(id)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Execution layers, derived once at build time.
    pub fn layers(&self) -> &[Vec<ModuleId>] {
        &self.layers
    }

    pub fn dependencies_of(&self, id: &str) -> Option<&BTreeSet<ModuleId>> {
        self.dependencies.get(id)
    }

    /// Run a closure over every module cell, in ascending id order.
    pub(crate) fn for_each_module<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut ModuleNode),
    {
        for (id, cell) in &self.cells {
            let mut node = cell.lock().map_err(|_| {
                FlowError::RuntimeExecutor(format!("module '{id}' state is poisoned"))
            })?;
            f(&mut node);
        }
        Ok(())
    }

    /// Snapshot of every module's current outputs, for result observers
    /// and mode-equivalence checks.
    pub fn output_snapshot(&self) -> Result<HashMap<ModuleId, crate::value::ValueMap>> {
        let mut snapshot = HashMap::new();
        for (id, cell) in &self.cells {
            let node = cell.lock().map_err(|_| {
                FlowError::RuntimeExecutor(format!("module '{id}' state is poisoned"))
            })?;
            snapshot.insert(id.clone(), node.current_outputs().clone());
        }
        Ok(snapshot)
    }
}
