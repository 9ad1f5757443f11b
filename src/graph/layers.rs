// src/graph/layers.rs

//! Deterministic layer derivation.
//!
//! Layers are levels of a Kahn-style topological ordering: layer 0 holds
//! every module with no incoming connection, layer k the modules whose
//! predecessors all sit in layers < k. Ties are broken by ascending module
//! id, so the same graph always yields the same layers in the same order.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{FlowError, Result};
use crate::types::ModuleId;

/// Derive execution layers from a dependency map.
///
/// `deps` must contain one entry per module (empty set when the module has
/// no predecessors). Fails with [`FlowError::GraphCycle`] when any module
/// cannot be placed; no partial layering is returned.
pub fn derive_layers(deps: &BTreeMap<ModuleId, BTreeSet<ModuleId>>) -> Result<Vec<Vec<ModuleId>>> {
    let mut layers: Vec<Vec<ModuleId>> = Vec::new();
    let mut placed: BTreeSet<&str> = BTreeSet::new();
    let mut remaining: BTreeSet<&str> = deps.keys().map(String::as_str).collect();

    while !remaining.is_empty() {
        // BTreeSet iteration gives ascending id order, which fixes the
        // intra-layer order as well as the tie-break between candidates.
        let ready: Vec<&str> = remaining
            .iter()
            .copied()
            .filter(|id| {
                deps[*id]
                    .iter()
                    .all(|dep| placed.contains(dep.as_str()))
            })
            .collect();

        if ready.is_empty() {
            // No progress possible: every remaining module waits on another
            // remaining module, i.e. a dependency cycle.
            let stuck = remaining.iter().next().expect("remaining is non-empty");
            return Err(FlowError::GraphCycle(format!(
                "module '{stuck}' cannot be placed in any layer"
            )));
        }

        for id in &ready {
            remaining.remove(*id);
            placed.insert(*id);
        }
        layers.push(ready.into_iter().map(str::to_string).collect());
    }

    Ok(layers)
}
