// tests/property_layering.rs

//! Property test: layer derivation over random DAGs.

use std::collections::HashMap;

use flowrun_test_utils::builders::GraphBuilder;
use flowrun_test_utils::probes::{RecordingProbe, value_log};
use proptest::prelude::*;

// Strategy for a valid DAG: up to `max_modules` modules, edges sanitized
// so they only point from a lower index to a higher one.
fn dag_strategy(max_modules: usize) -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2..=max_modules).prop_flat_map(|n| {
        let edges = proptest::collection::vec((any::<usize>(), any::<usize>()), 0..n * 2);
        edges.prop_map(move |raw| {
            let mut edges = Vec::new();
            for (a, b) in raw {
                let (a, b) = (a % n, b % n);
                if a < b {
                    edges.push((a, b));
                } else if b < a {
                    edges.push((b, a));
                }
                // a == b dropped: self-edges are rejected by the builder.
            }
            (n, edges)
        })
    })
}

fn module_name(index: usize) -> String {
    format!("m{index:02}")
}

fn build_graph(n: usize, edges: &[(usize, usize)]) -> flowrun::graph::FlowGraph {
    let log = value_log();
    let mut builder = GraphBuilder::new();
    for i in 0..n {
        builder = builder.module(&module_name(i), RecordingProbe::boxed_optional(&log));
    }
    for (a, b) in edges {
        builder = builder.connect(&module_name(*a), "out", &module_name(*b), "in");
    }
    builder.build()
}

proptest! {
    #[test]
    fn layering_is_complete_ordered_and_stable(
        (n, edges) in dag_strategy(12),
    ) {
        let graph = build_graph(n, &edges);
        let layers = graph.layers();

        // Every module is placed exactly once.
        let mut layer_of: HashMap<&str, usize> = HashMap::new();
        for (index, layer) in layers.iter().enumerate() {
            for id in layer {
                prop_assert!(
                    layer_of.insert(id.as_str(), index).is_none(),
                    "module {id} placed twice"
                );
            }
        }
        prop_assert_eq!(layer_of.len(), n);

        // Every connection's source lies in a strictly earlier layer.
        for conn in graph.connections() {
            let src = layer_of[conn.source_module.as_str()];
            let dst = layer_of[conn.target_module.as_str()];
            prop_assert!(
                src < dst,
                "{} (layer {src}) must precede {} (layer {dst})",
                conn.source_module,
                conn.target_module
            );
        }

        // Intra-layer order is ascending module id.
        for layer in layers {
            let mut sorted = layer.clone();
            sorted.sort();
            prop_assert_eq!(&sorted, layer);
        }

        // Rebuilding the same graph yields the same layers.
        let again = build_graph(n, &edges);
        prop_assert_eq!(layers, again.layers());
    }
}
