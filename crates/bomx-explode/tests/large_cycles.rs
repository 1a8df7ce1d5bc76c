//! Cycle resolution on large, tangled BOMs.
//!
//! Random graphs with a few thousand items form one giant strongly connected
//! component, and a complete digraph needs about one pass per member. The
//! default policy has no pass cap, so both must come back acyclic with every
//! input edge either kept or logged as removed.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bomx_core::model::EdgeRow;
use bomx_explode::graph::{BomGraph, CyclePolicy, resolve_cycles};

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// `nodes` items, each with up to `fanout` random components. Self-loops
/// and repeated pairs are skipped.
fn random_bom(seed: u64, nodes: usize, fanout: usize) -> Vec<EdgeRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut rows = Vec::with_capacity(nodes * fanout);

    for parent in 0..nodes {
        for _ in 0..fanout {
            let child = rng.gen_range(0..nodes);
            if child == parent || !seen.insert((parent, child)) {
                continue;
            }
            let qty = f64::from(rng.gen_range(1u32..=50)) / 10.0;
            rows.push(EdgeRow::new(format!("N{parent}"), format!("N{child}"), qty));
        }
    }
    rows
}

fn complete_bom(nodes: usize) -> Vec<EdgeRow> {
    let mut rows = Vec::with_capacity(nodes * nodes);
    for parent in 0..nodes {
        for child in 0..nodes {
            if parent != child {
                #[allow(clippy::cast_precision_loss)]
                let qty = ((parent * 31 + child * 17) % 23 + 1) as f64;
                rows.push(EdgeRow::new(format!("K{parent}"), format!("K{child}"), qty));
            }
        }
    }
    rows
}

fn assert_fully_resolved(rows: &[EdgeRow]) {
    let graph = BomGraph::build(rows);
    let edges = graph.edge_count();
    assert!(graph.is_cyclic(), "fixture must start cyclic");

    let resolved = resolve_cycles(graph, CyclePolicy::default())
        .unwrap_or_else(|err| panic!("tolerant resolution failed: {err}"));

    assert!(!resolved.graph().is_cyclic());
    assert!(resolved.passes() >= 1);
    assert!(resolved.passes() <= resolved.removed().len());
    assert_eq!(
        resolved.graph().edge_count() + resolved.removed().len(),
        edges,
        "every edge is either kept or logged as removed"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn random_bom_with_two_thousand_items_resolves() {
    assert_fully_resolved(&random_bom(7, 2000, 4));
}

#[test]
fn random_bom_with_wide_fanout_resolves() {
    assert_fully_resolved(&random_bom(11, 1200, 6));
}

#[test]
fn complete_digraph_of_seventy_items_resolves() {
    assert_fully_resolved(&complete_bom(70));
}

#[test]
fn same_seed_removes_same_edges() {
    let rows = random_bom(7, 500, 4);
    let first = resolve_cycles(BomGraph::build(&rows), CyclePolicy::default()).expect("resolve");
    let second = resolve_cycles(BomGraph::build(&rows), CyclePolicy::default()).expect("resolve");
    assert_eq!(first.removed(), second.removed());
    assert_eq!(first.passes(), second.passes());
}
