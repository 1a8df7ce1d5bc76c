//! Structural statistics for a BOM graph.
//!
//! # Statistics Provided
//!
//! - **node_count** / **edge_count**: items and distinct parent/child pairs.
//! - **density**: `edge_count / (node_count * (node_count - 1))`; 0.0 for
//!   graphs with fewer than two nodes.
//! - **source_count**: items nothing consumes (candidate top-level outputs).
//! - **leaf_count**: items with no components (purchased parts, raw material).
//! - **cyclic_component_count**: SCCs with more than one member, plus
//!   self-loops. Counted on the graph as built, before cycle resolution.
//! - **max_in_degree**: most parents sharing one component.
//! - **max_out_degree**: widest single-level BOM.
//! - **longest_chain**: edges on the longest parent→child path, once the
//!   graph is acyclic. `None` while cycles remain.
//! - **removed_edge_count**: edges severed by the cycle resolver.
//! - **resolution_passes**: detect/sever passes the resolver needed.
//! - **content_hash**: BLAKE3 hash of the deduplicated edge set.

use petgraph::{
    Direction,
    algo::{tarjan_scc, toposort},
    graph::DiGraph,
    visit::IntoNodeIdentifiers,
};
use serde::Serialize;

use crate::graph::build::BomGraph;
use crate::graph::cycles::ResolvedGraph;

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a BOM graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub source_count: usize,
    pub leaf_count: usize,
    pub cyclic_component_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    /// Longest parent→child path in edges. `None` while the graph is cyclic.
    pub longest_chain: Option<usize>,
    pub removed_edge_count: usize,
    pub resolution_passes: usize,
    pub content_hash: String,
}

impl GraphStats {
    /// Compute statistics from a graph as built.
    #[must_use]
    pub fn from_graph(bom: &BomGraph) -> Self {
        let graph = &bom.graph;
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        let source_count = graph
            .node_identifiers()
            .filter(|&idx| degree(graph, idx, Direction::Incoming) == 0)
            .count();
        let leaf_count = graph
            .node_identifiers()
            .filter(|&idx| degree(graph, idx, Direction::Outgoing) == 0)
            .count();

        let cyclic_component_count = tarjan_scc(graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.first().is_some_and(|&n| graph.find_edge(n, n).is_some())
            })
            .count();

        let max_in_degree = graph
            .node_identifiers()
            .map(|idx| degree(graph, idx, Direction::Incoming))
            .max()
            .unwrap_or(0);
        let max_out_degree = graph
            .node_identifiers()
            .map(|idx| degree(graph, idx, Direction::Outgoing))
            .max()
            .unwrap_or(0);

        Self {
            node_count,
            edge_count,
            density: compute_density(node_count, edge_count),
            source_count,
            leaf_count,
            cyclic_component_count,
            max_in_degree,
            max_out_degree,
            longest_chain: longest_chain(graph),
            removed_edge_count: 0,
            resolution_passes: 0,
            content_hash: bom.content_hash.clone(),
        }
    }

    /// Fill in the post-resolution fields from `resolved`.
    #[must_use]
    pub fn with_resolution(mut self, resolved: &ResolvedGraph) -> Self {
        self.longest_chain = longest_chain(&resolved.graph().graph);
        self.removed_edge_count = resolved.removed().len();
        self.resolution_passes = resolved.passes();
        self
    }

    /// Return `true` if the graph has no edges.
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        self.edge_count == 0
    }

    /// Return `true` if the graph as built contained at least one cycle.
    #[must_use]
    pub const fn has_cycles(&self) -> bool {
        self.cyclic_component_count > 0
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn degree(
    graph: &DiGraph<String, f64>,
    idx: petgraph::graph::NodeIndex,
    dir: Direction,
) -> usize {
    graph.neighbors_directed(idx, dir).count()
}

/// Longest path length in edges, by dynamic programming over a topological
/// order. `None` if the graph is cyclic.
fn longest_chain(graph: &DiGraph<String, f64>) -> Option<usize> {
    let order = toposort(graph, None).ok()?;
    let mut depth = vec![0usize; graph.node_count()];
    let mut longest = 0usize;

    for idx in order {
        let here = depth[idx.index()];
        longest = longest.max(here);
        for child in graph.neighbors_directed(idx, Direction::Outgoing) {
            let slot = &mut depth[child.index()];
            *slot = (*slot).max(here + 1);
        }
    }
    Some(longest)
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
