//! Weighted BOM graph construction from raw edge rows.
//!
//! # Edge Direction
//!
//! An edge `P → C` with weight `q` means "one unit of P consumes `q` units
//! of C". Traversal always runs parent to child.
//!
//! ## Deduplication
//!
//! Rows with a non-positive (or non-finite) quantity are dropped first.
//! Surviving rows with the same `(parent, child)` pair are summed: several
//! BOM lines for one pair are additive consumption. The graph then holds
//! exactly one edge per distinct pair.
//!
//! ## Cache Invalidation
//!
//! The graph carries a BLAKE3 hash of the sorted, summed edge list. Two runs
//! with equal hashes exploded the same BOM.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use bomx_core::model::EdgeRow;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, info, instrument};

// ---------------------------------------------------------------------------
// BomGraph
// ---------------------------------------------------------------------------

/// A directed, weighted BOM graph.
///
/// Nodes are item ids. Edge weights are summed `qty_per` values, always
/// strictly positive. The graph may still contain cycles; see
/// [`crate::graph::cycles::resolve_cycles`].
#[derive(Debug, Clone)]
pub struct BomGraph {
    /// Directed graph: nodes = item ids, edges = consumption quantities.
    pub graph: DiGraph<String, f64>,
    /// Mapping from item id to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// BLAKE3 content hash of the deduplicated edge set.
    pub content_hash: String,
}

impl BomGraph {
    /// Build a [`BomGraph`] from raw edge rows in arbitrary order.
    ///
    /// Nodes are inserted in sorted `(parent, child)` edge order, so two
    /// builds from the same rows in different order produce identical
    /// graphs. No surviving edge yields an empty graph.
    #[must_use]
    #[instrument(skip(rows), fields(rows = rows.len()))]
    pub fn build(rows: &[EdgeRow]) -> Self {
        let mut summed: BTreeMap<(&str, &str), f64> = BTreeMap::new();
        let mut dropped = 0usize;

        for row in rows {
            if row.qty > 0.0 && row.qty.is_finite() {
                *summed
                    .entry((row.parent.as_str(), row.child.as_str()))
                    .or_insert(0.0) += row.qty;
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            debug!(dropped, "dropped BOM lines with non-positive quantity");
        }

        let content_hash = compute_edge_hash(&summed);

        let mut graph = DiGraph::<String, f64>::with_capacity(summed.len(), summed.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();

        for ((parent, child), qty) in summed {
            let parent_idx = *node_map
                .entry(parent.to_string())
                .or_insert_with(|| graph.add_node(parent.to_string()));
            let child_idx = *node_map
                .entry(child.to_string())
                .or_insert_with(|| graph.add_node(child.to_string()));
            graph.add_edge(parent_idx, child_idx, qty);
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "BOM graph built"
        );

        Self {
            graph,
            node_map,
            content_hash,
        }
    }

    /// Return the number of nodes (items) in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges (distinct parent/child pairs) in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for an item id.
    #[must_use]
    pub fn node_index(&self, item_id: &str) -> Option<NodeIndex> {
        self.node_map.get(item_id).copied()
    }

    /// Return `true` if `item_id` appears as a parent or child of any edge.
    #[must_use]
    pub fn contains(&self, item_id: &str) -> bool {
        self.node_map.contains_key(item_id)
    }

    /// Return the item id label for a node.
    #[must_use]
    pub fn item_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// Return the summed quantity of `parent → child`, if that edge exists.
    #[must_use]
    pub fn edge_qty(&self, parent: &str, child: &str) -> Option<f64> {
        let from = self.node_index(parent)?;
        let to = self.node_index(child)?;
        self.graph
            .find_edge(from, to)
            .and_then(|edge| self.graph.edge_weight(edge).copied())
    }

    /// Children of `idx` with their edge quantities, sorted by child id.
    #[must_use]
    pub fn successors(&self, idx: NodeIndex) -> Vec<(NodeIndex, f64)> {
        let mut children: Vec<(NodeIndex, f64)> = self
            .graph
            .edges(idx)
            .map(|edge| (edge.target(), *edge.weight()))
            .collect();
        children.sort_by(|a, b| self.graph[a.0].cmp(&self.graph[b.0]));
        children
    }

    /// Remove the edge `tail → head`, returning the quantity it carried.
    ///
    /// Node indices stay valid; only edge indices may shift.
    pub fn remove_edge(&mut self, tail: NodeIndex, head: NodeIndex) -> Option<f64> {
        let edge = self.graph.find_edge(tail, head)?;
        self.graph.remove_edge(edge)
    }

    /// Return `true` if the graph contains at least one directed cycle.
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Compute a BLAKE3 hash of the sorted, summed edge list.
fn compute_edge_hash(edges: &BTreeMap<(&str, &str), f64>) -> String {
    let mut hasher = blake3::Hasher::new();
    for ((parent, child), qty) in edges {
        hasher.update(parent.as_bytes());
        hasher.update(b"\x00");
        hasher.update(child.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&qty.to_bits().to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(edges: &[(&str, &str, f64)]) -> Vec<EdgeRow> {
        edges
            .iter()
            .map(|&(p, c, q)| EdgeRow::new(p, c, q))
            .collect()
    }

    #[test]
    fn empty_input_produces_empty_graph() {
        let graph = BomGraph::build(&[]);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        // Hash of empty edge set is stable.
        assert!(graph.content_hash.starts_with("blake3:"));
        assert_eq!(graph.content_hash, BomGraph::build(&[]).content_hash);
    }

    #[test]
    fn one_edge_per_distinct_row_with_quantity_preserved() {
        let graph = BomGraph::build(&rows(&[("A", "B", 2.0), ("A", "C", 3.0), ("B", "D", 4.0)]));
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edge_qty("A", "B"), Some(2.0));
        assert_eq!(graph.edge_qty("A", "C"), Some(3.0));
        assert_eq!(graph.edge_qty("B", "D"), Some(4.0));
    }

    #[test]
    fn duplicate_pairs_are_summed() {
        let graph = BomGraph::build(&rows(&[("P", "C", 2.0), ("P", "C", 3.0)]));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_qty("P", "C"), Some(5.0));
    }

    #[test]
    fn non_positive_rows_are_dropped_before_summing() {
        let graph = BomGraph::build(&rows(&[
            ("A", "B", 0.0),
            ("A", "C", 2.0),
            ("A", "C", -1.0),
            ("A", "D", f64::NAN),
        ]));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_qty("A", "C"), Some(2.0));
        assert!(!graph.contains("B"), "zero-qty child must not become a node");
        assert!(!graph.contains("D"));
    }

    #[test]
    fn all_zero_input_yields_empty_graph() {
        let graph = BomGraph::build(&rows(&[("A", "B", 0.0)]));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn build_is_order_independent() {
        let forward = BomGraph::build(&rows(&[("A", "B", 1.0), ("B", "C", 2.0)]));
        let backward = BomGraph::build(&rows(&[("B", "C", 2.0), ("A", "B", 1.0)]));
        assert_eq!(forward.content_hash, backward.content_hash);
        assert_eq!(forward.item_id(NodeIndex::new(0)), backward.item_id(NodeIndex::new(0)));
    }

    #[test]
    fn content_hash_tracks_quantities() {
        let one = BomGraph::build(&rows(&[("A", "B", 1.0)]));
        let two = BomGraph::build(&rows(&[("A", "B", 2.0)]));
        assert_ne!(one.content_hash, two.content_hash, "hash must change with qty");
    }

    #[test]
    fn successors_are_sorted_by_child_id() {
        let graph = BomGraph::build(&rows(&[("A", "Z", 1.0), ("A", "M", 2.0), ("A", "B", 3.0)]));
        let a = graph.node_index("A").expect("A node");
        let names: Vec<&str> = graph
            .successors(a)
            .into_iter()
            .filter_map(|(idx, _)| graph.item_id(idx))
            .collect();
        assert_eq!(names, vec!["B", "M", "Z"]);
    }

    #[test]
    fn remove_edge_returns_weight_and_keeps_nodes() {
        let mut graph = BomGraph::build(&rows(&[("A", "B", 1.5), ("B", "A", 0.5)]));
        assert!(graph.is_cyclic());
        let a = graph.node_index("A").expect("A");
        let b = graph.node_index("B").expect("B");

        assert_eq!(graph.remove_edge(b, a), Some(0.5));
        assert_eq!(graph.remove_edge(b, a), None);
        assert!(!graph.is_cyclic());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_qty("A", "B"), Some(1.5));
    }
}
