//! Iterative multi-level explosion of a single root.
//!
//! # Algorithm
//!
//! An explicit LIFO stack replaces recursion, so BOM depth is bounded by
//! heap, not by the call stack. Each frame carries the node, the cumulative
//! quantity along the path from the root, the depth, the immediate parent
//! and the quantity of the edge that led here.
//!
//! - **Leaf** (no successors): emit one [`ExplosionRecord`].
//! - **Internal**: push every child with `cumulative × edge_qty`. Internal
//!   nodes emit nothing.
//!
//! A root with no components yields a single self-referencing row.
//!
//! # Levels
//!
//! The root's direct children are level 0. A frame at depth `d > 0` is
//! reported at level `d - 1`; the root self-row is level 0.
//!
//! # Cost
//!
//! Work is proportional to the number of root→leaf paths, which can be
//! exponential in the node count for heavily shared sub-assemblies. Each
//! node's successor list is built once per walker and reused across paths
//! and roots.

use std::collections::HashMap;

use bomx_core::model::ExplosionRecord;
use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use crate::graph::build::BomGraph;
use crate::graph::cycles::ResolvedGraph;

// ---------------------------------------------------------------------------
// SuccessorCache
// ---------------------------------------------------------------------------

/// Per-node successor lists, filled lazily on first lookup.
///
/// Valid for the lifetime of one frozen graph; there is no invalidation.
#[derive(Debug, Default)]
pub struct SuccessorCache {
    entries: HashMap<NodeIndex, Vec<(NodeIndex, f64)>>,
    misses: usize,
}

impl SuccessorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Children of `node` with their edge quantities, sorted by child id.
    pub fn get(&mut self, graph: &BomGraph, node: NodeIndex) -> &[(NodeIndex, f64)] {
        let misses = &mut self.misses;
        self.entries.entry(node).or_insert_with(|| {
            *misses += 1;
            graph.successors(node)
        })
    }

    /// Number of distinct nodes looked up so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups that had to build a successor list.
    #[must_use]
    pub const fn misses(&self) -> usize {
        self.misses
    }
}

// ---------------------------------------------------------------------------
// ExplosionWalker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeIndex,
    cumulative: f64,
    depth: usize,
    parent: NodeIndex,
    edge_qty: f64,
}

/// Depth-first exploder over a [`ResolvedGraph`].
///
/// Holds one [`SuccessorCache`] shared by every root it explodes.
#[derive(Debug)]
pub struct ExplosionWalker<'g> {
    resolved: &'g ResolvedGraph,
    cache: SuccessorCache,
}

impl<'g> ExplosionWalker<'g> {
    #[must_use]
    pub fn new(resolved: &'g ResolvedGraph) -> Self {
        Self {
            resolved,
            cache: SuccessorCache::new(),
        }
    }

    /// The successor cache, for inspection.
    #[must_use]
    pub const fn cache(&self) -> &SuccessorCache {
        &self.cache
    }

    /// Explode `root` with the given multiplier.
    ///
    /// Returns leaf records with `order` still 0. Returns an empty list when
    /// `root` is not a node of the graph.
    #[instrument(skip(self))]
    pub fn explode(&mut self, root: &str, multiplier: f64) -> Vec<ExplosionRecord> {
        let resolved = self.resolved;
        let graph = resolved.graph();
        let Some(root_idx) = graph.node_index(root) else {
            debug!(root, "root is not in the BOM graph; skipping");
            return Vec::new();
        };

        let mut records = Vec::new();
        let mut stack = vec![Frame {
            node: root_idx,
            cumulative: multiplier,
            depth: 0,
            parent: root_idx,
            edge_qty: 1.0,
        }];

        while let Some(frame) = stack.pop() {
            let children = self.cache.get(graph, frame.node);

            if children.is_empty() {
                records.push(leaf_record(graph, root, frame));
                continue;
            }

            // Reverse push so children pop in id order.
            for &(child, qty) in children.iter().rev() {
                stack.push(Frame {
                    node: child,
                    cumulative: frame.cumulative * qty,
                    depth: frame.depth + 1,
                    parent: frame.node,
                    edge_qty: qty,
                });
            }
        }

        debug!(root, records = records.len(), "root exploded");
        records
    }
}

fn leaf_record(graph: &BomGraph, root: &str, frame: Frame) -> ExplosionRecord {
    let qty_per = if frame.node == frame.parent {
        1.0
    } else {
        frame.edge_qty
    };

    ExplosionRecord {
        order: 0,
        parent_item: root.to_string(),
        level: frame.depth.saturating_sub(1),
        parent_index: label(graph, frame.parent),
        component_item: label(graph, frame.node),
        qty_per,
        total_qty: frame.cumulative,
    }
}

fn label(graph: &BomGraph, idx: NodeIndex) -> String {
    graph.item_id(idx).unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::cycles::{CyclePolicy, resolve_cycles};
    use bomx_core::model::EdgeRow;

    fn resolved(edges: &[(&str, &str, f64)]) -> ResolvedGraph {
        let rows: Vec<EdgeRow> = edges
            .iter()
            .map(|&(p, c, q)| EdgeRow::new(p, c, q))
            .collect();
        resolve_cycles(BomGraph::build(&rows), CyclePolicy::default()).expect("resolve")
    }

    fn summary(records: &[ExplosionRecord]) -> Vec<(usize, &str, &str, f64, f64)> {
        records
            .iter()
            .map(|r| {
                (
                    r.level,
                    r.parent_index.as_str(),
                    r.component_item.as_str(),
                    r.qty_per,
                    r.total_qty,
                )
            })
            .collect()
    }

    #[test]
    fn two_level_bom_emits_leaves_only() {
        let g = resolved(&[("A", "B", 2.0), ("A", "C", 3.0), ("B", "D", 4.0), ("C", "E", 5.0)]);
        let records = ExplosionWalker::new(&g).explode("A", 1.0);

        assert_eq!(
            summary(&records),
            vec![(1, "B", "D", 4.0, 8.0), (1, "C", "E", 5.0, 15.0)]
        );
        assert!(records.iter().all(|r| r.parent_item == "A"));
        assert!(records.iter().all(|r| r.order == 0));
    }

    #[test]
    fn chain_yields_single_deep_record() {
        let g = resolved(&[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0)]);
        let records = ExplosionWalker::new(&g).explode("A", 1.0);
        assert_eq!(summary(&records), vec![(2, "C", "D", 1.0, 1.0)]);
    }

    #[test]
    fn direct_children_are_level_zero() {
        let g = resolved(&[("A", "B", 2.5)]);
        let records = ExplosionWalker::new(&g).explode("A", 1.0);
        assert_eq!(summary(&records), vec![(0, "A", "B", 2.5, 2.5)]);
    }

    #[test]
    fn leaf_root_yields_self_row() {
        let g = resolved(&[("A", "B", 2.0)]);
        let records = ExplosionWalker::new(&g).explode("B", 1.0);
        assert_eq!(summary(&records), vec![(0, "B", "B", 1.0, 1.0)]);
        assert_eq!(records[0].parent_item, "B");
    }

    #[test]
    fn multiplier_scales_totals() {
        let g = resolved(&[("A", "B", 2.0), ("B", "C", 3.0)]);
        let records = ExplosionWalker::new(&g).explode("A", 10.0);
        assert_eq!(summary(&records), vec![(1, "B", "C", 3.0, 60.0)]);
    }

    #[test]
    fn shared_subassembly_is_emitted_per_path() {
        // S is used by both B and C; its leaf appears once per path.
        let g = resolved(&[
            ("A", "B", 1.0),
            ("A", "C", 2.0),
            ("B", "S", 3.0),
            ("C", "S", 4.0),
            ("S", "L", 5.0),
        ]);
        let mut walker = ExplosionWalker::new(&g);
        let records = walker.explode("A", 1.0);

        assert_eq!(
            summary(&records),
            vec![(2, "S", "L", 5.0, 15.0), (2, "S", "L", 5.0, 40.0)]
        );
        // A, B, C, S, L each looked up once despite two paths through S.
        assert_eq!(walker.cache().len(), 5);
        assert_eq!(walker.cache().misses(), 5);
    }

    #[test]
    fn cache_is_reused_across_roots() {
        let g = resolved(&[("A", "S", 1.0), ("B", "S", 1.0), ("S", "L", 1.0)]);
        let mut walker = ExplosionWalker::new(&g);
        walker.explode("A", 1.0);
        let misses_after_first = walker.cache().misses();
        walker.explode("B", 1.0);
        assert_eq!(walker.cache().misses(), misses_after_first + 1, "only B is new");
    }

    #[test]
    fn unknown_root_yields_nothing() {
        let g = resolved(&[("A", "B", 1.0)]);
        assert!(ExplosionWalker::new(&g).explode("ZZZ", 1.0).is_empty());
    }

    #[test]
    fn explosion_uses_resolved_graph() {
        // B → C (qty 1) is severed, so B becomes a leaf under A.
        let g = resolved(&[("A", "B", 5.0), ("B", "C", 1.0), ("C", "A", 3.0)]);
        let records = ExplosionWalker::new(&g).explode("A", 1.0);
        assert_eq!(summary(&records), vec![(0, "A", "B", 5.0, 5.0)]);
    }
}
