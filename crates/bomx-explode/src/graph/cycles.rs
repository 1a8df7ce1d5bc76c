//! Cycle detection and minimum-edge cycle breaking for BOM graphs.
//!
//! # Policy
//!
//! Every detected cycle loses exactly one edge: the arc with the smallest
//! quantity among the cycle's arcs, i.e. the smallest material flow. Ties go
//! to the first arc in cycle order. Cycles already broken by an earlier
//! removal in the same pass are skipped.
//!
//! After each pass the graph is re-checked. Overlapping cycles that one
//! enumeration did not capture are picked up by the next pass. The first
//! cycle of a pass is always intact, so every pass removes at least one edge
//! and the loop ends within `edge_count` passes. Dense components need
//! roughly one pass per member.
//!
//! A pass that removes nothing while cycles remain, or exceeding an explicit
//! `max_passes` cap, is an [`BomError::UnresolvableCycle`]; a cyclic graph is
//! never handed to the walker.
//!
//! # Determinism
//!
//! Components, DFS start nodes and successors are all visited in item-id
//! order, so the same BOM always loses the same edges.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};

use bomx_core::config::CycleConfig;
use bomx_core::error::BomError;
use bomx_core::model::RemovedEdge;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{info, instrument, warn};

use crate::graph::build::BomGraph;

// ---------------------------------------------------------------------------
// Cycle enumeration
// ---------------------------------------------------------------------------

/// Find cycles in `graph` as closed node sequences (`first == last`).
///
/// Runs Tarjan's SCC to locate cyclic components (including self-loops),
/// then an iterative DFS inside each component. Every back-edge to a node on
/// the current DFS path yields one elementary cycle. This does not list
/// every simple cycle of a dense component, but each component with a cycle
/// yields at least one, which is all the resolver needs per pass.
#[must_use]
pub fn find_cycles(graph: &DiGraph<String, f64>) -> Vec<Vec<NodeIndex>> {
    let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || component.first().is_some_and(|node| has_self_loop(graph, *node))
        })
        .map(|mut component| {
            component.sort_by(|a, b| graph[*a].cmp(&graph[*b]));
            component
        })
        .collect();
    components.sort_by(|a, b| graph[a[0]].cmp(&graph[b[0]]));

    let mut cycles = Vec::new();
    for component in &components {
        extract_component_cycles(graph, component, &mut cycles);
    }
    cycles
}

/// Find cycles and render them as item-id sequences, for error reporting.
#[must_use]
pub fn find_cycle_ids(graph: &DiGraph<String, f64>) -> Vec<Vec<String>> {
    find_cycles(graph)
        .into_iter()
        .map(|cycle| cycle.into_iter().map(|idx| node_id(graph, idx)).collect())
        .collect()
}

fn extract_component_cycles(
    graph: &DiGraph<String, f64>,
    component: &[NodeIndex],
    cycles: &mut Vec<Vec<NodeIndex>>,
) {
    let members: HashSet<NodeIndex> = component.iter().copied().collect();
    let mut finished: HashSet<NodeIndex> = HashSet::new();

    for &start in component {
        if finished.contains(&start) {
            continue;
        }

        let mut path: Vec<NodeIndex> = vec![start];
        // Position of each node on the current path.
        let mut on_path: HashMap<NodeIndex, usize> = HashMap::from([(start, 0)]);
        // Each frame: (node, its in-component successors, next successor to try).
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> =
            vec![(start, member_successors(graph, start, &members), 0)];

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;

            if frame.2 >= frame.1.len() {
                stack.pop();
                path.pop();
                on_path.remove(&node);
                finished.insert(node);
                continue;
            }

            let child = frame.1[frame.2];
            frame.2 += 1;

            if let Some(&pos) = on_path.get(&child) {
                let mut cycle = path[pos..].to_vec();
                cycle.push(child);
                cycles.push(cycle);
                continue;
            }

            if finished.contains(&child) {
                continue;
            }

            on_path.insert(child, path.len());
            path.push(child);
            stack.push((child, member_successors(graph, child, &members), 0));
        }
    }
}

fn member_successors(
    graph: &DiGraph<String, f64>,
    node: NodeIndex,
    members: &HashSet<NodeIndex>,
) -> Vec<NodeIndex> {
    let mut next: Vec<NodeIndex> = graph
        .neighbors(node)
        .filter(|n| members.contains(n))
        .collect();
    next.sort_by(|a, b| graph[*a].cmp(&graph[*b]));
    next.dedup();
    next
}

fn has_self_loop(graph: &DiGraph<String, f64>, node: NodeIndex) -> bool {
    graph.find_edge(node, node).is_some()
}

fn node_id(graph: &DiGraph<String, f64>, idx: NodeIndex) -> String {
    graph
        .node_weight(idx)
        .cloned()
        .unwrap_or_else(|| format!("#{}", idx.index()))
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// How the resolver treats cyclic input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePolicy {
    /// Sever cycles instead of failing.
    pub tolerate: bool,
    /// Optional cap on detect/sever passes. `None` runs until acyclic.
    pub max_passes: Option<usize>,
}

impl Default for CyclePolicy {
    fn default() -> Self {
        Self {
            tolerate: true,
            max_passes: None,
        }
    }
}

impl From<&CycleConfig> for CyclePolicy {
    fn from(config: &CycleConfig) -> Self {
        Self {
            tolerate: config.tolerate,
            max_passes: config.max_passes.map(|cap| cap.max(1)),
        }
    }
}

/// A BOM graph proven acyclic by [`resolve_cycles`].
///
/// This is the only way to obtain a graph the explosion walker accepts.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    graph: BomGraph,
    removed: Vec<RemovedEdge>,
    cycles_found: usize,
    passes: usize,
}

impl ResolvedGraph {
    /// The acyclic graph.
    #[must_use]
    pub const fn graph(&self) -> &BomGraph {
        &self.graph
    }

    /// Edges severed to break cycles, in processing order.
    #[must_use]
    pub fn removed(&self) -> &[RemovedEdge] {
        &self.removed
    }

    /// Number of cycles detected in the first pass (0 for acyclic input).
    #[must_use]
    pub const fn cycles_found(&self) -> usize {
        self.cycles_found
    }

    /// Number of detect/sever passes that ran (0 for acyclic input).
    #[must_use]
    pub const fn passes(&self) -> usize {
        self.passes
    }

    /// Split into the graph and the removal log.
    #[must_use]
    pub fn into_parts(self) -> (BomGraph, Vec<RemovedEdge>) {
        (self.graph, self.removed)
    }
}

/// Make `graph` acyclic according to `policy`.
///
/// # Errors
///
/// - [`BomError::CyclicGraph`] if cycles exist and `policy.tolerate` is false.
/// - [`BomError::UnresolvableCycle`] if the graph is still cyclic after a
///   pass that removed nothing, or after `policy.max_passes` passes when a
///   cap is set.
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn resolve_cycles(mut graph: BomGraph, policy: CyclePolicy) -> Result<ResolvedGraph, BomError> {
    if !graph.is_cyclic() {
        info!("BOM graph is acyclic");
        return Ok(ResolvedGraph {
            graph,
            removed: Vec::new(),
            cycles_found: 0,
            passes: 0,
        });
    }

    let mut cycles = find_cycles(&graph.graph);
    let cycles_found = cycles.len();

    if !policy.tolerate {
        return Err(BomError::CyclicGraph {
            cycles: to_ids(&graph.graph, &cycles),
        });
    }

    let mut removed: Vec<RemovedEdge> = Vec::new();
    let mut passes = 0usize;

    loop {
        passes += 1;
        let before = removed.len();

        for cycle in &cycles {
            if let Some(edge) = sever_weakest_arc(&mut graph, cycle) {
                removed.push(edge);
            }
        }

        if !graph.is_cyclic() {
            break;
        }

        let capped = policy.max_passes.is_some_and(|cap| passes >= cap);
        if removed.len() == before || capped {
            return Err(BomError::UnresolvableCycle {
                passes,
                remaining: find_cycle_ids(&graph.graph),
            });
        }

        cycles = find_cycles(&graph.graph);
    }

    warn!(
        cycles = cycles_found,
        removed = removed.len(),
        passes,
        "detected BOM cycles; severed minimum-quantity edges"
    );
    for edge in &removed {
        warn!(tail = %edge.tail, head = %edge.head, qty_per = edge.qty_per, "removed cycle edge");
    }
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "cycle-free BOM graph"
    );

    Ok(ResolvedGraph {
        graph,
        removed,
        cycles_found,
        passes,
    })
}

/// Remove the minimum-quantity arc of `cycle`.
///
/// Returns `None` when the cycle is already broken, i.e. one of its arcs
/// was removed earlier in the pass.
fn sever_weakest_arc(graph: &mut BomGraph, cycle: &[NodeIndex]) -> Option<RemovedEdge> {
    let mut weakest: Option<(NodeIndex, NodeIndex, f64)> = None;

    for arc in cycle.windows(2) {
        let (tail, head) = (arc[0], arc[1]);
        let edge = graph.graph.find_edge(tail, head)?;
        let qty = graph.graph[edge];
        // Strict comparison keeps the first arc on ties.
        if weakest.is_none_or(|(_, _, best)| qty < best) {
            weakest = Some((tail, head, qty));
        }
    }

    let (tail, head, _) = weakest?;
    let qty_per = graph.remove_edge(tail, head)?;

    Some(RemovedEdge {
        tail: node_id(&graph.graph, tail),
        head: node_id(&graph.graph, head),
        qty_per,
    })
}

fn to_ids(graph: &DiGraph<String, f64>, cycles: &[Vec<NodeIndex>]) -> Vec<Vec<String>> {
    cycles
        .iter()
        .map(|cycle| cycle.iter().map(|&idx| node_id(graph, idx)).collect())
        .collect()
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

/// What the resolver found and would remove, without touching the caller's graph.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Cycles detected in the first pass, as closed id sequences.
    pub cycles: Vec<Vec<String>>,
    /// Edges the resolver would sever, in processing order.
    pub suggested_breaks: Vec<RemovedEdge>,
}

/// Detect cycles and compute the minimum-edge breaks on a copy of `graph`.
///
/// # Errors
///
/// Returns [`BomError::UnresolvableCycle`] if the resolver cannot break all
/// cycles within `max_passes`.
pub fn report_cycles(graph: &BomGraph, max_passes: Option<usize>) -> Result<CycleReport, BomError> {
    let cycles = find_cycle_ids(&graph.graph);
    let resolved = resolve_cycles(
        graph.clone(),
        CyclePolicy {
            tolerate: true,
            max_passes,
        },
    )?;
    Ok(CycleReport {
        cycles,
        suggested_breaks: resolved.removed,
    })
}
