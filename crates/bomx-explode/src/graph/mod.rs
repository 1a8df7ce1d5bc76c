//! BOM graph construction, cycle resolution and statistics.
//!
//! ## Pipeline
//!
//! ```text
//! EdgeRow list
//!        ↓  build::BomGraph::build()
//! BomGraph (summed weighted DiGraph, possibly cyclic)
//!        ↓  cycles::resolve_cycles()
//! ResolvedGraph (acyclic, plus the removed-edge log)
//!        ↓  stats::GraphStats::from_graph() / with_resolution()
//! GraphStats
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use bomx_explode::graph::{BomGraph, CyclePolicy, GraphStats, resolve_cycles};
//!
//! let graph = BomGraph::build(&rows);
//! let stats = GraphStats::from_graph(&graph);
//! let resolved = resolve_cycles(graph, CyclePolicy::default())?;
//! let stats = stats.with_resolution(&resolved);
//! ```

pub mod build;
pub mod cycles;
pub mod stats;

pub use build::BomGraph;
pub use cycles::{
    CyclePolicy, CycleReport, ResolvedGraph, find_cycle_ids, find_cycles, report_cycles,
    resolve_cycles,
};
pub use stats::GraphStats;
