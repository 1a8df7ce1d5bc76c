//! End-to-end batch run: edge rows in, ordered explosion table out.

use bomx_core::audit::AuditSink;
use bomx_core::error::BomError;
use bomx_core::model::{EdgeRow, ExplosionTable, RemovedEdge};
use tracing::instrument;

use crate::explode::explode_roots;
use crate::graph::{BomGraph, CyclePolicy, GraphStats, resolve_cycles};

/// Everything one explosion run produces.
#[derive(Debug, Clone)]
pub struct ExplosionRun {
    pub table: ExplosionTable,
    /// Edges severed to break cycles, in processing order.
    pub removed: Vec<RemovedEdge>,
    pub stats: GraphStats,
}

/// Build, resolve and explode.
///
/// The removal log is handed to `audit` (when given) before explosion
/// starts, so it is persisted even for a run with no valid roots.
///
/// # Errors
///
/// Returns [`BomError::CyclicGraph`] or [`BomError::UnresolvableCycle`]
/// from cycle resolution, or any error the audit sink reports. No partial
/// table is returned on error.
#[instrument(skip_all, fields(rows = rows.len(), roots = roots.len()))]
pub fn explode_bom<S: AsRef<str>>(
    rows: &[EdgeRow],
    roots: &[S],
    policy: CyclePolicy,
    audit: Option<&mut dyn AuditSink>,
) -> Result<ExplosionRun, BomError> {
    let graph = BomGraph::build(rows);
    let stats = GraphStats::from_graph(&graph);
    let resolved = resolve_cycles(graph, policy)?;

    if let Some(sink) = audit {
        sink.record(resolved.removed())?;
    }

    let table = explode_roots(&resolved, roots);
    let stats = stats.with_resolution(&resolved);
    let (_, removed) = resolved.into_parts();

    Ok(ExplosionRun {
        table,
        removed,
        stats,
    })
}
