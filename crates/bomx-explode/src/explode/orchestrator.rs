//! Multi-root explosion and final ordering.

use std::cmp::Ordering;
use std::collections::HashSet;

use bomx_core::model::{ExplosionRecord, ExplosionTable};
use tracing::{debug, info, instrument};

use crate::explode::walker::ExplosionWalker;
use crate::graph::cycles::ResolvedGraph;

/// Explode every root in `roots` and return one ordered table.
///
/// Duplicate roots are exploded once. Roots that are not graph nodes are
/// skipped. Rows are sorted by `(parent_item, level, component_item)`, then
/// `parent_index` and `total_qty` for a total order, and numbered from 1.
#[instrument(skip_all, fields(roots = roots.len()))]
pub fn explode_roots<S: AsRef<str>>(resolved: &ResolvedGraph, roots: &[S]) -> ExplosionTable {
    let mut walker = ExplosionWalker::new(resolved);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows: Vec<ExplosionRecord> = Vec::new();
    let mut skipped = 0usize;

    for root in roots {
        let root = root.as_ref();
        if !seen.insert(root) {
            continue;
        }
        if !resolved.graph().contains(root) {
            debug!(root, "root has no BOM lines; skipping");
            skipped += 1;
            continue;
        }
        rows.extend(walker.explode(root, 1.0));
    }

    sort_records(&mut rows);
    for (position, row) in rows.iter_mut().enumerate() {
        row.order = position + 1;
    }

    info!(
        exploded = seen.len() - skipped,
        skipped,
        rows = rows.len(),
        cached_nodes = walker.cache().len(),
        "explosion complete"
    );

    ExplosionTable { rows }
}

/// Sort records into final table order.
pub fn sort_records(rows: &mut [ExplosionRecord]) {
    rows.sort_by(compare_records);
}

fn compare_records(a: &ExplosionRecord, b: &ExplosionRecord) -> Ordering {
    a.parent_item
        .cmp(&b.parent_item)
        .then(a.level.cmp(&b.level))
        .then_with(|| a.component_item.cmp(&b.component_item))
        .then_with(|| a.parent_index.cmp(&b.parent_index))
        .then_with(|| a.total_qty.total_cmp(&b.total_qty))
}
