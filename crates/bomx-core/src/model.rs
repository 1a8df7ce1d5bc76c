//! Value types shared by the graph builder, the walker and the table layer.
//!
//! Everything here is computed fresh per explosion run. Nothing is cached
//! across runs.

use serde::{Deserialize, Serialize};

/// One BOM line after column mapping: `qty` units of `child` per unit of `parent`.
///
/// `qty` has already been coerced (non-numeric → 0.0) but not yet filtered;
/// the graph builder drops non-positive rows and sums duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub parent: String,
    pub child: String,
    pub qty: f64,
}

impl EdgeRow {
    /// Convenience constructor used heavily by tests and fixtures.
    #[must_use]
    pub fn new(parent: impl Into<String>, child: impl Into<String>, qty: f64) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            qty,
        }
    }
}

/// An edge severed by the cycle resolver, kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedEdge {
    pub tail: String,
    pub head: String,
    /// Summed quantity the edge carried when it was removed.
    pub qty_per: f64,
}

/// Column names of the explosion table, in schema order.
pub const EXPLOSION_COLUMNS: [&str; 7] = [
    "order",
    "parent_item",
    "level",
    "parent_index",
    "component_item",
    "qty_per",
    "total_qty",
];

/// One row of the flat explosion table.
///
/// Field order matches [`EXPLOSION_COLUMNS`], so serializing a record
/// yields the columns in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionRecord {
    /// 1-based position after the final sort; 0 until the orchestrator assigns it.
    pub order: usize,
    /// The exploded root.
    pub parent_item: String,
    /// Depth below the root; the root's direct children are level 0.
    pub level: usize,
    /// Immediate parent on this path.
    pub parent_index: String,
    pub component_item: String,
    pub qty_per: f64,
    pub total_qty: f64,
}

/// The ordered explosion result.
///
/// Always carries the full column schema, even with zero rows, so callers
/// never special-case an absent table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExplosionTable {
    pub rows: Vec<ExplosionRecord>,
}

impl ExplosionTable {
    /// Column names, in schema order.
    #[must_use]
    pub const fn columns(&self) -> &'static [&'static str; 7] {
        &EXPLOSION_COLUMNS
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An item master row, reduced to what root selection needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    pub item_no: String,
    /// Make/buy classification, e.g. `"Output"` or `"Purchase"`.
    pub flag: Option<String>,
}
