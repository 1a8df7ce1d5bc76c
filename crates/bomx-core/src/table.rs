//! JSON Lines table reader and writers.
//!
//! Input tables (BOM lines, item master) arrive as one JSON object per
//! line. The header of a table is the key set of its first row; required
//! columns are checked against it before any row is converted, so a
//! malformed table aborts the run before the graph builder sees anything.
//!
//! Quantities are coerced, never rejected: numbers pass through, numeric
//! strings are parsed, and everything else becomes `0.0` so that the graph
//! builder drops the row as non-positive.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{ColumnConfig, ItemConfig};
use crate::error::BomError;
use crate::model::{EdgeRow, ExplosionTable, ItemRow};

type Row = Map<String, Value>;

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Parse JSON Lines into `(line_number, object)` pairs. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`BomError::InvalidRow`] for a line that is not a JSON object and
/// [`BomError::Io`] if the reader fails.
pub fn read_rows<R: BufRead>(reader: R) -> Result<Vec<(usize, Row)>, BomError> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let row: Row = serde_json::from_str(trimmed).map_err(|source| BomError::InvalidRow {
            line: idx + 1,
            source,
        })?;
        rows.push((idx + 1, row));
    }
    Ok(rows)
}

/// Read the BOM edge table.
///
/// # Errors
///
/// Returns [`BomError::MalformedEdge`] when a configured column is absent
/// from the header or from a later row, and propagates parse/I/O errors
/// from [`read_rows`].
pub fn read_edges<R: BufRead>(reader: R, columns: &ColumnConfig) -> Result<Vec<EdgeRow>, BomError> {
    let rows = read_rows(reader)?;

    if let Some((_, header)) = rows.first() {
        let missing = missing_columns(header, &columns.required());
        if !missing.is_empty() {
            return Err(BomError::MalformedEdge {
                missing,
                line: None,
            });
        }
    }

    let mut edges = Vec::with_capacity(rows.len());
    for (line, row) in rows {
        let missing = missing_columns(&row, &columns.required());
        if !missing.is_empty() {
            return Err(BomError::MalformedEdge {
                missing,
                line: Some(line),
            });
        }

        let (Some(parent), Some(child)) = (
            id_text(&row[columns.parent.as_str()]),
            id_text(&row[columns.child.as_str()]),
        ) else {
            debug!(line, "skipping BOM line with empty parent or child id");
            continue;
        };

        let raw_qty = &row[columns.quantity.as_str()];
        let qty = parse_quantity(raw_qty).unwrap_or_else(|| {
            debug!(line, %parent, %child, value = %raw_qty, "non-numeric quantity coerced to 0");
            0.0
        });

        edges.push(EdgeRow { parent, child, qty });
    }

    Ok(edges)
}

/// Read the BOM edge table from a file.
///
/// # Errors
///
/// See [`read_edges`]; also fails if the file cannot be opened.
pub fn read_edges_from_path(path: &Path, columns: &ColumnConfig) -> Result<Vec<EdgeRow>, BomError> {
    let file = File::open(path)?;
    read_edges(BufReader::new(file), columns)
}

/// Read the item master.
///
/// A null or missing flag value is kept as `None` (not flagged); a missing
/// id or flag column in the header is fatal.
///
/// # Errors
///
/// Returns [`BomError::MalformedItems`] when a configured column is absent
/// from the header or a row lacks the id column.
pub fn read_items<R: BufRead>(reader: R, items: &ItemConfig) -> Result<Vec<ItemRow>, BomError> {
    let rows = read_rows(reader)?;

    if let Some((_, header)) = rows.first() {
        let missing = missing_columns(header, &[items.id.as_str(), items.flag.as_str()]);
        if !missing.is_empty() {
            return Err(BomError::MalformedItems {
                missing,
                line: None,
            });
        }
    }

    let mut out = Vec::with_capacity(rows.len());
    for (line, row) in rows {
        let Some(item_no) = row.get(&items.id).and_then(id_text) else {
            return Err(BomError::MalformedItems {
                missing: vec![items.id.clone()],
                line: Some(line),
            });
        };
        let flag = row.get(&items.flag).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        });
        out.push(ItemRow { item_no, flag });
    }

    Ok(out)
}

/// Read the item master from a file.
///
/// # Errors
///
/// See [`read_items`]; also fails if the file cannot be opened.
pub fn read_items_from_path(path: &Path, items: &ItemConfig) -> Result<Vec<ItemRow>, BomError> {
    let file = File::open(path)?;
    read_items(BufReader::new(file), items)
}

/// Coerce a raw quantity cell to `f64`; unparsable or non-finite values become `0.0`.
#[must_use]
pub fn coerce_quantity(value: &Value) -> f64 {
    parse_quantity(value).unwrap_or(0.0)
}

fn parse_quantity(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|q| q.is_finite())
}

/// Render an id cell as text. Strings are trimmed; numbers are stringified.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn missing_columns(row: &Row, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|col| !row.contains_key(**col))
        .map(|col| (*col).to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write the explosion table as JSON Lines, one record per line in row order.
///
/// # Errors
///
/// Returns [`BomError::Io`] if writing fails.
pub fn write_explosion<W: Write>(out: &mut W, table: &ExplosionTable) -> Result<(), BomError> {
    for row in &table.rows {
        serde_json::to_writer(&mut *out, row).map_err(std::io::Error::from)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the explosion table to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`BomError::Io`] if the file cannot be created or written.
pub fn write_explosion_to_path(path: &Path, table: &ExplosionTable) -> Result<(), BomError> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write_explosion(&mut out, table)
}
