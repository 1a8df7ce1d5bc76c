//! Command handlers and the helpers they share.

pub mod completions;
pub mod cycles;
pub mod explode;
pub mod item;
pub mod stats;

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context as _, Result};
use bomx_core::audit::{AuditSink, JsonlAuditSink};
use bomx_core::config::BomConfig;
use bomx_core::model::{EXPLOSION_COLUMNS, EdgeRow, ExplosionRecord, ItemRow, RemovedEdge};
use bomx_core::table;
use bomx_explode::{CyclePolicy, ExplosionRun};
use serde::Serialize;
use tracing::info;

use crate::output::{OutputMode, pretty_kv, pretty_section, render, render_mode};

/// Read the edge table with the configured column names.
pub fn load_edges(path: &Path, config: &BomConfig) -> Result<Vec<EdgeRow>> {
    let rows = table::read_edges_from_path(path, &config.columns)
        .with_context(|| format!("failed to read edge table {}", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "edge table loaded");
    Ok(rows)
}

/// Read the item master with the configured column names.
pub fn load_items(path: &Path, config: &BomConfig) -> Result<Vec<ItemRow>> {
    let items = table::read_items_from_path(path, &config.items)
        .with_context(|| format!("failed to read item master {}", path.display()))?;
    info!(items = items.len(), path = %path.display(), "item master loaded");
    Ok(items)
}

/// Cycle policy from config, with `--strict` forcing cycles to be fatal.
pub fn cycle_policy(config: &BomConfig, strict: bool) -> CyclePolicy {
    let mut policy = CyclePolicy::from(&config.cycles);
    if strict {
        policy.tolerate = false;
    }
    policy
}

/// Audit sink for the run: `--audit` wins over `cycles.audit_path`.
pub fn audit_sink(flag: Option<&Path>, config: &BomConfig) -> Option<JsonlAuditSink> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.cycles.audit_path.clone())
        .map(JsonlAuditSink::new)
}

/// Run `sink` through the `&mut dyn` seam the pipeline expects.
pub fn as_dyn_sink(sink: &mut Option<JsonlAuditSink>) -> Option<&mut dyn AuditSink> {
    sink.as_mut().map(|s| s as &mut dyn AuditSink)
}

// ---------------------------------------------------------------------------
// Explosion output
// ---------------------------------------------------------------------------

/// JSON shape of an explosion printed to stdout.
#[derive(Debug, Serialize)]
struct ExplosionReport<'a> {
    columns: &'static [&'static str; 7],
    rows: &'a [ExplosionRecord],
    removed_edges: &'a [RemovedEdge],
}

/// JSON shape of an explosion written to a file.
#[derive(Debug, Serialize)]
struct WrittenReport<'a> {
    output: &'a Path,
    rows: usize,
    removed_edges: &'a [RemovedEdge],
}

/// Write the run's table to `output` as JSON Lines, or render it to stdout.
pub fn emit_run(run: &ExplosionRun, output_path: Option<&Path>, mode: OutputMode) -> Result<()> {
    if let Some(path) = output_path {
        table::write_explosion_to_path(path, &run.table)
            .with_context(|| format!("failed to write explosion to {}", path.display()))?;
        let report = WrittenReport {
            output: path,
            rows: run.table.len(),
            removed_edges: &run.removed,
        };
        return render(mode, &report, |r, w| {
            writeln!(w, "wrote {} row(s) to {}", r.rows, r.output.display())?;
            write_removed_text(r.removed_edges, w)
        });
    }

    let report = ExplosionReport {
        columns: run.table.columns(),
        rows: &run.table.rows,
        removed_edges: &run.removed,
    };
    render_mode(mode, &report, render_explosion_text, render_explosion_pretty)
}

fn render_explosion_text(report: &ExplosionReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", report.columns.join("\t"))?;
    for row in report.rows {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.order,
            row.parent_item,
            row.level,
            row.parent_index,
            row.component_item,
            row.qty_per,
            row.total_qty
        )?;
    }
    write_removed_text(report.removed_edges, w)
}

fn write_removed_text(removed: &[RemovedEdge], w: &mut dyn Write) -> io::Result<()> {
    for edge in removed {
        writeln!(w, "removed\t{}\t{}\t{}", edge.tail, edge.head, edge.qty_per)?;
    }
    Ok(())
}

fn render_explosion_pretty(report: &ExplosionReport<'_>, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("BOM explosion ({} rows)", report.rows.len()))?;

    if report.rows.is_empty() {
        writeln!(w, "No components to explode.")?;
    } else {
        let widths = column_widths(report.rows);
        let header: Vec<String> = EXPLOSION_COLUMNS
            .iter()
            .zip(widths)
            .map(|(name, width)| format!("{name:<width$}"))
            .collect();
        writeln!(w, "{}", header.join("  ").trim_end())?;

        for row in report.rows {
            let cells = row_cells(row);
            let line: Vec<String> = cells
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect();
            writeln!(w, "{}", line.join("  ").trim_end())?;
        }
    }

    if !report.removed_edges.is_empty() {
        writeln!(w)?;
        pretty_section(
            w,
            &format!("Removed cycle edges ({})", report.removed_edges.len()),
        )?;
        for edge in report.removed_edges {
            pretty_kv(w, &format!("{} -> {}", edge.tail, edge.head), edge.qty_per.to_string())?;
        }
    }
    Ok(())
}

fn row_cells(row: &ExplosionRecord) -> [String; 7] {
    [
        row.order.to_string(),
        row.parent_item.clone(),
        row.level.to_string(),
        row.parent_index.clone(),
        row.component_item.clone(),
        row.qty_per.to_string(),
        row.total_qty.to_string(),
    ]
}

fn column_widths(rows: &[ExplosionRecord]) -> [usize; 7] {
    let mut widths = EXPLOSION_COLUMNS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row_cells(row)) {
            *width = (*width).max(cell.len());
        }
    }
    widths
}
