//! `bomx cycles`: report BOM cycles and the edges the resolver would sever.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use bomx_core::config::BomConfig;
use bomx_core::model::RemovedEdge;
use bomx_explode::graph::{BomGraph, CyclePolicy, report_cycles};
use clap::Args;
use serde::Serialize;

use crate::cmd::load_edges;
use crate::output::{OutputMode, render};

/// Arguments for `bomx cycles`.
#[derive(Args, Debug)]
pub struct CyclesArgs {
    /// BOM edge table (JSON Lines).
    #[arg(long, value_name = "PATH")]
    pub edges: PathBuf,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    cycles: Vec<Vec<String>>,
    suggested_breaks: Vec<RemovedEdge>,
}

/// Execute `bomx cycles`. Nothing is written; this is a dry run.
pub fn run_cycles(args: &CyclesArgs, config: &BomConfig, output: OutputMode) -> Result<()> {
    let rows = load_edges(&args.edges, config)?;
    let graph = BomGraph::build(&rows);
    let report = report_cycles(&graph, CyclePolicy::from(&config.cycles).max_passes)?;

    let payload = CyclesOutput {
        cycles: report.cycles,
        suggested_breaks: report.suggested_breaks,
    };
    render(output, &payload, render_cycles_human)
}

fn render_cycles_human(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.cycles.is_empty() {
        writeln!(w, "No BOM cycles found.")?;
        return Ok(());
    }

    writeln!(w, "BOM cycles ({})", payload.cycles.len())?;
    for (idx, cycle) in payload.cycles.iter().enumerate() {
        writeln!(w, "  {}: {}", idx + 1, cycle.join(" -> "))?;
    }

    writeln!(w, "\nWould sever ({})", payload.suggested_breaks.len())?;
    for edge in &payload.suggested_breaks {
        writeln!(w, "  {} -> {} (qty {})", edge.tail, edge.head, edge.qty_per)?;
    }

    Ok(())
}
