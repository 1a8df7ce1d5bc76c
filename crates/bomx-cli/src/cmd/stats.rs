//! `bomx stats`: structural summary of a BOM edge table.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use bomx_core::config::BomConfig;
use bomx_explode::graph::{BomGraph, GraphStats, resolve_cycles};
use clap::Args;

use crate::cmd::{cycle_policy, load_edges};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `bomx stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// BOM edge table (JSON Lines).
    #[arg(long, value_name = "PATH")]
    pub edges: PathBuf,

    /// Fail on cycles instead of reporting post-resolution figures.
    #[arg(long)]
    pub strict: bool,
}

/// Execute `bomx stats`.
pub fn run_stats(args: &StatsArgs, config: &BomConfig, output: OutputMode) -> Result<()> {
    let rows = load_edges(&args.edges, config)?;
    let graph = BomGraph::build(&rows);
    let stats = GraphStats::from_graph(&graph);
    let resolved = resolve_cycles(graph, cycle_policy(config, args.strict))?;
    let payload = stats.with_resolution(&resolved);

    render_mode(output, &payload, render_stats_text, render_stats_pretty)
}

fn stat_lines(stats: &GraphStats) -> Vec<(&'static str, String)> {
    vec![
        ("items", stats.node_count.to_string()),
        ("bom_lines", stats.edge_count.to_string()),
        ("density", format!("{:.4}", stats.density)),
        ("sources", stats.source_count.to_string()),
        ("leaves", stats.leaf_count.to_string()),
        ("cyclic_groups", stats.cyclic_component_count.to_string()),
        ("removed_edges", stats.removed_edge_count.to_string()),
        ("resolution_passes", stats.resolution_passes.to_string()),
        ("max_parents", stats.max_in_degree.to_string()),
        ("max_components", stats.max_out_degree.to_string()),
        (
            "longest_chain",
            stats
                .longest_chain
                .map_or_else(|| "-".to_string(), |depth| depth.to_string()),
        ),
        ("content_hash", stats.content_hash.clone()),
    ]
}

fn render_stats_text(stats: &GraphStats, w: &mut dyn Write) -> std::io::Result<()> {
    for (key, value) in stat_lines(stats) {
        writeln!(w, "{key}\t{value}")?;
    }
    Ok(())
}

fn render_stats_pretty(stats: &GraphStats, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "BOM graph")?;
    for (key, value) in stat_lines(stats) {
        pretty_kv(w, key, value)?;
    }
    Ok(())
}
