//! `bomx explode`: multi-level explosion of every selected root.

use std::path::PathBuf;

use anyhow::Result;
use bomx_core::config::BomConfig;
use bomx_core::roots::RootSelector;
use bomx_explode::explode_bom;
use clap::Args;
use tracing::info;

use crate::cmd::{as_dyn_sink, audit_sink, cycle_policy, emit_run, load_edges, load_items};
use crate::output::OutputMode;

/// Arguments for `bomx explode`.
#[derive(Args, Debug)]
pub struct ExplodeArgs {
    /// BOM edge table (JSON Lines).
    #[arg(long, value_name = "PATH")]
    pub edges: PathBuf,

    /// Item master (JSON Lines); flagged items become roots.
    #[arg(long, value_name = "PATH")]
    pub items: Option<PathBuf>,

    /// Explode this item. Repeatable; overrides item-master root selection.
    #[arg(long = "root", value_name = "ID")]
    pub roots: Vec<String>,

    /// Fail on cycles instead of severing the weakest edge.
    #[arg(long)]
    pub strict: bool,

    /// Write severed cycle edges to this JSON Lines file.
    #[arg(long, value_name = "PATH")]
    pub audit: Option<PathBuf>,

    /// Write the explosion to this JSON Lines file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Execute `bomx explode`.
pub fn run_explode(args: &ExplodeArgs, config: &BomConfig, output: OutputMode) -> Result<()> {
    let roots = select_roots(args, config)?;
    let rows = load_edges(&args.edges, config)?;

    let mut sink = audit_sink(args.audit.as_deref(), config);
    let run = explode_bom(
        &rows,
        &roots,
        cycle_policy(config, args.strict),
        as_dyn_sink(&mut sink),
    )?;

    info!(
        roots = roots.len(),
        rows = run.table.len(),
        removed = run.removed.len(),
        passes = run.stats.resolution_passes,
        hash = %run.stats.content_hash,
        "explode finished"
    );
    emit_run(&run, args.output.as_deref(), output)
}

fn select_roots(args: &ExplodeArgs, config: &BomConfig) -> Result<Vec<String>> {
    if !args.roots.is_empty() {
        return Ok(args.roots.clone());
    }

    let Some(items_path) = args.items.as_deref() else {
        anyhow::bail!("no explosion roots: pass --root <ID> or --items <PATH>");
    };

    let items = load_items(items_path, config)?;
    let roots = RootSelector::from_config(&config.items).select(&items);
    info!(
        items = items.len(),
        roots = roots.len(),
        marker = %config.items.root_marker,
        "selected explosion roots from item master"
    );
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ExplodeArgs,
    }

    #[test]
    fn explode_args_parse_repeated_roots() {
        let parsed = Wrapper::parse_from([
            "test", "--edges", "bom.jsonl", "--root", "A", "--root", "B", "--strict",
        ]);
        assert_eq!(parsed.args.roots, vec!["A", "B"]);
        assert!(parsed.args.strict);
        assert!(parsed.args.items.is_none());
    }

    #[test]
    fn explode_requires_edges() {
        assert!(Wrapper::try_parse_from(["test", "--root", "A"]).is_err());
    }

    #[test]
    fn explicit_roots_skip_item_master() {
        let parsed = Wrapper::parse_from(["test", "--edges", "bom.jsonl", "--root", "A"]);
        let roots = select_roots(&parsed.args, &BomConfig::default()).expect("roots");
        assert_eq!(roots, vec!["A"]);
    }

    #[test]
    fn missing_roots_is_a_usage_error() {
        let parsed = Wrapper::parse_from(["test", "--edges", "bom.jsonl"]);
        let err = select_roots(&parsed.args, &BomConfig::default()).expect_err("no roots");
        assert!(err.to_string().contains("--root"));
    }
}
