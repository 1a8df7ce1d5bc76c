//! `bomx item`: explode a single item number.

use std::path::PathBuf;

use anyhow::Result;
use bomx_core::config::BomConfig;
use bomx_core::error::BomError;
use bomx_explode::explode_bom;
use clap::Args;

use crate::cmd::{as_dyn_sink, audit_sink, cycle_policy, emit_run, load_edges, load_items};
use crate::output::OutputMode;

/// Arguments for `bomx item`.
#[derive(Args, Debug)]
pub struct ItemArgs {
    /// Item number to explode.
    #[arg(value_name = "ITEM_NO")]
    pub item_no: String,

    /// BOM edge table (JSON Lines).
    #[arg(long, value_name = "PATH")]
    pub edges: PathBuf,

    /// Item master (JSON Lines); when given, the item must be listed in it.
    #[arg(long, value_name = "PATH")]
    pub items: Option<PathBuf>,

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

/// Execute `bomx item`.
pub fn run_item(args: &ItemArgs, config: &BomConfig, output: OutputMode) -> Result<()> {
    let item_no = args.item_no.trim();

    if let Some(items_path) = args.items.as_deref() {
        let items = load_items(items_path, config)?;
        if !items.iter().any(|item| item.item_no == item_no) {
            return Err(BomError::ItemNotFound(item_no.to_string()).into());
        }
    }

    let rows = load_edges(&args.edges, config)?;
    let mut sink = audit_sink(args.audit.as_deref(), config);
    let run = explode_bom(
        &rows,
        &[item_no],
        cycle_policy(config, args.strict),
        as_dyn_sink(&mut sink),
    )?;
    emit_run(&run, args.output.as_deref(), output)
}
