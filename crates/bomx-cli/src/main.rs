#![forbid(unsafe_code)]

mod cmd;
mod output;

use bomx_core::config::{BomConfig, resolve_config};
use bomx_core::error::ErrorCode;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "bomx: multi-level bill-of-materials explosion",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (defaults to pretty on a terminal, text when piped).
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    format: Option<OutputMode>,

    /// Config file (skips .bomx/config.toml and user config discovery).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags and environment.
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Explode",
        about = "Explode BOM roots into leaf components",
        long_about = "Explode every root into its leaf components, multiplying quantities down each path.",
        after_help = "EXAMPLES:\n    # Explode the item-master outputs\n    bomx explode --edges bom.jsonl --items items.jsonl\n\n    # Explode two items, keep an audit of severed cycle edges\n    bomx explode --edges bom.jsonl --root FG-1 --root FG-2 --audit removed.jsonl\n\n    # Fail on cycles and write the result to a file\n    bomx explode --edges bom.jsonl --root FG-1 --strict --output exploded.jsonl"
    )]
    Explode(cmd::explode::ExplodeArgs),

    #[command(
        next_help_heading = "Explode",
        about = "Explode one item number",
        long_about = "Explode a single item. With --items the item must exist in the item master.",
        after_help = "EXAMPLES:\n    # Explode one item\n    bomx item FG-100 --edges bom.jsonl\n\n    # Check the item master first\n    bomx item FG-100 --edges bom.jsonl --items items.jsonl --json"
    )]
    Item(cmd::item::ItemArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "List BOM cycles and the edges that would be severed",
        after_help = "EXAMPLES:\n    # Dry-run cycle resolution\n    bomx cycles --edges bom.jsonl"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Show BOM graph statistics",
        after_help = "EXAMPLES:\n    # Summarise a BOM\n    bomx stats --edges bom.jsonl --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash completions\n    bomx completions bash > /etc/bash_completion.d/bomx"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("BOMX_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "bomx=debug,info"
        } else {
            "bomx=info,warn"
        })
    });

    let format = env::var("BOMX_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<BomConfig> {
    let project_root = env::current_dir()?;
    let config = resolve_config(cli.config.as_deref(), &project_root)?;
    debug!(?config, "configuration resolved");
    Ok(config)
}

fn run(cli: &Cli, output: OutputMode) -> Result<(), CliError> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command)
            .map_err(|err| CliError::from_anyhow(&err));
    }

    let config = load_config(cli).map_err(|err| {
        let code = ErrorCode::ConfigParseError;
        CliError::with_details(
            format!("{err:#}"),
            code.hint().unwrap_or_else(|| code.message()),
            code.code(),
        )
    })?;

    let result = match &cli.command {
        Commands::Explode(args) => cmd::explode::run_explode(args, &config, output),
        Commands::Item(args) => cmd::item::run_item(args, &config, output),
        Commands::Cycles(args) => cmd::cycles::run_cycles(args, &config, output),
        Commands::Stats(args) => cmd::stats::run_stats(args, &config, output),
        Commands::Completions(_) => Ok(()),
    };
    result.map_err(|err| CliError::from_anyhow(&err))
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match run(&cli, output) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(error) => {
            render_error(output, &error)?;
            Ok(ExitCode::FAILURE)
        }
    }
}
