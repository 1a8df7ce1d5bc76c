//! `bomx completions`: shell completion scripts.

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, Command};
use clap_complete::{Shell, generate};

const BIN_NAME: &str = "bomx";

/// Arguments for `bomx completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Print the completion script for `shell` to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed.
pub fn run_completions(shell: Shell, command: &mut Command) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_completions(shell, command, &mut out)?;
    out.flush()?;
    Ok(())
}

fn write_completions(shell: Shell, command: &mut Command, out: &mut dyn Write) -> io::Result<()> {
    generate(shell, command, BIN_NAME, out);
    Ok(())
}
