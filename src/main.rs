//! # Icon Mirror CLI
//!
//! This is the binary entry point for the `icon-mirror` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Initializing logging.
//! - Executing the appropriate command and translating fatal errors into a
//!   non-zero exit status.
//!
//! The pipeline itself lives in the `icon_mirror` library crate; the binary
//! is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
