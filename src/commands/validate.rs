//! Validate command implementation
//!
//! Parses the source list, checks every entry, and prints what a run would
//! fetch. Nothing is downloaded or written.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use icon_mirror::config::{load_sources, validate_sources};
use icon_mirror::defaults;
use icon_mirror::output::{emoji, OutputConfig};

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Source list file
    #[arg(short, long, value_name = "PATH", env = "ICON_MIRROR_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the validate command
pub fn execute(args: ValidateArgs, output: &OutputConfig) -> Result<()> {
    let path = args.sources.unwrap_or_else(defaults::sources_file);
    let sources = load_sources(&path)?;
    validate_sources(&sources)?;

    if !args.quiet {
        println!(
            "{} {}: {} sources",
            emoji(output, "✅", "[OK]"),
            path.display(),
            sources.len()
        );
        for source in &sources {
            println!(
                "   {} ({}) -> {}",
                source.label,
                source.author,
                source.output_path.display()
            );
        }
    }

    Ok(())
}
