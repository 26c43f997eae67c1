//! Run command implementation
//!
//! The run command executes the full 4-phase pipeline:
//! 1. Fetching every upstream manifest
//! 2. Downloading and deduplicating icons
//! 3. Merging into the persisted catalog
//! 4. Rewriting the upstream manifests
//!
//! It also prepares the output locations beforehand and writes the commit
//! message afterwards.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;
use icon_mirror::config::{load_sources, MirrorConfig};
use icon_mirror::defaults;
use icon_mirror::http::UreqClient;
use icon_mirror::output::{emoji, OutputConfig};
use icon_mirror::phases::orchestrator;
use icon_mirror::report::{self, RunSummary, TriggerEvent};
use indicatif::{ProgressBar, ProgressStyle};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// GitHub `owner/repo` the mirror is published from; enables jsDelivr URLs
    #[arg(value_name = "REPO", env = "ICON_MIRROR_REPO")]
    pub repo: Option<String>,

    /// Explicit CDN prefix for canonical URLs (overrides REPO)
    #[arg(long, value_name = "URL")]
    pub cdn_base: Option<String>,

    /// Source list file
    #[arg(short, long, value_name = "PATH", env = "ICON_MIRROR_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Working directory all other paths are resolved against
    #[arg(short = 'C', long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Directory for content-addressed icon files
    #[arg(long, value_name = "PATH")]
    pub assets_dir: Option<PathBuf>,

    /// Catalog file
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Change log file
    #[arg(long, value_name = "PATH")]
    pub change_log: Option<PathBuf>,

    /// Commit message file
    #[arg(long, value_name = "PATH")]
    pub commit_message: Option<PathBuf>,

    /// Number of download workers (defaults to twice the core count)
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Suppress all output except warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl RunArgs {
    /// Builds the immutable run configuration from the parsed arguments.
    pub fn to_config(&self) -> MirrorConfig {
        let mut config = MirrorConfig::default();
        let repo = self.repo.as_deref().filter(|r| !r.trim().is_empty());
        config.cdn_base = self
            .cdn_base
            .clone()
            .or_else(|| repo.map(defaults::jsdelivr_base));
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(sources) = &self.sources {
            config.sources_file = sources.clone();
        }
        if let Some(assets_dir) = &self.assets_dir {
            config.assets_dir = assets_dir.clone();
        }
        if let Some(catalog) = &self.catalog {
            config.catalog_path = catalog.clone();
        }
        if let Some(change_log) = &self.change_log {
            config.change_log_path = change_log.clone();
        }
        if let Some(commit_message) = &self.commit_message {
            config.commit_message_path = commit_message.clone();
        }
        if let Some(workers) = self.workers {
            config.workers = workers.max(1);
        }
        config
    }
}

/// Execute the run command
pub fn execute(args: RunArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();
    let config = args.to_config();

    let sources = load_sources(config.resolve(&config.sources_file))?;

    if !args.quiet {
        match &config.cdn_base {
            Some(base) => println!("{} CDN base: {}", emoji(output, "✅", "[OK]"), base),
            None => println!(
                "{} No repository given; canonical URLs will be relative paths",
                emoji(output, "⚠️", "[WARN]")
            ),
        }
        println!(
            "{} Mirroring {} sources with {} workers",
            emoji(output, "🔄", "[RUN]"),
            sources.len(),
            config.workers
        );
    }

    prepare_outputs(&config)?;

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template("  {bar:40} {pos}/{len} icons") {
            bar.set_style(style);
        }
        bar
    };

    let client = UreqClient::new();
    let outcome = orchestrator::execute_run(&sources, &client, &config, Some(&progress))?;

    let event = TriggerEvent::from_event_name(std::env::var("GITHUB_EVENT_NAME").ok().as_deref());
    let summary = RunSummary::new(outcome.added.clone(), event);
    report::write_commit_message(&config.resolve(&config.commit_message_path), &summary)?;

    if !args.quiet {
        println!(
            "   {} of {} sources fetched, {} of {} icons stored",
            outcome.sources_fetched,
            sources.len(),
            outcome.icons_stored,
            outcome.icons_listed
        );
        if outcome.added.is_empty() {
            println!("   Catalog unchanged ({} icons)", outcome.catalog_size);
        } else {
            println!(
                "   {} new icons, catalog now holds {}",
                outcome.added.len(),
                outcome.catalog_size
            );
        }
        println!("   {} manifests rewritten", outcome.manifests_written);
        println!(
            "{} Finished in {:.2}s",
            emoji(output, "🎉", "[DONE]"),
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

/// Creates the asset directory and removes reports left by a previous run.
fn prepare_outputs(config: &MirrorConfig) -> Result<()> {
    fs::create_dir_all(config.resolve(&config.assets_dir))?;
    for stale in [&config.change_log_path, &config.commit_message_path] {
        let path = config.resolve(stale);
        if path.exists() {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
