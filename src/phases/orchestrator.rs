//! Orchestrator for a complete mirror run
//!
//! This module coordinates all phases to provide a clean API for a complete
//! run, from fetching upstream manifests to rewriting them.

use indicatif::ProgressBar;

use super::{phase1, phase2, phase3, phase4};
use crate::catalog::CatalogEntry;
use crate::config::{MirrorConfig, SourceConfig};
use crate::error::Result;
use crate::http::HttpClient;

/// Counts and results of a finished run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Sources whose manifest was fetched and decoded.
    pub sources_fetched: usize,
    /// Icon entries listed across all fetched manifests.
    pub icons_listed: usize,
    /// Icons downloaded and stored.
    pub icons_stored: usize,
    /// Size of the catalog after the merge.
    pub catalog_size: usize,
    /// Entries new to the catalog, in catalog order.
    pub added: Vec<CatalogEntry>,
    /// Rewritten manifests written to disk.
    pub manifests_written: usize,
}

/// Execute a complete mirror run (Phases 1-4)
///
/// 1. Fetch every source manifest and extract its icons
/// 2. Download and store every icon by content hash
/// 3. Merge into the persisted catalog, writing it only if entries were added
/// 4. Rewrite every fetched manifest to point at the mirrored assets
///
/// Per-source and per-icon failures are logged by the phase that hit them;
/// only local I/O failures (asset directory, catalog, worker pool) abort.
/// `progress`, when given, is advanced once per finished download.
pub fn execute_run(
    sources: &[SourceConfig],
    client: &dyn HttpClient,
    config: &MirrorConfig,
    progress: Option<&ProgressBar>,
) -> Result<RunOutcome> {
    // Phase 1: Fetch manifests
    let fetched = phase1::execute(sources, client, config);

    // Phase 2: Download and deduplicate assets
    if let Some(bar) = progress {
        bar.set_length(fetched.icons.len() as u64);
    }
    let results = phase2::execute(&fetched.icons, client, config, progress)?;
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    // Phase 3: Merge into the catalog
    let merged = phase3::execute(&results, sources, config)?;

    // Phase 4: Rewrite manifests
    let manifests_written = phase4::execute(sources, &fetched.manifests, &merged.url_map, config);

    Ok(RunOutcome {
        sources_fetched: fetched.manifests.len(),
        icons_listed: fetched.icons.len(),
        icons_stored: results.len(),
        catalog_size: merged.catalog.len(),
        added: merged.added,
        manifests_written,
    })
}
