//! Implementation of the 4 phases of a mirror run.
//!
//! ## Overview
//!
//! A run follows 4 phases:
//! 1. Fetch - Retrieve every upstream manifest and extract its icon entries
//! 2. Dedup - Download every icon in parallel and store it by content hash
//! 3. Merge - Group by hash, merge with the persisted catalog, compute additions
//! 4. Rewrite - Point every upstream manifest at the mirrored assets
//!
//! Each phase depends only on the previous phases and the foundation modules
//! (`config`, `http`, `catalog`).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::config::SourceConfig;

// Phase modules
pub mod dedup;
pub mod fetch;
pub mod merge;
pub mod orchestrator;
pub mod rewrite;

pub use dedup as phase2;
pub use fetch as phase1;
pub use merge as phase3;
pub use rewrite as phase4;

/// An icon listed by an upstream manifest, before download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    pub name: String,
    pub origin_url: String,
    pub author: String,
    pub source_label: String,
    /// `name-author`, shown when this entry ends up as an alias.
    pub original_name: String,
}

impl IconEntry {
    pub fn new(name: &str, origin_url: &str, source: &SourceConfig) -> Self {
        Self {
            name: name.to_string(),
            origin_url: origin_url.to_string(),
            author: source.author.clone(),
            source_label: source.label.clone(),
            original_name: format!("{}-{}", name, source.author),
        }
    }
}

/// A successfully downloaded and stored icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentResult {
    pub icon: IconEntry,
    /// Position of `icon` in the fetch output; the merge tie-break.
    pub submission_index: usize,
    pub content_hash: String,
    pub byte_size: u64,
    /// Asset path relative to the mirror root, e.g. `icons/assets/<hash>.png`.
    pub stored_path: PathBuf,
    pub origin_url: String,
}

/// Raw manifests fetched this run, keyed by the source's output path.
pub type ManifestSet = BTreeMap<PathBuf, Value>;

/// Everything Phase 1 produces.
#[derive(Debug, Default)]
pub struct FetchOutput {
    /// Icon entries in source order, then manifest order.
    pub icons: Vec<IconEntry>,
    pub manifests: ManifestSet,
}
