//! Phase 1: Manifest Fetch
//!
//! This is the first phase of a mirror run. It retrieves every upstream
//! manifest named in the source list and extracts the icons each one lists.
//!
//! ## Process
//!
//! 1.  **Parallel Fetch**: All manifests are requested in parallel using
//!     rayon, each with its own timeout.
//!
//! 2.  **Extraction**: Each manifest's top-level `icons` array is scanned and
//!     every element with a non-empty string `name` and `url` becomes an
//!     `IconEntry` tagged with the source's label and author.
//!
//! 3.  **Isolation**: A source that cannot be fetched or decoded is logged and
//!     contributes nothing. It never affects its siblings.
//!
//! Results are collected in source-list order regardless of completion order,
//! so the icon list handed to Phase 2 is reproducible.

use log::{info, warn};
use rayon::prelude::*;
use serde_json::Value;

use super::{FetchOutput, IconEntry};
use crate::config::{MirrorConfig, SourceConfig};
use crate::error::{Error, Result};
use crate::http::HttpClient;

/// A manifest that was fetched and decoded.
#[derive(Debug, Clone)]
pub struct FetchedManifest {
    pub document: Value,
    pub icons: Vec<IconEntry>,
}

/// Executes Phase 1 of the pipeline.
pub fn execute(
    sources: &[SourceConfig],
    client: &dyn HttpClient,
    config: &MirrorConfig,
) -> FetchOutput {
    let fetched: Vec<Result<FetchedManifest>> = sources
        .par_iter()
        .map(|source| fetch_source(source, client, config))
        .collect();

    let mut output = FetchOutput::default();
    for (source, result) in sources.iter().zip(fetched) {
        match result {
            Ok(manifest) => {
                info!(
                    "Source '{}': {} icons listed",
                    source.label,
                    manifest.icons.len()
                );
                output.icons.extend(manifest.icons);
                output
                    .manifests
                    .insert(source.output_path.clone(), manifest.document);
            }
            Err(e) => warn!("{}", e),
        }
    }

    output
}

/// Fetches and decodes a single source's manifest.
pub fn fetch_source(
    source: &SourceConfig,
    client: &dyn HttpClient,
    config: &MirrorConfig,
) -> Result<FetchedManifest> {
    let unavailable = |message: String| Error::SourceUnavailable {
        source_label: source.label.clone(),
        url: source.manifest_url.clone(),
        message,
    };

    let response = client
        .get(&source.manifest_url, config.manifest_timeout)
        .map_err(|e| unavailable(e.to_string()))?;
    if !response.is_success() {
        return Err(unavailable(format!("HTTP status {}", response.status)));
    }

    let document: Value = serde_json::from_slice(&response.body)
        .map_err(|e| unavailable(format!("invalid JSON: {}", e)))?;
    if !document.is_object() {
        return Err(unavailable("manifest is not a JSON object".to_string()));
    }

    let icons = extract_icons(&document, source);
    Ok(FetchedManifest { document, icons })
}

/// Extracts every icon with a non-empty `name` and `url` from a manifest.
pub fn extract_icons(document: &Value, source: &SourceConfig) -> Vec<IconEntry> {
    let Some(icons) = document.get("icons").and_then(Value::as_array) else {
        return Vec::new();
    };

    icons
        .iter()
        .filter_map(|icon| {
            let name = icon.get("name").and_then(Value::as_str)?;
            let url = icon.get("url").and_then(Value::as_str)?;
            if name.is_empty() || url.is_empty() {
                return None;
            }
            Some(IconEntry::new(name, url, source))
        })
        .collect()
}
