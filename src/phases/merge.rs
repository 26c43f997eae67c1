//! Phase 3: Catalog Merge
//!
//! This phase turns the stored downloads from Phase 2 into catalog entries,
//! merges them into the catalog persisted by earlier runs, and works out
//! which entries are new.
//!
//! ## Process
//!
//! 1.  **Grouping**: Results are grouped by content hash in a single pass over
//!     the submission-ordered input. The first result of each group is its
//!     primary; the rest are aliases.
//!
//! 2.  **URL Mapping**: Every origin URL in a group, primary and aliases alike,
//!     maps to the group's canonical URL. Phase 4 uses this map to rewrite the
//!     upstream manifests.
//!
//! 3.  **Merge**: Prior entries are keyed by canonical URL and this run's
//!     entries are inserted over them. Entries not seen this run are kept.
//!
//! 4.  **Persistence**: Only when the merged catalog contains URLs the prior
//!     catalog lacked is the catalog rewritten, together with a change log.
//!     A run that finds nothing new leaves the catalog file untouched.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::info;

use super::ContentResult;
use crate::catalog::{self, CatalogDocument, CatalogEntry};
use crate::config::{MirrorConfig, SourceConfig};
use crate::error::Result;

/// Origin URL to canonical URL, for this run's downloads only.
pub type UrlMap = HashMap<String, String>;

/// Results sharing one content hash.
#[derive(Debug, Clone)]
pub struct HashGroup<'a> {
    pub primary: &'a ContentResult,
    pub aliases: Vec<&'a ContentResult>,
}

impl HashGroup<'_> {
    /// Catalog description: the primary's source, plus the aliases if any.
    pub fn description(&self) -> String {
        let mut description = format!("source: {}", self.primary.icon.source_label);
        if !self.aliases.is_empty() {
            let names: Vec<&str> = self
                .aliases
                .iter()
                .map(|alias| alias.icon.original_name.as_str())
                .collect();
            description.push_str(" | aliases: ");
            description.push_str(&names.join(", "));
        }
        description
    }
}

/// What Phase 3 hands to Phase 4 and the change reporter.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub url_map: UrlMap,
    /// The merged, sorted catalog.
    pub catalog: Vec<CatalogEntry>,
    /// Entries whose URL the prior catalog did not contain, in catalog order.
    pub added: Vec<CatalogEntry>,
    pub prior_count: usize,
}

/// Executes Phase 3 of the pipeline.
pub fn execute(
    results: &[ContentResult],
    sources: &[SourceConfig],
    config: &MirrorConfig,
) -> Result<MergeOutcome> {
    let groups = group_by_hash(results);
    let (new_entries, url_map) = build_entries(&groups, config);

    let catalog_path = config.resolve(&config.catalog_path);
    let prior = catalog::load(&catalog_path)?;
    let prior_count = prior.len();
    let prior_urls: HashSet<String> = prior.iter().map(|e| e.canonical_url.clone()).collect();

    let merged = merge_entries(prior, new_entries);
    let added = added_entries(&merged, &prior_urls);

    if added.is_empty() {
        info!(
            "Catalog is up to date ({} icons); leaving {} unchanged",
            merged.len(),
            catalog_path.display()
        );
    } else {
        info!(
            "{} new icons; updating {} (previous: {}, now: {})",
            added.len(),
            catalog_path.display(),
            prior_count,
            merged.len()
        );
        catalog::write_change_log(&config.resolve(&config.change_log_path), &added)?;
        let document = CatalogDocument::new(
            &config.catalog_name,
            sources.iter().map(|s| s.author.as_str()),
            merged.clone(),
        );
        catalog::persist(&catalog_path, &document)?;
    }

    Ok(MergeOutcome {
        url_map,
        catalog: merged,
        added,
        prior_count,
    })
}

/// Groups results by content hash, keeping first-seen order for both groups
/// and aliases.
pub fn group_by_hash(results: &[ContentResult]) -> Vec<HashGroup<'_>> {
    let mut groups: Vec<HashGroup<'_>> = Vec::new();
    let mut index_by_hash: HashMap<&str, usize> = HashMap::new();

    for result in results {
        match index_by_hash.get(result.content_hash.as_str()) {
            Some(&index) => groups[index].aliases.push(result),
            None => {
                index_by_hash.insert(result.content_hash.as_str(), groups.len());
                groups.push(HashGroup {
                    primary: result,
                    aliases: Vec::new(),
                });
            }
        }
    }

    groups
}

/// Builds one catalog entry per group and the origin-to-canonical URL map.
pub fn build_entries(groups: &[HashGroup<'_>], config: &MirrorConfig) -> (Vec<CatalogEntry>, UrlMap) {
    let mut entries = Vec::with_capacity(groups.len());
    let mut url_map = UrlMap::new();

    for group in groups {
        let canonical_url = config.canonical_url(&group.primary.stored_path);
        for member in std::iter::once(group.primary).chain(group.aliases.iter().copied()) {
            url_map.insert(member.origin_url.clone(), canonical_url.clone());
        }
        entries.push(CatalogEntry::new(
            &group.primary.content_hash,
            &group.primary.icon.name,
            &canonical_url,
            group.primary.byte_size,
            &group.description(),
        ));
    }

    (entries, url_map)
}

/// Merges this run's entries over the prior catalog by canonical URL and
/// returns the union in catalog order.
pub fn merge_entries(prior: Vec<CatalogEntry>, new_entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let mut by_url: BTreeMap<String, CatalogEntry> = BTreeMap::new();
    for entry in prior.into_iter().chain(new_entries) {
        by_url.insert(entry.canonical_url.clone(), entry);
    }

    let mut merged: Vec<CatalogEntry> = by_url.into_values().collect();
    catalog::sort_entries(&mut merged);
    merged
}

/// Entries of `merged` whose URL is not in `prior_urls`.
pub fn added_entries(merged: &[CatalogEntry], prior_urls: &HashSet<String>) -> Vec<CatalogEntry> {
    merged
        .iter()
        .filter(|entry| !prior_urls.contains(&entry.canonical_url))
        .cloned()
        .collect()
}
