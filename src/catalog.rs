//! # Persisted Catalog
//!
//! The catalog is the single aggregate of every distinct icon the mirror has
//! ever stored. It is the only state that survives between runs.
//!
//! ## Format
//!
//! ```json
//! {
//!   "name": "Emby Icons",
//!   "description": "Contains works from A, B. Currently holds 2 unique icons.",
//!   "icons": [
//!     {"md5": "...", "name": "...", "url": "...", "size": 123, "description": "..."}
//!   ]
//! }
//! ```
//!
//! Entries are always kept sorted by display name (case-insensitive,
//! ascending), then byte size (descending), then URL. The URL is the merge
//! identity, so the ordering is total and sorting is a pure function of the
//! entry set.
//!
//! Unknown per-entry fields are carried through untouched, so entries written
//! by other tools survive a merge unchanged.

use std::cmp::Ordering;
use std::fs;
use std::io::Write;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// One distinct icon in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Content hash of the stored bytes.
    #[serde(rename = "md5", default)]
    pub content_hash: String,
    #[serde(rename = "name")]
    pub display_name: String,
    /// Mirrored URL; the merge identity.
    #[serde(rename = "url")]
    pub canonical_url: String,
    #[serde(rename = "size", default)]
    pub byte_size: u64,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    pub fn new(
        content_hash: &str,
        display_name: &str,
        canonical_url: &str,
        byte_size: u64,
        description: &str,
    ) -> Self {
        Self {
            content_hash: content_hash.to_string(),
            display_name: display_name.to_string(),
            canonical_url: canonical_url.to_string(),
            byte_size,
            description: description.to_string(),
            extra: Map::new(),
        }
    }

    /// The line this entry contributes to the change log.
    pub fn change_log_line(&self) -> String {
        format!("\"{}\": {}", self.content_hash, self.display_name)
    }
}

/// Catalog ordering: name (case-insensitive) ascending, size descending, URL
/// ascending.
pub fn compare_entries(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    a.display_name
        .to_lowercase()
        .cmp(&b.display_name.to_lowercase())
        .then_with(|| b.byte_size.cmp(&a.byte_size))
        .then_with(|| a.canonical_url.cmp(&b.canonical_url))
}

/// Sorts entries into catalog order.
pub fn sort_entries(entries: &mut [CatalogEntry]) {
    entries.sort_by(compare_entries);
}

/// The on-disk catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icons: Vec<CatalogEntry>,
}

impl CatalogDocument {
    /// Builds a document around already sorted entries, describing the
    /// distinct authors that contributed to it.
    pub fn new<'a>(
        name: &str,
        authors: impl IntoIterator<Item = &'a str>,
        icons: Vec<CatalogEntry>,
    ) -> Self {
        let mut authors: Vec<&str> = authors.into_iter().collect();
        authors.sort_unstable();
        authors.dedup();
        let description = format!(
            "Contains works from {}. Currently holds {} unique icons.",
            authors.join(", "),
            icons.len()
        );
        Self {
            name: name.to_string(),
            description,
            icons,
        }
    }
}

/// Parses catalog JSON bytes, returning its entries.
///
/// Any decode failure, invalid UTF-8 included, is `CatalogCorrupt`.
pub fn parse(content: &[u8], path: &Path) -> Result<Vec<CatalogEntry>> {
    serde_json::from_slice::<CatalogDocument>(content)
        .map(|document| document.icons)
        .map_err(|e| Error::CatalogCorrupt {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Loads the entries of a previously persisted catalog.
///
/// A missing or empty file is an empty catalog. A file that cannot be parsed
/// is logged and also treated as empty; the next write replaces it.
pub fn load(path: &Path) -> Result<Vec<CatalogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read(path)?;
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match parse(&content, path) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            warn!("{}; it will be recreated", e);
            Ok(Vec::new())
        }
    }
}

/// Serializes a document the way it is stored on disk.
pub fn to_json(document: &CatalogDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Replaces the file at `path` with `contents`.
///
/// The new contents are written to a temporary file in the same directory
/// and renamed over the target, so readers never observe a partial file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Persists a catalog document.
pub fn persist(path: &Path, document: &CatalogDocument) -> Result<()> {
    write_atomic(path, &to_json(document)?)
}

/// Writes the change log: one line per added entry, no trailing newline.
pub fn write_change_log(path: &Path, added: &[CatalogEntry]) -> Result<()> {
    let lines: Vec<String> = added.iter().map(CatalogEntry::change_log_line).collect();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, lines.join("\n"))?;
    Ok(())
}
