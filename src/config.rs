//! # Run Configuration and Source List
//!
//! This module defines the immutable configuration a mirror run is executed
//! with, and the parser for the source list that names every upstream
//! manifest.
//!
//! ## Key Components
//!
//! - **`MirrorConfig`**: Every path, timeout and tunable a run needs. Built
//!   once by the command layer and passed by reference into each phase; no
//!   phase reads the environment or global state.
//!
//! - **`SourceConfig`**: One upstream manifest: a display label, the manifest
//!   URL, the path the rewritten manifest is written to, and the author name
//!   derived from that path.
//!
//! ## Source list format
//!
//! One source per line, comma separated:
//!
//! ```text
//! # label, manifest_url, output_path
//! Koolson Icons, https://example.com/koolson.json, Koolson_icons.json
//! ```
//!
//! Fields are trimmed. Blank lines and lines whose first field starts with `#`
//! are ignored, as are rows with fewer than three fields.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use log::debug;
use url::Url;

use crate::defaults;
use crate::error::{Error, Result};

/// Immutable configuration for a single mirror run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Directory every relative path below (and every source's output path)
    /// is resolved against.
    pub root: PathBuf,
    /// Prefix prepended to every stored asset path to form its canonical URL.
    /// `None` produces bare relative paths.
    pub cdn_base: Option<String>,
    /// Source list file.
    pub sources_file: PathBuf,
    /// Directory holding `{hash}.{ext}` asset files, relative to `root`.
    /// Used verbatim in canonical URLs.
    pub assets_dir: PathBuf,
    /// Persisted catalog.
    pub catalog_path: PathBuf,
    /// Change log written when new entries were added.
    pub change_log_path: PathBuf,
    /// Commit message written after every run.
    pub commit_message_path: PathBuf,
    /// Top-level catalog name.
    pub catalog_name: String,
    /// Per-request timeout for manifests.
    pub manifest_timeout: Duration,
    /// Per-request timeout for icon downloads.
    pub asset_timeout: Duration,
    /// Size of the download worker pool.
    pub workers: usize,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            cdn_base: None,
            sources_file: defaults::sources_file(),
            assets_dir: PathBuf::from(defaults::ASSETS_DIR),
            catalog_path: PathBuf::from(defaults::CATALOG_FILE),
            change_log_path: PathBuf::from(defaults::CHANGE_LOG_FILE),
            commit_message_path: PathBuf::from(defaults::COMMIT_MESSAGE_FILE),
            catalog_name: defaults::CATALOG_NAME.to_string(),
            manifest_timeout: defaults::MANIFEST_TIMEOUT,
            asset_timeout: defaults::ASSET_TIMEOUT,
            workers: defaults::worker_count(),
        }
    }
}

impl MirrorConfig {
    /// Resolves a configured path against the working root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Forms the canonical URL for an asset stored at `relative_path`.
    ///
    /// Path separators are normalized to `/` so URLs are identical across
    /// platforms. `.` segments are dropped. A root is kept only when there is
    /// no CDN base to append to.
    pub fn canonical_url(&self, relative_path: &Path) -> String {
        let posix = relative_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                Component::ParentDir => Some("..".into()),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        match &self.cdn_base {
            Some(base) => format!("{}{}", base, posix),
            None if relative_path.has_root() => format!("/{}", posix),
            None => posix,
        }
    }
}

/// One upstream manifest to mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Human readable label, used in catalog descriptions and log lines.
    pub label: String,
    /// Where the upstream manifest is published.
    pub manifest_url: String,
    /// Where the rewritten manifest is written.
    pub output_path: PathBuf,
    /// Author derived from `output_path`.
    pub author: String,
}

impl SourceConfig {
    pub fn new(label: &str, manifest_url: &str, output_path: impl Into<PathBuf>) -> Self {
        let output_path = output_path.into();
        let author = author_from_path(&output_path);
        Self {
            label: label.to_string(),
            manifest_url: manifest_url.to_string(),
            output_path,
            author,
        }
    }
}

/// Derives the author from an output path: the file stem up to the first `_`.
pub fn author_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy())
        .and_then(|stem| stem.split('_').next().map(str::to_string))
        .unwrap_or_default()
}

/// Splits one source list row into trimmed fields.
///
/// A field wrapped in double quotes may contain commas; `""` inside it is a
/// literal quote.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                quoted = true;
            }
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());

    fields
}

/// Parses source list text into an ordered list of sources.
pub fn parse_sources(content: &str) -> Vec<SourceConfig> {
    let mut sources = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let fields = split_fields(line);
        if fields.first().is_none_or(|first| first.is_empty() || first.starts_with('#')) {
            continue;
        }
        if fields.len() < 3 {
            debug!(
                "Skipping source list line {}: expected 3 fields, found {}",
                index + 1,
                fields.len()
            );
            continue;
        }
        sources.push(SourceConfig::new(&fields[0], &fields[1], fields[2].as_str()));
    }

    sources
}

/// Reads and parses the source list at `path`.
///
/// A missing file is the one fatal configuration error: without sources there
/// is nothing to mirror.
pub fn load_sources<P: AsRef<Path>>(path: P) -> Result<Vec<SourceConfig>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::ConfigMissing {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    Ok(parse_sources(&content))
}

/// Checks that every source has an absolute http(s) manifest URL and a
/// non-empty output path, and that no two sources share an output path.
pub fn validate_sources(sources: &[SourceConfig]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();

    for source in sources {
        let url = Url::parse(&source.manifest_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::ConfigParse {
                message: format!(
                    "source '{}' uses unsupported scheme '{}'",
                    source.label,
                    url.scheme()
                ),
                hint: Some("manifest URLs must be http or https".to_string()),
            });
        }
        if source.output_path.as_os_str().is_empty() {
            return Err(Error::ConfigParse {
                message: format!("source '{}' has an empty output path", source.label),
                hint: None,
            });
        }
        if !seen.insert(source.output_path.clone()) {
            return Err(Error::ConfigParse {
                message: format!(
                    "output path '{}' is used by more than one source",
                    source.output_path.display()
                ),
                hint: Some("each source needs its own rewritten manifest file".to_string()),
            });
        }
    }

    Ok(())
}
