//! Phase 4: Manifest Rewrite
//!
//! This is the final phase of a mirror run. Each upstream manifest fetched in
//! Phase 1 is copied, re-labelled as a mirror, and has every icon URL replaced
//! with its canonical mirrored URL from Phase 3.
//!
//! Icons whose download failed have no mapping and keep their origin URL, so
//! a flaky upstream never shrinks a rewritten manifest. Icons without any
//! `url` are dropped since they can never be mirrored. All other fields pass
//! through unchanged.
//!
//! Sources are independent: a write failure for one manifest is logged and
//! the remaining manifests are still written.

use std::fs;

use log::{info, warn};
use serde_json::Value;

use super::merge::UrlMap;
use super::ManifestSet;
use crate::config::{MirrorConfig, SourceConfig};
use crate::error::Result;

/// Executes Phase 4 of the pipeline, returning how many manifests were
/// written.
pub fn execute(
    sources: &[SourceConfig],
    manifests: &ManifestSet,
    url_map: &UrlMap,
    config: &MirrorConfig,
) -> usize {
    let mut written = 0;
    for source in sources {
        let Some(original) = manifests.get(&source.output_path) else {
            continue;
        };
        match write_manifest(source, original, url_map, config) {
            Ok(()) => {
                info!("Rewrote {}", source.output_path.display());
                written += 1;
            }
            Err(e) => warn!(
                "Failed to write manifest '{}': {}",
                source.output_path.display(),
                e
            ),
        }
    }
    written
}

/// Produces the mirrored copy of one source's manifest.
pub fn rewrite_manifest(source: &SourceConfig, original: &Value, url_map: &UrlMap) -> Value {
    let mut document = original.clone();
    let Some(object) = document.as_object_mut() else {
        return document;
    };

    object.insert(
        "name".to_string(),
        Value::from(format!("{} (CDN mirror)", source.label)),
    );
    object.insert(
        "description".to_string(),
        Value::from(format!("Mirrored from: {}", source.manifest_url)),
    );

    let icons: Vec<Value> = object
        .get("icons")
        .and_then(Value::as_array)
        .map(|icons| {
            icons
                .iter()
                .filter_map(|icon| rewrite_icon(icon, url_map))
                .collect()
        })
        .unwrap_or_default();
    object.insert("icons".to_string(), Value::Array(icons));

    document
}

fn rewrite_icon(icon: &Value, url_map: &UrlMap) -> Option<Value> {
    let url = icon.get("url").and_then(Value::as_str).filter(|u| !u.is_empty())?;
    let mut icon = icon.clone();
    if let Some(canonical) = url_map.get(url) {
        icon["url"] = Value::from(canonical.as_str());
    }
    Some(icon)
}

fn write_manifest(
    source: &SourceConfig,
    original: &Value,
    url_map: &UrlMap,
    config: &MirrorConfig,
) -> Result<()> {
    let path = config.resolve(&source.output_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let document = rewrite_manifest(source, original, url_map);
    fs::write(&path, serde_json::to_string_pretty(&document)?)?;
    Ok(())
}
