//! Phase 2: Asset Download and Deduplication
//!
//! This phase downloads the binary behind every icon entry from Phase 1 and
//! stores it in a content-addressed directory, so identical images published
//! under different URLs are stored exactly once.
//!
//! ## Process
//!
//! 1.  **Worker Pool**: Downloads run on a dedicated rayon pool sized by
//!     `MirrorConfig::workers` (twice the logical core count by default).
//!     There is no batch timeout; each request carries its own.
//!
//! 2.  **Per Icon**: GET the origin URL, reject error statuses and empty
//!     bodies, map the `Content-Type` to a file extension through a fixed
//!     allow-list, hash the exact bytes with MD5, and write them to
//!     `{assets_dir}/{hash}.{ext}` unless that file already exists.
//!
//! 3.  **Collection**: Workers push results into a shared, mutex-protected
//!     vector in whatever order they finish. Once every download has
//!     completed, results are sorted by their submission index so the merge
//!     phase always sees the same order for the same input.
//!
//! A failed icon is logged and dropped; it never affects other downloads.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use indicatif::ProgressBar;
use log::{debug, info, warn};
use md5::{Digest, Md5};
use rayon::prelude::*;

use super::{ContentResult, IconEntry};
use crate::config::MirrorConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;

/// Allow-listed image MIME types and the extension each is stored under.
pub const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
];

/// Looks up the storage extension for a MIME type.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    MIME_EXTENSIONS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(mime))
        .map(|(_, ext)| *ext)
}

/// Lowercase hex MD5 digest of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Executes Phase 2 of the pipeline.
///
/// Returns one `ContentResult` per successfully stored icon, ordered by the
/// icon's position in `icons`. Only failing to prepare the asset directory or
/// the worker pool is an error; individual downloads never fail the phase.
pub fn execute(
    icons: &[IconEntry],
    client: &dyn HttpClient,
    config: &MirrorConfig,
    progress: Option<&ProgressBar>,
) -> Result<Vec<ContentResult>> {
    fs::create_dir_all(config.resolve(&config.assets_dir))?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.max(1))
        .build()
        .map_err(|e| Error::ThreadPool {
            message: e.to_string(),
        })?;

    let results: Mutex<Vec<ContentResult>> = Mutex::new(Vec::with_capacity(icons.len()));

    pool.install(|| {
        icons.par_iter().enumerate().for_each(|(index, icon)| {
            match process_icon(icon, index, client, config) {
                Ok(result) => {
                    debug!("Stored {} as {}", icon.origin_url, result.stored_path.display());
                    // A poisoned lock means another worker panicked; the
                    // panic is re-raised by rayon once the scope ends.
                    if let Ok(mut collected) = results.lock() {
                        collected.push(result);
                    }
                }
                Err(e) => warn!("{}", e),
            }
            if let Some(bar) = progress {
                bar.inc(1);
            }
        });
    });

    let mut results = results.into_inner().map_err(|_| Error::LockPoisoned {
        context: "download results".to_string(),
    })?;
    results.sort_by_key(|result| result.submission_index);

    info!(
        "Stored {} of {} icons",
        results.len(),
        icons.len()
    );
    Ok(results)
}

/// Downloads, hashes and stores a single icon.
pub fn process_icon(
    icon: &IconEntry,
    submission_index: usize,
    client: &dyn HttpClient,
    config: &MirrorConfig,
) -> Result<ContentResult> {
    let unavailable = |message: String| Error::AssetUnavailable {
        url: icon.origin_url.clone(),
        message,
    };

    let response = client
        .get(&icon.origin_url, config.asset_timeout)
        .map_err(|e| unavailable(e.to_string()))?;
    if !response.is_success() {
        return Err(unavailable(format!("HTTP status {}", response.status)));
    }
    if response.body.is_empty() {
        return Err(unavailable("empty body".to_string()));
    }

    let mime = response.mime_type().unwrap_or_default();
    let ext = extension_for_mime(mime).ok_or_else(|| Error::UnsupportedFormat {
        url: icon.origin_url.clone(),
        mime: mime.to_string(),
    })?;

    let hash = content_hash(&response.body);
    let stored_path: PathBuf = config.assets_dir.join(format!("{}.{}", hash, ext));
    let target = config.resolve(&stored_path);
    if !target.exists() {
        fs::write(&target, &response.body)?;
    }

    Ok(ContentResult {
        icon: icon.clone(),
        submission_index,
        content_hash: hash,
        byte_size: response.body.len() as u64,
        stored_path,
        origin_url: icon.origin_url.clone(),
    })
}
