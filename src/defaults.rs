//! Default values for icon-mirror configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

/// Source list read when `--sources` is not given.
pub const SOURCES_FILE: &str = "config.csv";

/// Directory holding the content-addressed icon files.
pub const ASSETS_DIR: &str = "icons/assets";

/// The aggregated catalog of every distinct icon.
pub const CATALOG_FILE: &str = "icons/allinone.json";

/// Plain-text list of entries added by the last run.
pub const CHANGE_LOG_FILE: &str = "update.log";

/// Commit message rendered for the last run.
pub const COMMIT_MESSAGE_FILE: &str = "commit_message.txt";

/// Top-level `name` written into the catalog.
pub const CATALOG_NAME: &str = "Emby Icons";

/// Timeout for a single manifest request.
pub const MANIFEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a single icon download.
pub const ASSET_TIMEOUT: Duration = Duration::from_secs(20);

/// How many times a transport failure is retried before giving up.
pub const TRANSPORT_RETRIES: u32 = 3;

/// Returns the default source list path.
pub fn sources_file() -> PathBuf {
    PathBuf::from(SOURCES_FILE)
}

/// Returns the default download worker count: twice the available
/// parallelism, falling back to 2 when it cannot be determined.
pub fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(2)
}

/// Builds the jsDelivr CDN prefix for a GitHub `owner/repo` slug.
pub fn jsdelivr_base(repo: &str) -> String {
    format!("https://cdn.jsdelivr.net/gh/{}@main/", repo.trim_matches('/'))
}
