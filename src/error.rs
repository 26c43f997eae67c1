//! # Error Handling
//!
//! This module defines the centralized error type for the `icon-mirror`
//! pipeline. It uses the `thiserror` library to create a single `Error` enum
//! covering every failure mode, with messages that name the offending source,
//! URL, or file.
//!
//! ## Recoverable vs. fatal
//!
//! Most variants describe a failure of a single item (one source manifest, one
//! icon download) and are handled by the phase that produced them: the phase
//! logs a warning and carries on without that item. These are:
//!
//! - `SourceUnavailable`: a manifest could not be fetched or decoded.
//! - `AssetUnavailable`: an icon download failed or returned an empty body.
//! - `UnsupportedFormat`: an icon was served with a content type outside the
//!   image allow-list.
//! - `CatalogCorrupt`: the previously persisted catalog could not be parsed.
//!
//! `ConfigMissing` is the only condition that aborts a whole run. The
//! remaining variants wrap lower-level failures (I/O, JSON, URL parsing) that
//! surface while reading configuration or persisting results.

use thiserror::Error;

/// Main error type for icon-mirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// An upstream manifest could not be retrieved or decoded.
    #[error("Source '{source_label}' unavailable ({url}): {message}")]
    SourceUnavailable {
        source_label: String,
        url: String,
        message: String,
    },

    /// An icon download failed, or the server returned an empty body.
    #[error("Asset unavailable: {url} - {message}")]
    AssetUnavailable { url: String, message: String },

    /// The icon was served with a content type outside the allow-list.
    #[error("Unsupported MIME type '{mime}' for {url}")]
    UnsupportedFormat { url: String, mime: String },

    /// The persisted catalog exists but could not be parsed.
    #[error("Catalog '{path}' is corrupt: {message}")]
    CatalogCorrupt { path: String, message: String },

    /// The source list file does not exist.
    #[error("Source list not found: {path}")]
    ConfigMissing { path: String },

    /// The source list (or another configuration value) is malformed.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A transport-level HTTP failure.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON encoding or decoding error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// The download worker pool could not be started.
    #[error("Worker pool error: {message}")]
    ThreadPool { message: String },
}

impl Error {
    /// Whether this error only affects a single item and should be logged
    /// rather than aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::SourceUnavailable { .. }
                | Error::AssetUnavailable { .. }
                | Error::UnsupportedFormat { .. }
                | Error::CatalogCorrupt { .. }
                | Error::Network { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
