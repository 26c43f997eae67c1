//! # Icon Mirror Library
//!
//! This library aggregates icon sets published as independent JSON manifests
//! by multiple upstream maintainers. It mirrors every referenced image into a
//! single content-addressed store, keeps one catalog of every distinct icon,
//! and rewrites each upstream manifest so its URLs point at the mirror.
//!
//! ## Quick Example
//!
//! ```
//! use icon_mirror::catalog::{sort_entries, CatalogEntry};
//! use icon_mirror::config::parse_sources;
//!
//! let sources = parse_sources("# label, url, path\nKoolson, https://example.com/k.json, Koolson_icons.json\n");
//! assert_eq!(sources.len(), 1);
//! assert_eq!(sources[0].author, "Koolson");
//!
//! let mut entries = vec![
//!     CatalogEntry::new("h1", "netflix", "a.png", 10, ""),
//!     CatalogEntry::new("h2", "Netflix", "b.png", 20, ""),
//! ];
//! sort_entries(&mut entries);
//! assert_eq!(entries[0].canonical_url, "b.png");
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: The immutable `MirrorConfig` a run is
//!   executed with, and the source list naming every upstream manifest.
//! - **HTTP (`http`)**: The `HttpClient` trait every network call goes
//!   through, with a `ureq` implementation for production use.
//! - **Catalog (`catalog`)**: The persisted aggregate of distinct icons, its
//!   ordering, and atomic persistence.
//! - **Phases (`phases`)**: The four-stage pipeline that fetches, deduplicates,
//!   merges and rewrites.
//! - **Reporting (`report`)**: Turns a run's additions into a commit message.
//!
//! ## Execution Flow
//!
//! The main entry point is `phases::orchestrator::execute_run`:
//!
//! 1.  **Fetch**: Retrieve every manifest in parallel and extract its icons.
//! 2.  **Dedup**: Download every icon on a bounded worker pool and store it
//!     once per content hash.
//! 3.  **Merge**: Group by hash, merge with the prior catalog by canonical URL,
//!     and persist only if something was added.
//! 4.  **Rewrite**: Point each fetched manifest at the mirrored assets.
//!
//! Failures of a single source or icon are logged and skipped; they never
//! abort the run.

pub mod catalog;
pub mod config;
pub mod defaults;
pub mod error;
pub mod http;
pub mod output;
pub mod phases;
pub mod report;

#[cfg(test)]
mod catalog_proptest;
