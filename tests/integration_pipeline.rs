//! End-to-end tests for the mirror pipeline, driven through a scripted
//! HTTP client so no network is needed.

mod common;

use std::fs;
use std::path::Path;

use common::prelude::*;
use icon_mirror::catalog::{self, CatalogDocument, CatalogEntry};
use icon_mirror::config::{MirrorConfig, SourceConfig};
use icon_mirror::phases::dedup::content_hash;
use icon_mirror::phases::orchestrator::execute_run;
use serde_json::Value;

fn config_in(temp: &TempDir) -> MirrorConfig {
    MirrorConfig {
        root: temp.path().to_path_buf(),
        cdn_base: Some("https://cdn.example/".to_string()),
        workers: 4,
        ..MirrorConfig::default()
    }
}

fn alpha() -> SourceConfig {
    SourceConfig::new("Alpha Set", "https://alpha.example/icons.json", "Alpha_icons.json")
}

fn beta() -> SourceConfig {
    SourceConfig::new("Beta Set", "https://beta.example/icons.json", "Beta_icons.json")
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn asset_count(config: &MirrorConfig) -> usize {
    fs::read_dir(config.resolve(&config.assets_dir)).unwrap().count()
}

/// Identical bytes under two URLs from two sources collapse to one entry
/// with an alias, one stored file, and one canonical URL.
#[test]
fn test_identical_content_across_sources_is_deduplicated() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    let client = ScriptedClient::new()
        .json(
            "https://alpha.example/icons.json",
            &manifest("Alpha", &[("Netflix", "https://alpha.example/netflix.png")]),
        )
        .json(
            "https://beta.example/icons.json",
            &manifest("Beta", &[("NFLX", "https://beta.example/n.png")]),
        )
        .png("https://alpha.example/netflix.png", b"netflix-logo")
        .png("https://beta.example/n.png", b"netflix-logo");

    let outcome = execute_run(&[alpha(), beta()], &client, &config, None).unwrap();

    let hash = content_hash(b"netflix-logo");
    assert_eq!(outcome.catalog_size, 1);
    assert_eq!(outcome.added.len(), 1);
    let entry = &outcome.added[0];
    assert_eq!(entry.content_hash, hash);
    assert_eq!(entry.display_name, "Netflix");
    assert_eq!(entry.description, "source: Alpha Set | aliases: NFLX-Beta");
    assert_eq!(entry.canonical_url, format!("https://cdn.example/icons/assets/{}.png", hash));
    assert_eq!(asset_count(&config), 1);

    let alpha_out = read_json(&temp.path().join("Alpha_icons.json"));
    let beta_out = read_json(&temp.path().join("Beta_icons.json"));
    assert_eq!(alpha_out["icons"][0]["url"], entry.canonical_url.as_str());
    assert_eq!(beta_out["icons"][0]["url"], entry.canonical_url.as_str());
    assert_eq!(alpha_out["name"], "Alpha Set (CDN mirror)");
}

/// A source whose manifest returns HTTP 500 is skipped without failing the run.
#[test]
fn test_failed_source_does_not_abort_run() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    let client = ScriptedClient::new()
        .respond("https://alpha.example/icons.json", 500, "text/html", b"oops")
        .json(
            "https://beta.example/icons.json",
            &manifest("Beta", &[("Plex", "https://beta.example/plex.png")]),
        )
        .png("https://beta.example/plex.png", b"plex");

    let outcome = execute_run(&[alpha(), beta()], &client, &config, None).unwrap();

    assert_eq!(outcome.sources_fetched, 1);
    assert_eq!(outcome.catalog_size, 1);
    assert_eq!(outcome.added[0].display_name, "Plex");
    assert_eq!(outcome.manifests_written, 1);
    assert!(!temp.path().join("Alpha_icons.json").exists());

    let document = read_json(&config.resolve(&config.catalog_path));
    assert_eq!(document["icons"].as_array().unwrap().len(), 1);
}

/// An icon served as text/html never reaches the catalog, and its manifest
/// entry keeps the origin URL.
#[test]
fn test_unsupported_content_type_is_dropped() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    let client = ScriptedClient::new()
        .json(
            "https://alpha.example/icons.json",
            &manifest(
                "Alpha",
                &[
                    ("Good", "https://alpha.example/good.png"),
                    ("Page", "https://alpha.example/page"),
                ],
            ),
        )
        .png("https://alpha.example/good.png", b"good")
        .respond("https://alpha.example/page", 200, "text/html", b"<html></html>");

    let outcome = execute_run(&[alpha()], &client, &config, None).unwrap();

    assert_eq!(outcome.icons_listed, 2);
    assert_eq!(outcome.icons_stored, 1);
    let names: Vec<_> = outcome.added.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(names, vec!["Good"]);

    let rewritten = read_json(&temp.path().join("Alpha_icons.json"));
    assert_eq!(rewritten["icons"][1]["url"], "https://alpha.example/page");
    assert!(rewritten["icons"][0]["url"]
        .as_str()
        .unwrap()
        .starts_with("https://cdn.example/icons/assets/"));
}

/// Prior entries are kept, the new one is added and reported once.
#[test]
fn test_new_entry_merges_into_prior_catalog() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    let prior = CatalogDocument::new(
        "Emby Icons",
        ["Old"],
        vec![
            CatalogEntry::new("ha", "Apple", "https://cdn.example/icons/assets/ha.png", 5, "source: Old"),
            CatalogEntry::new("hb", "Zebra", "https://cdn.example/icons/assets/hb.png", 5, "source: Old"),
        ],
    );
    catalog::persist(&config.resolve(&config.catalog_path), &prior).unwrap();

    let client = ScriptedClient::new()
        .json(
            "https://alpha.example/icons.json",
            &manifest("Alpha", &[("Mango", "https://alpha.example/mango.png")]),
        )
        .png("https://alpha.example/mango.png", b"mango");

    let outcome = execute_run(&[alpha()], &client, &config, None).unwrap();

    assert_eq!(outcome.added.len(), 1);
    assert_eq!(outcome.added[0].display_name, "Mango");

    let document = read_json(&config.resolve(&config.catalog_path));
    let names: Vec<_> = document["icons"]
        .as_array()
        .unwrap()
        .iter()
        .map(|icon| icon["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Apple", "Mango", "Zebra"]);
    assert_eq!(
        document["description"],
        "Contains works from Alpha. Currently holds 3 unique icons."
    );

    let log = fs::read_to_string(config.resolve(&config.change_log_path)).unwrap();
    assert_eq!(log, format!("\"{}\": Mango", content_hash(b"mango")));
}

/// A second run over unchanged upstreams adds nothing and leaves the
/// catalog byte-for-byte identical.
#[test]
fn test_second_run_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    let client = ScriptedClient::new()
        .json(
            "https://alpha.example/icons.json",
            &manifest(
                "Alpha",
                &[
                    ("One", "https://alpha.example/1.png"),
                    ("Two", "https://alpha.example/2.png"),
                    ("Uno", "https://alpha.example/uno.png"),
                ],
            ),
        )
        .png("https://alpha.example/1.png", b"one")
        .png("https://alpha.example/2.png", b"two")
        .png("https://alpha.example/uno.png", b"one");

    let first = execute_run(&[alpha()], &client, &config, None).unwrap();
    assert_eq!(first.added.len(), 2);
    let catalog_path = config.resolve(&config.catalog_path);
    let before = fs::read(&catalog_path).unwrap();
    let manifest_before = fs::read(temp.path().join("Alpha_icons.json")).unwrap();

    let second = execute_run(&[alpha()], &client, &config, None).unwrap();

    assert!(second.added.is_empty());
    assert_eq!(second.catalog_size, 2);
    assert_eq!(fs::read(&catalog_path).unwrap(), before);
    assert_eq!(fs::read(temp.path().join("Alpha_icons.json")).unwrap(), manifest_before);
    assert_eq!(asset_count(&config), 2);
}

/// An unparseable prior catalog is treated as empty and replaced.
#[test]
fn test_corrupt_catalog_is_recreated() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    let catalog_path = config.resolve(&config.catalog_path);
    fs::create_dir_all(catalog_path.parent().unwrap()).unwrap();
    fs::write(&catalog_path, "{ not json").unwrap();
    let client = ScriptedClient::new()
        .json(
            "https://alpha.example/icons.json",
            &manifest("Alpha", &[("One", "https://alpha.example/1.png")]),
        )
        .png("https://alpha.example/1.png", b"one");

    let outcome = execute_run(&[alpha()], &client, &config, None).unwrap();

    assert_eq!(outcome.added.len(), 1);
    assert_eq!(catalog::load(&catalog_path).unwrap().len(), 1);
}

/// A prior catalog that is not valid UTF-8 is replaced instead of aborting
/// the run.
#[test]
fn test_non_utf8_catalog_is_recreated() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    let catalog_path = config.resolve(&config.catalog_path);
    fs::create_dir_all(catalog_path.parent().unwrap()).unwrap();
    fs::write(&catalog_path, [0xff, 0xfe, b'{', 0x80]).unwrap();
    let client = ScriptedClient::new()
        .json(
            "https://alpha.example/icons.json",
            &manifest("Alpha", &[("One", "https://alpha.example/1.png")]),
        )
        .png("https://alpha.example/1.png", b"one");

    let outcome = execute_run(&[alpha()], &client, &config, None).unwrap();

    assert_eq!(outcome.added.len(), 1);
    assert_eq!(catalog::load(&catalog_path).unwrap().len(), 1);
}

/// Every listed icon is requested exactly once, and nothing is requested
/// for a source that failed.
#[test]
fn test_each_icon_requested_once() {
    let temp = TempDir::new().unwrap();
    let config = config_in(&temp);
    let client = ScriptedClient::new().json(
        "https://alpha.example/icons.json",
        &manifest(
            "Alpha",
            &[
                ("A", "https://alpha.example/a.png"),
                ("B", "https://alpha.example/b.png"),
            ],
        ),
    );

    let outcome = execute_run(&[alpha(), beta()], &client, &config, None).unwrap();

    assert_eq!(outcome.icons_stored, 0);
    let mut requests = client.requests();
    requests.sort();
    assert_eq!(
        requests,
        vec![
            "https://alpha.example/a.png",
            "https://alpha.example/b.png",
            "https://alpha.example/icons.json",
            "https://beta.example/icons.json",
        ]
    );
    // Nothing stored, so the manifest keeps its origin URLs.
    let rewritten = read_json(&temp.path().join("Alpha_icons.json"));
    assert_eq!(rewritten["icons"][0]["url"], "https://alpha.example/a.png");
}
