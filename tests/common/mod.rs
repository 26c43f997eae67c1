//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let client = ScriptedClient::new().json("https://up/a.json", r#"{"icons": []}"#);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use icon_mirror::error::{Error, Result};
use icon_mirror::http::{HttpClient, HttpResponse};

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use super::{manifest, ScriptedClient};
    pub use assert_fs::prelude::*;
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;
}

/// An `HttpClient` that serves canned responses and records every request.
///
/// URLs without a scripted response fail with a transport error.
#[derive(Default)]
pub struct ScriptedClient {
    responses: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: u16, content_type: &str, body: &[u8]) -> Self {
        self.responses.insert(
            url.to_string(),
            HttpResponse {
                status,
                content_type: Some(content_type.to_string()),
                body: body.to_vec(),
            },
        );
        self
    }

    pub fn json(self, url: &str, body: &str) -> Self {
        self.respond(url, 200, "application/json", body.as_bytes())
    }

    pub fn png(self, url: &str, body: &[u8]) -> Self {
        self.respond(url, 200, "image/png", body)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for ScriptedClient {
    fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Network {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
    }
}

/// Builds an upstream manifest listing `(name, url)` icons.
#[allow(dead_code)]
pub fn manifest(name: &str, icons: &[(&str, &str)]) -> String {
    let icons: Vec<serde_json::Value> = icons
        .iter()
        .map(|(icon_name, url)| serde_json::json!({"name": icon_name, "url": url}))
        .collect();
    serde_json::json!({
        "name": name,
        "description": format!("{} upstream", name),
        "icons": icons,
    })
    .to_string()
}
