//! # HTTP Access
//!
//! Every network call the pipeline makes goes through the `HttpClient` trait,
//! so the phases can be exercised in tests with a scripted client and no real
//! network.
//!
//! `UreqClient` is the production implementation. It shares one connection
//! pool across all worker threads, applies a per-request timeout, and retries
//! transport failures (DNS, refused or reset connections, timeouts) a bounded
//! number of times. HTTP error statuses are never retried; they are returned
//! as a response so the caller decides what a failure means.

use std::io::Read;
use std::time::Duration;

use log::debug;

use crate::defaults;
use crate::error::{Error, Result};

/// A fully buffered HTTP response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Raw `Content-Type` header, parameters included.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The media type of the `Content-Type` header, without parameters.
    pub fn mime_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
    }
}

/// Trait for HTTP GET requests - allows mocking in tests
pub trait HttpClient: Send + Sync {
    /// Performs a GET request and buffers the full body.
    ///
    /// Returns `Err` only for transport failures; any response that arrives,
    /// whatever its status, is returned as `Ok`.
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;
}

/// `HttpClient` backed by a shared `ureq::Agent`.
pub struct UreqClient {
    agent: ureq::Agent,
    retries: u32,
}

impl UreqClient {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .max_idle_connections(100)
            .max_idle_connections_per_host(100)
            .user_agent(concat!("icon-mirror/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            retries: defaults::TRANSPORT_RETRIES,
        }
    }

    fn get_once(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let response = match self.agent.get(url).timeout(timeout).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(Error::Network {
                    url: url.to_string(),
                    message: transport.to_string(),
                });
            }
        };

        let status = response.status();
        let content_type = response.header("Content-Type").map(str::to_string);
        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| Error::Network {
                url: url.to_string(),
                message: format!("Failed to read response: {}", e),
            })?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqClient {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let mut attempt = 0;
        loop {
            match self.get_once(url, timeout) {
                Err(Error::Network { message, .. }) if attempt < self.retries => {
                    attempt += 1;
                    debug!("Retrying {} (attempt {}): {}", url, attempt, message);
                }
                other => return other,
            }
        }
    }
}
