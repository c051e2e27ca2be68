//! HTTP snapshot source: one GET against the relay's canvas endpoint.
//!
//! DESIGN
//! ======
//! The relay's read surface is a single endpoint: `GET {base}/canvas`
//! returns a JSON object whose `canvas` field holds the full-grid
//! encoding. The response is read as text first and parsed by a pure
//! helper, so malformed payloads are testable without standing up a
//! server. Timeouts are fixed at client construction; a hung relay turns
//! into a plain [`FetchError::Transport`] instead of a stuck refresh.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{FetchError, SnapshotSource};

/// Path of the full-snapshot endpoint, relative to the relay base URL.
const CANVAS_PATH: &str = "/canvas";

/// Total time budget for one snapshot request.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Time budget for establishing the connection.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// [`SnapshotSource`] that pulls from the relay over HTTP.
pub struct HttpSnapshotSource {
    http: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    /// Builds a source for the relay at `base_url` — scheme and authority,
    /// for example `https://canvas.example.org`. A trailing slash is
    /// tolerated.
    ///
    /// # Errors
    ///
    /// [`FetchError::Transport`] when the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let url = format!("{}{CANVAS_PATH}", base_url.trim_end_matches('/'));
        Ok(Self { http, url })
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(FetchError::Transport(format!("status {status}")));
        }
        parse_snapshot(&body)
    }
}

/// Wire shape of the relay's snapshot response.
#[derive(Deserialize)]
struct SnapshotBody {
    canvas: String,
}

/// Extracts the canvas encoding from a snapshot response body.
fn parse_snapshot(body: &str) -> Result<String, FetchError> {
    let parsed: SnapshotBody =
        serde_json::from_str(body).map_err(|err| FetchError::Payload(err.to_string()))?;
    Ok(parsed.canvas)
}

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;
