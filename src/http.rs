//! HTTP access for the feed fetchers.
//!
//! Fetchers never talk to `reqwest` directly; they go through the
//! [`Transport`] trait so the same parsing and fallback code can run against
//! canned responses in tests.
//!
//! # Architecture
//!
//! - [`Transport`]: Core trait defining a text GET
//! - [`HttpTransport`]: `reqwest`-backed implementation used by the binary
//! - `stub::StubTransport`: test-only implementation with a call log

use crate::config::HttpConfig;
use crate::errors::FetchError;
use reqwest::header::USER_AGENT;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Trait for fetching a URL as text.
///
/// Implementors must map a non-2xx response to [`FetchError::Status`], a
/// transport failure to [`FetchError::Network`] and a body that is not text
/// to [`FetchError::Parse`].
pub trait Transport {
    /// GET `url` with the given extra headers and return the body.
    ///
    /// A `user-agent` entry in `headers` replaces the transport default.
    async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpTransport {
    /// Build a client from the `http` config section.
    ///
    /// Without `timeout_secs` the client keeps reqwest's defaults.
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            user_agent: config.user_agent.clone(),
        })
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let mut request = self.client.get(url);
        if !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(USER_AGENT.as_str()))
        {
            request = request.header(USER_AGENT, self.user_agent.as_str());
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "request failed");
            FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "upstream returned non-success status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let body = decode_body(url, &bytes)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "fetched"
        );
        Ok(body)
    }
}

/// Decode a response body as UTF-8.
fn decode_body(url: &str, bytes: &[u8]) -> Result<String, FetchError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| FetchError::parse(url, e))
}
