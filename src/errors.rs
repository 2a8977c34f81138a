//! Error types for fetching feeds and persisting snapshots.
//!
//! Fetch failures never escape a single feed: the builder turns them into an
//! `ok: false` envelope. Store failures are the only ones that fail a run.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`FetchError`], used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UpstreamUnavailable,
    ParseFailure,
    AllMirrorsExhausted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UpstreamUnavailable => "upstream_unavailable",
            FailureKind::ParseFailure => "parse_failure",
            FailureKind::AllMirrorsExhausted => "all_mirrors_exhausted",
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// The upstream answered with a non-2xx status.
    #[error("fetch failed: {status} {url}")]
    Status { status: u16, url: String },

    /// The request never produced a response (DNS, TLS, connect, timeout).
    #[error("fetch failed: {url}: {message}")]
    Network { url: String, message: String },

    /// The body was not in the expected shape.
    #[error("unexpected response from {url}: {message}")]
    Parse { url: String, message: String },

    /// Every candidate of a fallback chain failed.
    #[error("all {attempts} candidates failed; last error: {last}")]
    AllMirrorsExhausted { attempts: usize, last: Box<FetchError> },
}

impl FetchError {
    pub fn parse(url: impl Into<String>, message: impl ToString) -> Self {
        FetchError::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Status { .. } | FetchError::Network { .. } => {
                FailureKind::UpstreamUnavailable
            }
            FetchError::Parse { .. } => FailureKind::ParseFailure,
            FetchError::AllMirrorsExhausted { .. } => FailureKind::AllMirrorsExhausted,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid candidate url {url:?}: {source}")]
    CandidateUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("utc offset {0}h is out of range")]
    Offset(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_names_status_and_url() {
        let e = FetchError::Status {
            status: 503,
            url: "https://hn.algolia.com/api/v1/search".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "fetch failed: 503 https://hn.algolia.com/api/v1/search"
        );
        assert_eq!(e.kind(), FailureKind::UpstreamUnavailable);
    }

    #[test]
    fn test_exhausted_wraps_last_error() {
        let e = FetchError::AllMirrorsExhausted {
            attempts: 4,
            last: Box::new(FetchError::parse("https://r.jina.ai/x", "xml not found")),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("all 4 candidates failed"));
        assert!(msg.contains("xml not found"));
        assert_eq!(e.kind().as_str(), "all_mirrors_exhausted");
    }
}
