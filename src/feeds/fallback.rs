//! First-success evaluation over an ordered list of equivalent endpoints.

use crate::errors::FetchError;
use std::future::Future;
use tracing::{info, warn};

/// Try `attempt` on each candidate in order and return the first success.
///
/// Candidates after the first success are never tried. When every candidate
/// fails the result is [`FetchError::AllMirrorsExhausted`] carrying the last
/// error; an empty list is exhausted with zero attempts.
///
/// # Returns
///
/// The index of the candidate that succeeded together with its value.
pub async fn first_success<'a, T, F, Fut>(
    candidates: &'a [String],
    mut attempt: F,
) -> Result<(usize, T), FetchError>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut last = None;
    for (index, candidate) in candidates.iter().enumerate() {
        match attempt(candidate.as_str()).await {
            Ok(value) => {
                info!(index, url = %candidate, "Candidate succeeded");
                return Ok((index, value));
            }
            Err(e) => {
                warn!(
                    index,
                    url = %candidate,
                    kind = e.kind().as_str(),
                    error = %e,
                    "Candidate failed"
                );
                last = Some(e);
            }
        }
    }

    Err(FetchError::AllMirrorsExhausted {
        attempts: candidates.len(),
        last: Box::new(last.unwrap_or_else(|| FetchError::Network {
            url: String::new(),
            message: "no candidates configured".to_string(),
        })),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Transport;
    use crate::http::stub::StubTransport;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let candidates = urls(&["https://m1", "https://m2", "https://m3"]);
        let stub = StubTransport::new()
            .status("https://m1", 429)
            .ok("https://m2", "two")
            .ok("https://m3", "three");
        let transport = &stub;

        let (index, body) = first_success(&candidates, |url| async move {
            transport.get_text(url, &[]).await
        })
        .await
        .unwrap();

        assert_eq!(index, 1);
        assert_eq!(body, "two");
        assert_eq!(stub.calls(), vec!["https://m1", "https://m2"]);
    }

    #[tokio::test]
    async fn test_all_failed_reports_last_error() {
        let candidates = urls(&["https://m1", "https://m2"]);
        let stub = StubTransport::new().status("https://m1", 500);
        let transport = &stub;

        let err = first_success(&candidates, |url| async move {
            transport.get_text(url, &[]).await
        })
        .await
        .unwrap_err();

        match err {
            FetchError::AllMirrorsExhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(
                    matches!(*last, FetchError::Network { ref url, .. } if url == "https://m2")
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_candidate_list_is_exhausted() {
        let candidates: Vec<String> = Vec::new();
        let err = first_success(&candidates, |_url| async { Ok::<_, FetchError>(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::AllMirrorsExhausted { attempts: 0, .. }));
    }
}
