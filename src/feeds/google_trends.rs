//! Google Trends daily trending searches.
//!
//! The RSS endpoint intermittently blocks automated clients, so the fetcher
//! walks an ordered list of candidate URLs (primary domain, country domain,
//! then a reader proxy in front of each) and keeps the first one that yields
//! a usable document.
//!
//! # Candidate acceptance
//!
//! A candidate counts as successful only when it answers 2xx, contains a
//! document start marker, and yields at least one item. A proxy answering
//! with an error page therefore falls through to the next mirror.

use super::Fetcher;
use super::fallback::first_success;
use super::rss::{extract_document, parse_feed_items};
use crate::config::GoogleTrendsConfig;
use crate::errors::FetchError;
use crate::http::Transport;
use crate::models::{FeedBatch, FeedTags, RankedItem};
use crate::utils::{local_date, truncate_for_log, ymd};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Clone)]
pub struct GoogleTrendsFetcher {
    geo: String,
    lang: String,
    utc_offset_hours: i32,
    accept_language: String,
    candidates: Vec<String>,
}

impl GoogleTrendsFetcher {
    pub fn from_config(config: &GoogleTrendsConfig) -> Self {
        Self {
            geo: config.geo.clone(),
            lang: config.lang.clone(),
            utc_offset_hours: config.utc_offset_hours,
            accept_language: config.accept_language.clone(),
            candidates: config.candidate_urls(),
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    fn explore_url(&self) -> String {
        format!(
            "https://trends.google.com/trends/trendingsearches/daily?geo={}",
            self.geo
        )
    }
}

/// Fetch one candidate and parse it, failing unless it yields items.
async fn try_candidate<T: Transport>(
    transport: &T,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<Vec<RankedItem>, FetchError> {
    let body = transport.get_text(url, headers).await?;
    let Some(document) = extract_document(&body) else {
        debug!(%url, preview = %truncate_for_log(&body, 200), "No document marker");
        return Err(FetchError::parse(url, "xml not found"));
    };
    let items = parse_feed_items(document);
    if items.is_empty() {
        return Err(FetchError::parse(url, "feed has no items"));
    }
    Ok(items)
}

impl Fetcher for GoogleTrendsFetcher {
    fn file_name(&self) -> &'static str {
        "trends_google.json"
    }

    fn tags(&self) -> FeedTags {
        FeedTags::new("google_trends_rss")
            .geo(self.geo.clone())
            .lang(self.lang.clone())
    }

    fn fallback_date(&self, now: DateTime<Utc>) -> String {
        ymd(local_date(now, self.utc_offset_hours))
    }

    #[instrument(
        level = "info",
        skip_all,
        fields(geo = %self.geo, candidates = self.candidates().len())
    )]
    async fn fetch<T: Transport>(
        &self,
        transport: &T,
        now: DateTime<Utc>,
    ) -> Result<FeedBatch, FetchError> {
        let headers = [
            ("user-agent", BROWSER_USER_AGENT),
            ("accept", "*/*"),
            ("accept-language", self.accept_language.as_str()),
        ];
        let headers = &headers[..];

        let (index, mut items) = first_success(&self.candidates, |url| async move {
            try_candidate(transport, url, headers).await
        })
        .await?;

        let explore = self.explore_url();
        for item in items.iter_mut().filter(|item| item.url.is_empty()) {
            item.url = explore.clone();
        }

        info!(
            count = items.len(),
            mirror = index,
            "Parsed Google Trends items"
        );
        Ok(FeedBatch {
            date: self.fallback_date(now),
            items,
        })
    }
}
