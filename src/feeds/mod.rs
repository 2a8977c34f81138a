//! Trending feed fetchers.
//!
//! Each fetcher turns one upstream feed into a [`FeedBatch`] of ranked items.
//! They share the [`Fetcher`] capability so the builder and the persistence
//! guard never need to know which feed they are handling.
//!
//! # Supported Feeds
//!
//! | Feed | Module | Upstream | Snapshot file |
//! |------|--------|----------|---------------|
//! | Wikipedia | [`wikipedia`] | Wikimedia pageviews REST API | `wiki.json` |
//! | Google Trends | [`google_trends`] | Daily trending searches RSS, with mirrors | `trends_google.json` |
//! | Hacker News | [`hacker_news`] | Algolia search API | `hn.json` |
//! | App Store | [`app_store`] | Apple Marketing Tools JSON | `apps.json` |
//!
//! # Common Patterns
//!
//! - All HTTP goes through [`Transport`], so fetchers run against canned
//!   responses in tests
//! - The current instant is passed in, never read from the clock, so date
//!   handling is deterministic
//! - Parsing lives in a pure function next to each fetcher

pub mod app_store;
pub mod fallback;
pub mod google_trends;
pub mod hacker_news;
pub mod rss;
pub mod wikipedia;

use crate::config::RefreshConfig;
use crate::errors::FetchError;
use crate::http::Transport;
use crate::models::{FeedBatch, FeedTags};
use chrono::{DateTime, Utc};
use clap::ValueEnum;

use app_store::AppStoreFetcher;
use google_trends::GoogleTrendsFetcher;
use hacker_news::HackerNewsFetcher;
use wikipedia::WikipediaFetcher;

/// Capability shared by every feed.
pub trait Fetcher {
    /// Name of the snapshot document this feed owns.
    fn file_name(&self) -> &'static str;

    /// Tags stamped onto every envelope of this feed.
    fn tags(&self) -> FeedTags;

    /// Date for an envelope built without upstream data: the day a
    /// successful fetch at `now` would report, in the feed's own timezone.
    fn fallback_date(&self, now: DateTime<Utc>) -> String;

    /// Fetch and normalize the feed.
    async fn fetch<T: Transport>(
        &self,
        transport: &T,
        now: DateTime<Utc>,
    ) -> Result<FeedBatch, FetchError>;
}

/// Feed selector used on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum FeedName {
    Wiki,
    Trends,
    Hn,
    Apps,
}

impl FeedName {
    pub fn all() -> Vec<FeedName> {
        vec![FeedName::Wiki, FeedName::Trends, FeedName::Hn, FeedName::Apps]
    }
}

/// One of the concrete fetchers.
#[derive(Debug, Clone)]
pub enum Feed {
    Wikipedia(WikipediaFetcher),
    GoogleTrends(GoogleTrendsFetcher),
    HackerNews(HackerNewsFetcher),
    AppStore(AppStoreFetcher),
}

impl Feed {
    pub fn from_config(name: FeedName, config: &RefreshConfig) -> Self {
        match name {
            FeedName::Wiki => Feed::Wikipedia(WikipediaFetcher::from_config(&config.wikipedia)),
            FeedName::Trends => {
                Feed::GoogleTrends(GoogleTrendsFetcher::from_config(&config.google_trends))
            }
            FeedName::Hn => Feed::HackerNews(HackerNewsFetcher::from_config(&config.hacker_news)),
            FeedName::Apps => Feed::AppStore(AppStoreFetcher::from_config(&config.app_store)),
        }
    }
}

impl Fetcher for Feed {
    fn file_name(&self) -> &'static str {
        match self {
            Feed::Wikipedia(f) => f.file_name(),
            Feed::GoogleTrends(f) => f.file_name(),
            Feed::HackerNews(f) => f.file_name(),
            Feed::AppStore(f) => f.file_name(),
        }
    }

    fn tags(&self) -> FeedTags {
        match self {
            Feed::Wikipedia(f) => f.tags(),
            Feed::GoogleTrends(f) => f.tags(),
            Feed::HackerNews(f) => f.tags(),
            Feed::AppStore(f) => f.tags(),
        }
    }

    fn fallback_date(&self, now: DateTime<Utc>) -> String {
        match self {
            Feed::Wikipedia(f) => f.fallback_date(now),
            Feed::GoogleTrends(f) => f.fallback_date(now),
            Feed::HackerNews(f) => f.fallback_date(now),
            Feed::AppStore(f) => f.fallback_date(now),
        }
    }

    async fn fetch<T: Transport>(
        &self,
        transport: &T,
        now: DateTime<Utc>,
    ) -> Result<FeedBatch, FetchError> {
        match self {
            Feed::Wikipedia(f) => f.fetch(transport, now).await,
            Feed::GoogleTrends(f) => f.fetch(transport, now).await,
            Feed::HackerNews(f) => f.fetch(transport, now).await,
            Feed::AppStore(f) => f.fetch(transport, now).await,
        }
    }
}

/// Decode a JSON body, tagging failures with the URL it came from.
pub(crate) fn decode_json<D: serde::de::DeserializeOwned>(
    url: &str,
    body: &str,
) -> Result<D, FetchError> {
    serde_json::from_str(body)
        .map_err(|e| FetchError::parse(url, e))
}
