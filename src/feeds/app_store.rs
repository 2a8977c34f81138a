//! App Store top free apps via the Apple Marketing Tools feed.

use super::{Fetcher, decode_json};
use crate::config::AppStoreConfig;
use crate::errors::FetchError;
use crate::http::Transport;
use crate::models::{FeedBatch, FeedTags, RankedItem};
use crate::utils::{local_date, ymd};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct AppsResponse {
    feed: AppsFeed,
}

#[derive(Debug, Deserialize)]
struct AppsFeed {
    updated: Option<String>,
    #[serde(default)]
    results: Vec<App>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct App {
    #[serde(default)]
    name: String,
    artist_name: Option<String>,
    #[serde(default)]
    url: String,
    artwork_url100: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppStoreFetcher {
    country: String,
}

impl AppStoreFetcher {
    pub fn from_config(config: &AppStoreConfig) -> Self {
        Self {
            country: config.country.clone(),
        }
    }

    pub fn feed_url(&self) -> String {
        format!(
            "https://rss.applemarketingtools.com/api/v2/{}/apps/top-free/50/apps.json",
            self.country
        )
    }
}

/// Chart order is the ranking; dates come from the feed's own `updated`
/// stamp when it starts with a `YYYY-MM-DD` date.
fn parse_feed(url: &str, body: &str) -> Result<(Option<String>, Vec<RankedItem>), FetchError> {
    let response: AppsResponse = decode_json(url, body)?;
    let date = response
        .feed
        .updated
        .as_deref()
        .and_then(|updated| updated.get(..10))
        .filter(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok())
        .map(str::to_string);

    let items = response
        .feed
        .results
        .into_iter()
        .enumerate()
        .map(|(index, app)| {
            let mut item = RankedItem::new(index as u32 + 1, app.name, app.url);
            item.artist_name = app.artist_name;
            item.artwork_url100 = app.artwork_url100;
            item
        })
        .collect();
    Ok((date, items))
}

impl Fetcher for AppStoreFetcher {
    fn file_name(&self) -> &'static str {
        "apps.json"
    }

    fn tags(&self) -> FeedTags {
        FeedTags::new("app_store_top_free")
            .country(self.country.clone())
    }

    fn fallback_date(&self, now: DateTime<Utc>) -> String {
        ymd(local_date(now, 0))
    }

    #[instrument(level = "info", skip_all, fields(country = %self.country))]
    async fn fetch<T: Transport>(
        &self,
        transport: &T,
        now: DateTime<Utc>,
    ) -> Result<FeedBatch, FetchError> {
        let url = self.feed_url();
        let body = transport.get_text(&url, &[]).await?;
        let (date, items) = parse_feed(&url, &body)?;

        info!(count = items.len(), "Parsed App Store chart");
        Ok(FeedBatch {
            date: date.unwrap_or_else(|| self.fallback_date(now)),
            items,
        })
    }
}
