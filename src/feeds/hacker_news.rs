//! Hacker News front page via the Algolia search API.

use super::{Fetcher, decode_json};
use crate::config::HackerNewsConfig;
use crate::errors::FetchError;
use crate::http::Transport;
use crate::models::{FeedBatch, FeedTags, MAX_ITEMS, RankedItem};
use crate::utils::{local_date, ymd};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

const NO_TITLE: &str = "(no title)";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    title: Option<String>,
    url: Option<String>,
    points: Option<u64>,
    num_comments: Option<u64>,
    #[serde(rename = "objectID")]
    object_id: String,
}

#[derive(Debug, Clone)]
pub struct HackerNewsFetcher {
    url: String,
}

impl HackerNewsFetcher {
    pub fn from_config(config: &HackerNewsConfig) -> Self {
        Self {
            url: config.url.clone(),
        }
    }
}

fn thread_url(object_id: &str) -> String {
    format!("https://news.ycombinator.com/item?id={object_id}")
}

fn parse_hits(url: &str, body: &str) -> Result<Vec<RankedItem>, FetchError> {
    let response: SearchResponse = decode_json(url, body)?;
    Ok(response
        .hits
        .into_iter()
        .take(MAX_ITEMS)
        .enumerate()
        .map(|(index, hit)| {
            let thread = thread_url(&hit.object_id);
            let title = hit
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| NO_TITLE.to_string());
            let link = hit
                .url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| thread.clone());

            let mut item = RankedItem::new(index as u32 + 1, title, link)
                .with_points(hit.points.unwrap_or(0));
            item.comments = Some(hit.num_comments.unwrap_or(0));
            item.hn = Some(thread);
            item
        })
        .collect())
}

impl Fetcher for HackerNewsFetcher {
    fn file_name(&self) -> &'static str {
        "hn.json"
    }

    fn tags(&self) -> FeedTags {
        FeedTags::new("hacker_news")
    }

    fn fallback_date(&self, now: DateTime<Utc>) -> String {
        ymd(local_date(now, 0))
    }

    #[instrument(level = "info", skip_all)]
    async fn fetch<T: Transport>(
        &self,
        transport: &T,
        now: DateTime<Utc>,
    ) -> Result<FeedBatch, FetchError> {
        let body = transport.get_text(&self.url, &[]).await?;
        let items = parse_hits(&self.url, &body)?;

        info!(count = items.len(), "Parsed Hacker News front page");
        Ok(FeedBatch {
            date: self.fallback_date(now),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::StubTransport;
    use chrono::TimeZone;
    use serde_json::json;

    const URL: &str = "https://hn.algolia.com/api/v1/search?tags=front_page";

    #[test]
    fn test_maps_points_comments_and_thread() {
        let body = json!({
            "hits": [
                {"title": "Show HN: A thing", "url": "https://thing.example",
                 "points": 321, "num_comments": 45, "objectID": "101"},
                {"title": "Ask HN: Why?", "url": null, "points": null,
                 "num_comments": null, "objectID": "102"},
                {"title": "", "url": "", "points": 3, "num_comments": 0, "objectID": "103"}
            ]
        })
        .to_string();

        let items = parse_hits(URL, &body).unwrap();
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].rank, 1);
        assert_eq!(items[0].points, Some(321));
        assert_eq!(items[0].comments, Some(45));
        assert_eq!(items[0].url, "https://thing.example");
        assert_eq!(
            items[0].hn.as_deref(),
            Some("https://news.ycombinator.com/item?id=101")
        );

        assert_eq!(items[1].points, Some(0));
        assert_eq!(items[1].url, "https://news.ycombinator.com/item?id=102");

        assert_eq!(items[2].title, "(no title)");
        assert_eq!(items[2].url, "https://news.ycombinator.com/item?id=103");
    }

    #[test]
    fn test_caps_at_fifty() {
        let hits: Vec<_> = (0..80)
            .map(|i| json!({"title": format!("t{i}"), "points": i, "objectID": i.to_string()}))
            .collect();
        let body = json!({ "hits": hits }).to_string();

        let items = parse_hits(URL, &body).unwrap();
        assert_eq!(items.len(), 50);
        assert_eq!(items[49].rank, 50);
        // native order is kept, not re-sorted by points
        assert_eq!(items[0].title, "t0");
    }

    #[tokio::test]
    async fn test_fetch_dates_in_utc() {
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 16, 30, 0).unwrap();
        let stub = StubTransport::new().ok(URL, r#"{"hits": []}"#);
        let fetcher = HackerNewsFetcher::from_config(&HackerNewsConfig::default());

        let batch = fetcher.fetch(&stub, now).await.unwrap();
        assert_eq!(batch.date, "2025-05-05");
        assert!(batch.items.is_empty());
    }
}
