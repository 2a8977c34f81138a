//! Data models for ranked feed items and the snapshot envelope.
//!
//! This module defines the structures written to (and read back from) the
//! snapshot files:
//! - [`RankedItem`]: One ranked entry of a trending feed
//! - [`Snapshot`]: The envelope wrapping status, feed tags and the item list
//! - [`FeedTags`]: The identifying tags (`source`, `lang`, `geo`, `country`)
//! - [`FeedBatch`]: What a fetcher hands to the builder before it is stamped
//!
//! Field names are camelCase on the wire because the ranking page consumes the
//! files directly.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of items in any snapshot.
pub const MAX_ITEMS: usize = 50;

/// A single ranked entry of a trending feed.
///
/// The metric is feed-specific and lands under its own key: `views` for
/// Wikipedia and Google Trends, `points` for Hacker News. App Store entries
/// are ranked by the chart order and carry no metric.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    /// 1-based position, dense within a snapshot.
    pub rank: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    pub url: String,
    /// Hacker News discussion thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url100: Option<String>,
}

impl RankedItem {
    /// Create an item with no metric and no feed-specific extras.
    pub fn new(rank: u32, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            rank,
            title: title.into(),
            views: None,
            points: None,
            comments: None,
            url: url.into(),
            hn: None,
            pub_date: None,
            artist_name: None,
            artwork_url100: None,
        }
    }

    pub fn with_views(mut self, views: u64) -> Self {
        self.views = Some(views);
        self
    }

    pub fn with_points(mut self, points: u64) -> Self {
        self.points = Some(points);
        self
    }

    /// The numeric metric this item is ranked by, whichever key it lives under.
    pub fn metric(&self) -> Option<u64> {
        self.views.or(self.points)
    }
}

/// Tags identifying which feed a snapshot came from.
///
/// Only `source` is always present; the rest depend on the feed
/// (`lang` for Wikipedia, `geo` for Google Trends, `country` for App Store).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedTags {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl FeedTags {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn geo(mut self, geo: impl Into<String>) -> Self {
        self.geo = Some(geo.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// Normalized fetcher output, before the builder wraps it in a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedBatch {
    /// Canonical date of the data in `YYYY-MM-DD` format.
    pub date: String,
    pub items: Vec<RankedItem>,
}

/// The envelope persisted for each feed.
///
/// A failed build produces the same shape with `ok: false`, an empty item
/// list and an `error` message, so consumers never special-case the schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub ok: bool,
    #[serde(flatten)]
    pub tags: FeedTags,
    /// The date the data refers to, `YYYY-MM-DD`.
    pub date: String,
    /// When this envelope was built, RFC 3339 UTC with milliseconds.
    pub updated_at: String,
    pub items: Vec<RankedItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Snapshot {
    pub fn success(tags: FeedTags, batch: FeedBatch, now: DateTime<Utc>) -> Self {
        Self {
            ok: true,
            tags,
            date: batch.date,
            updated_at: timestamp(now),
            items: batch.items,
            error: None,
        }
    }

    pub fn failure(
        tags: FeedTags,
        date: String,
        error: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            ok: false,
            tags,
            date,
            updated_at: timestamp(now),
            items: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Written as `last_error.json` when a whole refresh run fails.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorReport {
    pub ok: bool,
    pub at: String,
    pub error: String,
}

impl ErrorReport {
    pub fn new(error: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            ok: false,
            at: timestamp(now),
            error: error.into(),
        }
    }
}

/// Format an instant the way the ranking page expects (`2025-05-06T08:00:00.000Z`).
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 6, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(timestamp(fixed_now()), "2025-05-06T08:00:00.000Z");
    }

    #[test]
    fn test_item_serialization_omits_absent_fields() {
        let item = RankedItem::new(1, "Rust", "https://example.com/rust")
            .with_views(10_000);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["rank"], 1);
        assert_eq!(json["views"], 10_000);
        assert!(json.get("points").is_none());
        assert!(json.get("artworkUrl100").is_none());
        assert!(json.get("pubDate").is_none());
    }

    #[test]
    fn test_item_metric_prefers_whichever_is_set() {
        let views = RankedItem::new(1, "a", "u").with_views(3);
        let points = RankedItem::new(1, "a", "u").with_points(7);
        let none = RankedItem::new(1, "a", "u");

        assert_eq!(views.metric(), Some(3));
        assert_eq!(points.metric(), Some(7));
        assert_eq!(none.metric(), None);
    }

    #[test]
    fn test_success_envelope_shape() {
        let batch = FeedBatch {
            date: "2025-05-05".to_string(),
            items: vec![RankedItem::new(1, "a", "u").with_views(1)],
        };
        let tags = FeedTags::new("wikipedia").lang("ja");
        let snapshot = Snapshot::success(tags, batch, fixed_now());
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["ok"], true);
        assert_eq!(json["source"], "wikipedia");
        assert_eq!(json["lang"], "ja");
        assert_eq!(json["date"], "2025-05-05");
        assert_eq!(json["updatedAt"], "2025-05-06T08:00:00.000Z");
        assert!(json.get("geo").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_envelope_keeps_shape() {
        let snapshot = Snapshot::failure(
            FeedTags::new("google_trends_rss").geo("JP").lang("ja"),
            "2025-05-06".to_string(),
            "fetch failed: 429 https://trends.google.com",
            fixed_now(),
        );
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["ok"], false);
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(json["geo"], "JP");
        assert!(json["error"].as_str().unwrap().contains("429"));
    }

    #[test]
    fn test_snapshot_deserialization() {
        let json = r#"{
            "ok": true,
            "source": "hacker_news",
            "date": "2025-05-06",
            "updatedAt": "2025-05-06T08:00:00.000Z",
            "items": [
                {"rank": 1, "title": "Show HN", "points": 120, "comments": 40,
                 "url": "https://example.com", "hn": "https://news.ycombinator.com/item?id=1"}
            ]
        }"#;

        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.ok);
        assert_eq!(snapshot.tags.source, "hacker_news");
        assert_eq!(snapshot.tags.lang, None);
        assert_eq!(snapshot.items[0].points, Some(120));
        assert_eq!(snapshot.items[0].comments, Some(40));
    }
}
