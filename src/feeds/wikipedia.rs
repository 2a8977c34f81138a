//! Wikipedia most-viewed articles for the last completed day.
//!
//! Uses the Wikimedia pageviews REST API:
//! `https://wikimedia.org/api/rest_v1/metrics/pageviews/top/{project}/{access}/{yyyy}/{mm}/{dd}`.
//!
//! The upstream `rank` field is ignored. Sentinel pages (the home page, the
//! search page) are filtered out first and ranks are recomputed from the
//! remaining positions, so there are never gaps.

use super::{Fetcher, decode_json};
use crate::config::WikipediaConfig;
use crate::errors::FetchError;
use crate::http::Transport;
use crate::models::{FeedBatch, FeedTags, MAX_ITEMS, RankedItem};
use crate::utils::{completed_day, ymd};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct TopResponse {
    #[serde(default)]
    items: Vec<TopDay>,
}

#[derive(Debug, Deserialize)]
struct TopDay {
    #[serde(default)]
    articles: Vec<TopArticle>,
}

#[derive(Debug, Deserialize)]
struct TopArticle {
    #[serde(default)]
    article: String,
    #[serde(default)]
    views: u64,
}

#[derive(Debug, Clone)]
pub struct WikipediaFetcher {
    lang: String,
    access: String,
    utc_offset_hours: i32,
    excluded: Vec<String>,
}

impl WikipediaFetcher {
    pub fn from_config(config: &WikipediaConfig) -> Self {
        Self {
            lang: config.lang.clone(),
            access: config.access.clone(),
            utc_offset_hours: config.utc_offset_hours,
            excluded: config.excluded.clone(),
        }
    }

    /// REST path for the top articles of `day`.
    pub fn top_url(&self, day: NaiveDate) -> String {
        format!(
            "https://wikimedia.org/api/rest_v1/metrics/pageviews/top/{}.wikipedia/{}/{:04}/{:02}/{:02}",
            self.lang,
            self.access,
            day.year(),
            day.month(),
            day.day()
        )
    }

    /// Turn the API response into ranked items.
    fn parse_top_articles(&self, url: &str, body: &str) -> Result<Vec<RankedItem>, FetchError> {
        let response: TopResponse = decode_json(url, body)?;
        let articles = response
            .items
            .into_iter()
            .next()
            .map(|day| day.articles)
            .unwrap_or_default();

        Ok(articles
            .into_iter()
            .filter(|a| !a.article.is_empty() && !self.excluded.contains(&a.article))
            .take(MAX_ITEMS)
            .enumerate()
            .map(|(index, a)| {
                RankedItem::new(
                    index as u32 + 1,
                    display_title(&a.article),
                    article_url(&self.lang, &a.article),
                )
                .with_views(a.views)
            })
            .collect())
    }
}

/// `Foo_Bar%21` → `Foo Bar!`. Undecodable names keep their raw form.
fn display_title(article: &str) -> String {
    let spaced = article.replace('_', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn article_url(lang: &str, article: &str) -> String {
    format!(
        "https://{lang}.wikipedia.org/wiki/{}",
        urlencoding::encode(article)
    )
}

impl Fetcher for WikipediaFetcher {
    fn file_name(&self) -> &'static str {
        "wiki.json"
    }

    fn tags(&self) -> FeedTags {
        FeedTags::new("wikipedia").lang(self.lang.clone())
    }

    /// The completed day a successful fetch would have reported.
    fn fallback_date(&self, now: DateTime<Utc>) -> String {
        ymd(completed_day(now, self.utc_offset_hours))
    }

    #[instrument(level = "info", skip_all, fields(lang = %self.lang))]
    async fn fetch<T: Transport>(
        &self,
        transport: &T,
        now: DateTime<Utc>,
    ) -> Result<FeedBatch, FetchError> {
        let day = completed_day(now, self.utc_offset_hours);
        let url = self.top_url(day);
        let body = transport.get_text(&url, &[]).await?;
        let items = self.parse_top_articles(&url, &body)?;

        info!(count = items.len(), date = %day, "Parsed Wikipedia top articles");
        Ok(FeedBatch {
            date: ymd(day),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::http::stub::StubTransport;
    use chrono::TimeZone;
    use serde_json::json;

    const TOP_URL_MAY_5: &str =
        "https://wikimedia.org/api/rest_v1/metrics/pageviews/top/ja.wikipedia/all-access/2025/05/05";

    fn fetcher() -> WikipediaFetcher {
        WikipediaFetcher::from_config(&WikipediaConfig::default())
    }

    fn response(articles: Vec<serde_json::Value>) -> String {
        json!({
            "items": [{
                "project": "ja.wikipedia",
                "access": "all-access",
                "year": "2025", "month": "05", "day": "05",
                "articles": articles
            }]
        })
        .to_string()
    }

    #[test]
    fn test_top_url_uses_zero_padded_path() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        assert_eq!(fetcher().top_url(day), TOP_URL_MAY_5);
    }

    #[test]
    fn test_home_page_excluded_and_ranks_stay_dense() {
        let home = json!({"article": "Main_Page", "views": 900_000, "rank": 1});
        let mut articles = vec![home];
        for i in 0..60 {
            articles.push(json!({
                "article": format!("Article_{i}"),
                "views": 100_000 - i,
                "rank": i + 2
            }));
        }
        let f = fetcher();
        let items = f
            .parse_top_articles("https://wikimedia.org/x", &response(articles))
            .unwrap();

        assert_eq!(items.len(), 50);
        assert_eq!(items[0].title, "Article 0");
        for (index, item) in items.iter().enumerate() {
            assert_eq!(item.rank as usize, index + 1);
        }
        assert!(items.iter().all(|i| i.title != "Main Page"));
    }

    #[test]
    fn test_search_page_and_empty_names_excluded() {
        let articles = vec![
            json!({"article": "特別:検索", "views": 50_000, "rank": 1}),
            json!({"article": "", "views": 40_000, "rank": 2}),
            json!({"article": "東京", "views": 30_000, "rank": 3}),
        ];
        let f = fetcher();
        let items = f
            .parse_top_articles("https://wikimedia.org/x", &response(articles))
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].rank, 1);
        assert_eq!(items[0].title, "東京");
        assert_eq!(items[0].views, Some(30_000));
        assert_eq!(
            items[0].url,
            "https://ja.wikipedia.org/wiki/%E6%9D%B1%E4%BA%AC"
        );
    }

    #[test]
    fn test_display_title_replaces_underscores_and_decodes() {
        assert_eq!(
            display_title("Rust_(programming_language)"),
            "Rust (programming language)"
        );
        assert_eq!(display_title("AC%2FDC"), "AC/DC");
    }

    #[test]
    fn test_missing_items_is_empty_not_error() {
        let f = fetcher();
        let items = f
            .parse_top_articles("https://wikimedia.org/x", "{}")
            .unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_non_json_is_parse_failure() {
        let f = fetcher();
        let err = f
            .parse_top_articles("https://wikimedia.org/x", "<html>")
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_requests_yesterday_in_jst() {
        // 16:30 UTC on the 5th is the 6th in JST, so yesterday is the 5th
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 16, 30, 0).unwrap();
        let url = TOP_URL_MAY_5;
        let stub = StubTransport::new().ok(
            url,
            &response(vec![json!({"article": "東京", "views": 10, "rank": 1})]),
        );

        let batch = fetcher().fetch(&stub, now).await.unwrap();
        assert_eq!(batch.date, "2025-05-05");
        assert_eq!(batch.items.len(), 1);
        assert_eq!(stub.calls(), vec![url]);
    }

    #[tokio::test]
    async fn test_fetch_propagates_status() {
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 16, 30, 0).unwrap();
        let stub = StubTransport::new().status(TOP_URL_MAY_5, 404);

        let err = fetcher().fetch(&stub, now).await.unwrap_err();
        assert_eq!(err.to_string(), format!("fetch failed: 404 {TOP_URL_MAY_5}"));
    }

    #[tokio::test]
    async fn test_failed_build_keeps_the_completed_day() {
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 16, 30, 0).unwrap();
        let stub = StubTransport::new().status(TOP_URL_MAY_5, 503);

        let snapshot = build(&fetcher(), &stub, now).await;
        assert!(!snapshot.ok);
        assert_eq!(snapshot.date, "2025-05-05");
        assert_eq!(fetcher().fallback_date(now), "2025-05-05");
    }
}
