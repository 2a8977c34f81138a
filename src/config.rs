//! Refresh configuration loaded from an optional YAML file.
//!
//! Every field has a default, so running without `--config` refreshes the
//! Japanese feeds into `docs/data`. A config file only needs the keys it
//! overrides:
//!
//! ```yaml
//! output_dir: public/data
//! wikipedia:
//!   lang: en
//!   utc_offset_hours: 0
//! google_trends:
//!   geo: US
//!   lang: en
//! ```

use crate::errors::ConfigError;
use crate::guard::Policy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub output_dir: PathBuf,
    pub http: HttpConfig,
    pub wikipedia: WikipediaConfig,
    pub google_trends: GoogleTrendsConfig,
    pub hacker_news: HackerNewsConfig,
    pub app_store: AppStoreConfig,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("docs/data"),
            http: HttpConfig::default(),
            wikipedia: WikipediaConfig::default(),
            google_trends: GoogleTrendsConfig::default(),
            hacker_news: HackerNewsConfig::default(),
            app_store: AppStoreConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Request timeout; reqwest's default applies when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "sns-growth-rank".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WikipediaConfig {
    pub lang: String,
    pub access: String,
    /// Offset of the timezone whose "yesterday" is requested.
    pub utc_offset_hours: i32,
    /// Article names that are not real articles (home page, search page).
    pub excluded: Vec<String>,
    pub policy: Policy,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            lang: "ja".to_string(),
            access: "all-access".to_string(),
            utc_offset_hours: 9,
            excluded: vec![
                "Main_Page".to_string(),
                "特別:検索".to_string(),
                "Special:Search".to_string(),
            ],
            policy: Policy::OverwriteAlways,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GoogleTrendsConfig {
    pub geo: String,
    pub lang: String,
    pub utc_offset_hours: i32,
    pub accept_language: String,
    /// Tried in order; empty means [`default_trends_candidates`] for `geo`.
    pub candidates: Vec<String>,
    pub policy: Policy,
}

impl Default for GoogleTrendsConfig {
    fn default() -> Self {
        Self {
            geo: "JP".to_string(),
            lang: "ja".to_string(),
            utc_offset_hours: 9,
            accept_language: "ja,en-US;q=0.9,en;q=0.8".to_string(),
            candidates: Vec::new(),
            policy: Policy::KeepPreviousOnFailure,
        }
    }
}

impl GoogleTrendsConfig {
    /// The fallback chain in the order it is tried.
    pub fn candidate_urls(&self) -> Vec<String> {
        if self.candidates.is_empty() {
            default_trends_candidates(&self.geo)
        } else {
            self.candidates.clone()
        }
    }
}

/// Primary domain, country domain, then the proxied mirror of each.
pub fn default_trends_candidates(geo: &str) -> Vec<String> {
    let path = format!("/trends/trendingsearches/daily/rss?geo={geo}");
    let primary = format!("https://trends.google.com{path}");
    let local = format!("https://trends.google.{}{path}", country_domain(geo));
    let mut out = vec![primary.clone()];
    if local != primary {
        out.push(local.clone());
    }
    out.push(format!("https://r.jina.ai/{primary}"));
    if local != primary {
        out.push(format!("https://r.jina.ai/{local}"));
    }
    out
}

fn country_domain(geo: &str) -> String {
    match geo.to_ascii_uppercase().as_str() {
        "US" => "com".to_string(),
        "JP" => "co.jp".to_string(),
        "GB" => "co.uk".to_string(),
        "KR" => "co.kr".to_string(),
        "IN" => "co.in".to_string(),
        "AU" => "com.au".to_string(),
        "BR" => "com.br".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HackerNewsConfig {
    pub url: String,
    pub policy: Policy,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            url: "https://hn.algolia.com/api/v1/search?tags=front_page".to_string(),
            policy: Policy::OverwriteAlways,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppStoreConfig {
    pub country: String,
    pub policy: Policy,
}

impl Default for AppStoreConfig {
    fn default() -> Self {
        Self {
            country: "jp".to_string(),
            policy: Policy::OverwriteAlways,
        }
    }
}

impl RefreshConfig {
    /// Load from `path`, or return the defaults when no path is given.
    #[instrument(level = "info", skip_all, fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            None => Self::default(),
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                let config: Self =
                    serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                        path: path.to_path_buf(),
                        source,
                    })?;
                info!("Loaded configuration");
                config
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for hours in [
            self.wikipedia.utc_offset_hours,
            self.google_trends.utc_offset_hours,
        ] {
            if !(-23..=23).contains(&hours) {
                return Err(ConfigError::Offset(hours));
            }
        }

        let candidates = self.google_trends.candidate_urls();
        for candidate in candidates.iter().chain(std::iter::once(&self.hacker_news.url)) {
            url::Url::parse(candidate).map_err(|source| ConfigError::CandidateUrl {
                url: candidate.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
