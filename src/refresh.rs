//! A full refresh run: every selected feed, one after another.
//!
//! Feeds are independent and own disjoint documents. A feed whose upstream
//! fails still produces an `ok: false` candidate that the guard handles; only
//! a store failure marks the feed as failed in the run report.

use crate::config::RefreshConfig;
use crate::errors::StoreError;
use crate::feeds::{Feed, FeedName, Fetcher};
use crate::guard::{Outcome, Policy, refresh_feed};
use crate::http::Transport;
use crate::models::ErrorReport;
use crate::outputs::store::SnapshotStore;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use tracing::{error, info, instrument};

pub const ERROR_REPORT_NAME: &str = "last_error.json";

/// A feed together with the persistence policy it runs under.
#[derive(Debug, Clone)]
pub struct FeedJob {
    pub feed: Feed,
    pub policy: Policy,
}

/// Result of one feed within a run.
#[derive(Debug)]
pub struct FeedReport {
    pub file: &'static str,
    pub result: Result<Outcome, StoreError>,
}

fn policy_for(name: FeedName, config: &RefreshConfig) -> Policy {
    match name {
        FeedName::Wiki => config.wikipedia.policy,
        FeedName::Trends => config.google_trends.policy,
        FeedName::Hn => config.hacker_news.policy,
        FeedName::Apps => config.app_store.policy,
    }
}

/// Jobs for `names` in the given order; an empty selection means every feed.
pub fn jobs(config: &RefreshConfig, names: &[FeedName]) -> Vec<FeedJob> {
    let names = if names.is_empty() {
        FeedName::all()
    } else {
        names.iter().copied().unique().collect()
    };
    names
        .into_iter()
        .map(|name| FeedJob {
            feed: Feed::from_config(name, config),
            policy: policy_for(name, config),
        })
        .collect()
}

/// Refresh every job sequentially and report what happened to each.
#[instrument(level = "info", skip_all, fields(feeds = jobs.len()))]
pub async fn run_all<S: SnapshotStore, T: Transport>(
    store: &S,
    transport: &T,
    jobs: &[FeedJob],
    now: DateTime<Utc>,
) -> Vec<FeedReport> {
    let reports: Vec<FeedReport> = stream::iter(jobs)
        .then(|job| async move {
            let file = job.feed.file_name();
            let result =
                refresh_feed(store, &job.feed, transport, job.policy, now).await;
            match &result {
                Ok(outcome) => info!(feed = file, outcome = outcome.as_str(), "Feed refreshed"),
                Err(e) => error!(feed = file, error = %e, "Failed to persist snapshot"),
            }
            FeedReport { file, result }
        })
        .collect()
        .await;

    let failed = reports.iter().filter(|r| r.result.is_err()).count();
    info!(total = reports.len(), failed, "Refresh run complete");
    reports
}

/// One-line description of every failed feed, or `None` if all persisted.
pub fn summarize_failures(reports: &[FeedReport]) -> Option<String> {
    let failures = reports
        .iter()
        .filter_map(|r| r.result.as_ref().err().map(|e| format!("{}: {e}", r.file)))
        .join("; ");
    (!failures.is_empty()).then_some(failures)
}

/// Write `last_error.json` so an external scheduler can see why a run failed.
pub async fn write_error_report<S: SnapshotStore>(
    store: &S,
    message: &str,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    store
        .save(ERROR_REPORT_NAME, &ErrorReport::new(message, now))
        .await
}
