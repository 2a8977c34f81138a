//! Persistence guard: decides whether a built snapshot replaces the stored one.
//!
//! # Policies
//!
//! - [`Policy::OverwriteAlways`]: every build result is written, failures
//!   included, so an outage is visible rather than silently stale.
//! - [`Policy::KeepPreviousOnFailure`]: a failed build leaves the stored
//!   snapshot alone. The only exception is the very first run, where a
//!   failure envelope is written so readers always find a document.

use crate::builder::build;
use crate::errors::StoreError;
use crate::feeds::Fetcher;
use crate::http::Transport;
use crate::models::Snapshot;
use crate::outputs::store::SnapshotStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    OverwriteAlways,
    KeepPreviousOnFailure,
}

/// What the guard did with a candidate snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The candidate replaced the stored document.
    Written,
    /// The build failed and the previous document was left in place.
    KeptPrevious,
    /// The build failed and there was nothing to keep, so the failure
    /// envelope was written.
    WroteFirstFailure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Written => "written",
            Outcome::KeptPrevious => "kept_previous",
            Outcome::WroteFirstFailure => "wrote_first_failure",
        }
    }
}

/// Whether a readable snapshot is already stored under `name`.
///
/// A document that cannot be read or decoded counts as absent.
pub async fn has_previous<S: SnapshotStore>(store: &S, name: &str) -> bool {
    match store.load(name).await {
        Ok(previous) => previous.is_some(),
        Err(e) => {
            warn!(feed = name, error = %e, "Existing snapshot unreadable; treating as absent");
            false
        }
    }
}

/// Apply `policy` to `candidate`.
///
/// `previous_exists` must be determined before the candidate was built.
#[instrument(level = "info", skip(store, candidate), fields(ok = candidate.ok))]
pub async fn persist<S: SnapshotStore>(
    store: &S,
    name: &str,
    policy: Policy,
    previous_exists: bool,
    candidate: &Snapshot,
) -> Result<Outcome, StoreError> {
    if candidate.ok || policy == Policy::OverwriteAlways {
        store.save(name, candidate).await?;
        return Ok(Outcome::Written);
    }

    let error = candidate.error.as_deref().unwrap_or("unknown error");
    if previous_exists {
        info!(error, "Fetch failed; kept previous snapshot");
        return Ok(Outcome::KeptPrevious);
    }

    store.save(name, candidate).await?;
    info!(error, "Fetch failed with no previous snapshot; wrote failure envelope");
    Ok(Outcome::WroteFirstFailure)
}

/// Build one feed and persist it under the given policy.
#[instrument(level = "info", skip_all, fields(feed = fetcher.file_name(), ?policy))]
pub async fn refresh_feed<S, F, T>(
    store: &S,
    fetcher: &F,
    transport: &T,
    policy: Policy,
    now: DateTime<Utc>,
) -> Result<Outcome, StoreError>
where
    S: SnapshotStore,
    F: Fetcher,
    T: Transport,
{
    let name = fetcher.file_name();
    let previous_exists = match policy {
        Policy::KeepPreviousOnFailure => has_previous(store, name).await,
        Policy::OverwriteAlways => false,
    };

    let candidate = build(fetcher, transport, now).await;
    persist(store, name, policy, previous_exists, &candidate)
        .await
}
