//! Snapshot assembly: wrap a fetcher call into an envelope.

use crate::feeds::Fetcher;
use crate::http::Transport;
use crate::models::{FeedBatch, MAX_ITEMS, Snapshot};
use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

/// Run `fetcher` once and wrap the outcome in a [`Snapshot`].
///
/// Never fails: a fetch error becomes an `ok: false` envelope with an empty
/// item list and the error message. The result is only a candidate; whether
/// it reaches the store is up to [`crate::guard`].
#[instrument(level = "info", skip_all, fields(feed = fetcher.file_name()))]
pub async fn build<F: Fetcher, T: Transport>(
    fetcher: &F,
    transport: &T,
    now: DateTime<Utc>,
) -> Snapshot {
    match fetcher.fetch(transport, now).await {
        Ok(batch) => Snapshot::success(fetcher.tags(), densify(batch), now),
        Err(e) => {
            warn!(kind = e.kind().as_str(), error = %e, "Feed build failed");
            Snapshot::failure(fetcher.tags(), fetcher.fallback_date(now), e.to_string(), now)
        }
    }
}

/// Cap the item list and renumber ranks 1..n in the existing order.
fn densify(mut batch: FeedBatch) -> FeedBatch {
    batch.items.truncate(MAX_ITEMS);
    for (index, item) in batch.items.iter_mut().enumerate() {
        item.rank = index as u32 + 1;
    }
    batch
}
