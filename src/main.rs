//! # trend_snapshots
//!
//! A batch job that captures public "trending" feeds as static JSON snapshots
//! for a small ranking page.
//!
//! ## Features
//!
//! - Wikipedia most-viewed articles for the last completed day
//! - Google Trends daily searches, with a mirror fallback chain
//! - Hacker News front page
//! - App Store top free apps
//! - Fragile feeds keep their last good snapshot when a refresh fails
//!
//! ## Usage
//!
//! ```sh
//! trend_snapshots -o ./docs/data
//! ```
//!
//! ## Architecture
//!
//! The refresh follows a pipeline per feed:
//! 1. **Fetching**: Download the upstream feed through a [`http::Transport`]
//! 2. **Parsing**: Normalize it into ranked items
//! 3. **Building**: Wrap the items (or the failure) in a snapshot envelope
//! 4. **Persisting**: Let the guard decide whether the envelope replaces the stored file

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod builder;
mod cli;
mod config;
mod errors;
mod feeds;
mod growth;
mod guard;
mod http;
mod models;
mod outputs;
mod refresh;
mod utils;

use builder::build;
use cli::{Cli, Command};
use config::RefreshConfig;
use feeds::{Feed, FeedName, Fetcher};
use http::HttpTransport;
use outputs::store::{FsStore, SnapshotStore};
use refresh::{jobs, run_all, summarize_failures, write_error_report};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = RefreshConfig::load(args.config.as_deref())?;
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }

    match args.command() {
        Command::Refresh { feeds } => refresh_snapshots(&config, &feeds).await,
        Command::Show { feed, live } => show_snapshot(&config, feed, live).await,
        Command::Growth { series, range } => {
            let rows = growth::load_series(&series)?;
            match growth::compute(&rows, range.days()) {
                Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                None => {
                    warn!(path = %series.display(), "Series is empty");
                    println!("null");
                }
            }
            Ok(())
        }
    }
}

/// Refresh the selected feeds and fail the process if any snapshot could not
/// be persisted.
#[instrument(level = "info", skip_all, fields(output_dir = %config.output_dir.display()))]
async fn refresh_snapshots(
    config: &RefreshConfig,
    feeds: &[FeedName],
) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!("trend_snapshots refresh starting up");

    let store = FsStore::new(&config.output_dir);

    // Early check: ensure the output dir is writable
    if let Err(e) = store.ensure_ready().await {
        error!(
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        report_fatal(&store, &e.to_string()).await;
        return Err(e.into());
    }

    let transport = match HttpTransport::new(&config.http) {
        Ok(transport) => transport,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            report_fatal(&store, &e.to_string()).await;
            return Err(e.into());
        }
    };

    let jobs = jobs(config, feeds);
    let reports = run_all(&store, &transport, &jobs, Utc::now()).await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    if let Some(message) = summarize_failures(&reports) {
        report_fatal(&store, &message).await;
        return Err(message.into());
    }
    Ok(())
}

/// Best-effort `last_error.json`; the run is failing either way.
async fn report_fatal(store: &FsStore, message: &str) {
    if let Err(e) = write_error_report(store, message, Utc::now()).await {
        error!(path = %store.dir().display(), error = %e, "Could not write error report");
    }
}

/// Print the stored snapshot, or a freshly built one with `--live`.
async fn show_snapshot(
    config: &RefreshConfig,
    name: FeedName,
    live: bool,
) -> Result<(), Box<dyn Error>> {
    let feed = Feed::from_config(name, config);
    let snapshot = if live {
        let transport = HttpTransport::new(&config.http)?;
        build(&feed, &transport, Utc::now()).await
    } else {
        let store = FsStore::new(&config.output_dir);
        store.load(feed.file_name()).await?.ok_or_else(|| {
            format!(
                "no snapshot stored at {}",
                store.dir().join(feed.file_name()).display()
            )
        })?
    };

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
