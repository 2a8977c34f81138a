//! Command-line interface definitions for trend_snapshots.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Global options can also be provided via environment variables.

use crate::feeds::FeedName;
use crate::growth::Range;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the trend_snapshots application.
///
/// # Examples
///
/// ```sh
/// # Refresh every feed into ./docs/data
/// trend_snapshots
///
/// # Refresh only Google Trends into another directory
/// trend_snapshots -o public/data refresh --feed trends
///
/// # Print what the Hacker News snapshot would contain right now
/// trend_snapshots show hn --live
///
/// # Week-over-week growth of a daily series
/// trend_snapshots growth views.json --range 7d
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "TREND_SNAPSHOTS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the snapshot files (overrides `output_dir` in the config)
    #[arg(short, long, env = "TREND_SNAPSHOTS_OUTPUT_DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch feeds and update their snapshot files (the default)
    Refresh {
        /// Only refresh these feeds; repeatable
        #[arg(long = "feed", value_enum)]
        feeds: Vec<FeedName>,
    },

    /// Print a feed's snapshot
    Show {
        #[arg(value_enum)]
        feed: FeedName,

        /// Fetch and build now instead of reading the stored file; nothing is written
        #[arg(long)]
        live: bool,
    },

    /// Compare the latest window of a daily series against the one before it
    Growth {
        /// JSON array of `{ "date": "YYYY-MM-DD", "value": n }`
        series: PathBuf,

        #[arg(long, value_enum, default_value = "1d")]
        range: Range,
    },
}

impl Cli {
    /// The subcommand to run; no subcommand means a full refresh.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Refresh { feeds: Vec::new() })
    }
}
