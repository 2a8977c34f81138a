//! Utility functions for dates, string handling and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Calendar dates in a fixed-offset timezone (feeds are keyed by local day)
//! - String truncation for logging response previews
//! - File system validation for the output directory

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};
use std::fs as stdfs;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// The calendar date of `now` in a timezone `offset_hours` east of UTC.
///
/// Offsets outside ±23h fall back to UTC; config validation rejects them
/// before they get here.
pub fn local_date(now: DateTime<Utc>, offset_hours: i32) -> NaiveDate {
    let offset = FixedOffset::east_opt(offset_hours * 3600)
        .unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset).date_naive()
}

/// The most recent completed day in the given timezone.
///
/// Pageview statistics are aggregated per finished day, so "yesterday" is the
/// newest date the upstream can answer for.
pub fn completed_day(now: DateTime<Utc>, offset_hours: i32) -> NaiveDate {
    local_date(now, offset_hours) - Duration::days(1)
}

/// Format a date as `YYYY-MM-DD`.
pub fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary before `max` bytes,
/// with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    // A small sync write keeps the error surface simple
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
