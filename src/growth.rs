//! Trailing-window growth over a daily time series.
//!
//! Sums the newest `d` days, sums the `d` days before that, and reports the
//! difference and percentage change between the two windows.

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Window length selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Range {
    #[value(name = "1d")]
    OneDay,
    #[value(name = "3d")]
    ThreeDays,
    #[value(name = "7d")]
    SevenDays,
}

impl Range {
    pub fn days(&self) -> usize {
        match self {
            Range::OneDay => 1,
            Range::ThreeDays => 3,
            Range::SevenDays => 7,
        }
    }
}

/// One day of a metric.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Row {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Missing or `null` counts as 0.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub value: f64,
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Growth {
    pub now: f64,
    pub prev: f64,
    pub delta: f64,
    /// Percent change of `now` against `prev`.
    pub rate: f64,
}

/// Compare the newest `days` rows against the `days` rows before them.
///
/// `rows` must be ordered newest first. Missing rows count as nothing, so a
/// short series compares against an empty (zero) window. When the previous
/// window sums to zero or less, the rate is 100 if the current window is
/// positive and 0 otherwise.
pub fn compute(rows: &[Row], days: usize) -> Option<Growth> {
    if rows.is_empty() {
        return None;
    }
    let window = |from: usize| -> f64 {
        rows.iter().skip(from).take(days).map(|r| r.value).sum()
    };

    let now = window(0);
    let prev = window(days);
    let delta = now - prev;
    let rate = if prev <= 0.0 {
        if now > 0.0 { 100.0 } else { 0.0 }
    } else {
        delta / prev * 100.0
    };

    Some(Growth {
        now,
        prev,
        delta,
        rate,
    })
}

/// Read a JSON array of rows and order it newest first.
pub fn load_series(path: &Path) -> Result<Vec<Row>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let mut rows: Vec<Row> = serde_json::from_str(&text)?;
    // ISO dates sort lexicographically
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(rows)
}
