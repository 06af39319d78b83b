//! Warm-up removal and steady-state windowing
//!
//! Benchmarks ramp up before they reach a steady rate. The first part of every
//! series is discarded, and the remainder is cut to a fixed duration so trials
//! of different length contribute comparable samples.

use crate::sample::Series;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Default warm-up in seconds
pub const DEFAULT_WARMUP_SECS: u64 = 30;

/// Default steady-state window in seconds
pub const DEFAULT_WINDOW_SECS: u64 = 300;

/// How the warm-up part of a series is identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarmupPolicy {
    /// Keep everything
    None,
    /// Drop samples up to and including `first + secs`
    Seconds(u64),
    /// Drop samples until more than this many messages have been reported
    Messages(u64),
}

impl Default for WarmupPolicy {
    fn default() -> Self {
        WarmupPolicy::Seconds(DEFAULT_WARMUP_SECS)
    }
}

/// Remove the warm-up part of a series
///
/// `Messages(limit)` sums the per-interval message rates in order and starts at
/// the first sample whose preceding total exceeds `limit`. A series that never
/// gets past the limit has no identifiable warm-up and is kept whole. Samples
/// without a message rate count as zero.
pub fn discard_warmup(series: &Series, policy: WarmupPolicy) -> Series {
    match policy {
        WarmupPolicy::None => series.clone(),
        WarmupPolicy::Seconds(secs) => {
            let Some(first) = series.first() else {
                return Series::new();
            };
            match offset(first.timestamp, secs) {
                Some(threshold) => series.filter(|s| s.timestamp > threshold),
                None => Series::new(),
            }
        }
        WarmupPolicy::Messages(limit) => {
            let limit = limit as f64;
            let mut total = 0.0;
            for (index, sample) in series.iter().enumerate() {
                if total > limit {
                    return series.skip(index);
                }
                total += sample.msgs_per_sec.unwrap_or(0.0);
            }
            series.clone()
        }
    }
}

/// Keep the first `secs` seconds of a series (inclusive)
pub fn take_window(series: &Series, secs: u64) -> Series {
    let Some(first) = series.first() else {
        return Series::new();
    };
    match offset(first.timestamp, secs) {
        Some(threshold) => series.filter(|s| s.timestamp <= threshold),
        None => series.clone(),
    }
}

/// Warm-up removal followed by an optional fixed-length window
pub fn steady_state(series: &Series, warmup: WarmupPolicy, window_secs: Option<u64>) -> Series {
    let trimmed = discard_warmup(series, warmup);
    match window_secs {
        Some(secs) => take_window(&trimmed, secs),
        None => trimmed,
    }
}

/// `ts + secs`, or `None` past the representable range
fn offset(ts: NaiveDateTime, secs: u64) -> Option<NaiveDateTime> {
    let secs = i64::try_from(secs).ok()?;
    ts.checked_add_signed(Duration::try_seconds(secs)?)
}
