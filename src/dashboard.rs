//! Dashboard aggregation
//!
//! Pure, stateless functions that derive summary statistics from a slice of
//! the event log and the live rolling window. Nothing here caches: callers
//! that care about recomputation cost memoize on their side.

use chrono::{FixedOffset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DetectionEvent, Handedness};

/// Default time bucket size for the event timeline: one minute
pub const DEFAULT_BUCKET_MS: i64 = 60_000;

/// Discrete look-back choices for the dashboard interval selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookBack {
    Min5,
    Min30,
    Min60,
}

impl LookBack {
    pub fn minutes(&self) -> i64 {
        match self {
            LookBack::Min5 => 5,
            LookBack::Min30 => 30,
            LookBack::Min60 => 60,
        }
    }

    /// Oldest timestamp (epoch ms) still inside this look-back window
    pub fn cutoff_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.minutes() * 60_000
    }
}

/// Per-hand event counts, with an explicit bucket for unlabeled hands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandBreakdown {
    pub left: usize,
    pub right: usize,
    pub unknown: usize,
}

impl HandBreakdown {
    pub fn total(&self) -> usize {
        self.left + self.right + self.unknown
    }
}

/// One point of the time-bucketed event timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucket {
    /// Bucket start in epoch milliseconds
    pub start_ms: i64,
    /// Human-readable bucket label, `h:MM` in 12-hour time
    pub label: String,
    pub count: usize,
}

/// Aggregated dashboard panel for one look-back window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub look_back: LookBack,
    /// Number of events inside the look-back window
    pub attempts: usize,
    /// Positive fraction of the live rolling window
    pub hit_rate: f64,
    pub by_hand: HandBreakdown,
    pub timeline: Vec<TimeBucket>,
}

/// Fraction of `true` entries over the window length; `0` for an empty
/// window (no division by zero).
pub fn hit_rate(window: &[bool]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let positives = window.iter().filter(|&&biting| biting).count();
    positives as f64 / window.len() as f64
}

/// Group events by handedness, including an `unknown` bucket
pub fn hand_distribution(events: &[DetectionEvent]) -> HandBreakdown {
    let mut breakdown = HandBreakdown::default();
    for event in events {
        match event.handedness {
            Handedness::Left => breakdown.left += 1,
            Handedness::Right => breakdown.right += 1,
            Handedness::Unknown => breakdown.unknown += 1,
        }
    }
    breakdown
}

/// Floor each event timestamp to its bucket boundary and count events per
/// bucket, ascending by time. Labels are rendered in the given UTC offset.
pub fn time_bucketed_counts(
    events: &[DetectionEvent],
    bucket_size_ms: i64,
    tz: &FixedOffset,
) -> Vec<TimeBucket> {
    let mut buckets = std::collections::BTreeMap::new();
    for event in events {
        let start_ms = event.timestamp.div_euclid(bucket_size_ms) * bucket_size_ms;
        *buckets.entry(start_ms).or_insert(0usize) += 1;
    }

    buckets
        .into_iter()
        .map(|(start_ms, count)| TimeBucket {
            start_ms,
            label: bucket_label(start_ms, tz),
            count,
        })
        .collect()
}

/// `h:MM` label (12-hour clock, zero-padded minutes) for a bucket start
fn bucket_label(start_ms: i64, tz: &FixedOffset) -> String {
    match Utc.timestamp_millis_opt(start_ms).single() {
        Some(instant) => {
            let local = instant.with_timezone(tz);
            let (_, hour) = local.hour12();
            format!("{}:{:02}", hour, local.minute())
        }
        None => String::new(),
    }
}

/// Roll up the dashboard panel: recent-event count, live hit rate, per-hand
/// distribution, and the minute-bucketed timeline.
pub fn summarize(
    events: &[DetectionEvent],
    window: &[bool],
    look_back: LookBack,
    now_ms: i64,
    tz: &FixedOffset,
) -> DashboardSummary {
    let cutoff = look_back.cutoff_ms(now_ms);
    let recent: Vec<DetectionEvent> = events
        .iter()
        .filter(|event| event.timestamp >= cutoff)
        .copied()
        .collect();

    DashboardSummary {
        look_back,
        attempts: recent.len(),
        hit_rate: hit_rate(window),
        by_hand: hand_distribution(&recent),
        timeline: time_bucketed_counts(&recent, DEFAULT_BUCKET_MS, tz),
    }
}
