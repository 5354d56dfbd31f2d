//! Landmark source boundary
//!
//! The core consumes landmark coordinates produced by an external capability
//! (a hand/face landmark model). This module defines that per-frame call
//! contract and a scripted replay implementation used by tests and the CLI.

use crate::error::DetectorError;
use crate::types::{FaceObservation, FrameRecord, HandObservation};

/// External landmark capability, called once per captured frame.
///
/// Calls are keyed by a monotonic capture timestamp. The underlying model
/// may load asynchronously; `poll_ready` reports the one-time readiness
/// signal, and callers skip frame processing entirely (no queueing) while it
/// returns `false`.
pub trait LandmarkSource {
    /// Poll the one-time readiness signal. Once `true`, stays `true`.
    fn poll_ready(&mut self) -> bool;

    /// Hand observations for the frame captured at `timestamp_ms`
    fn detect_hands(&mut self, timestamp_ms: i64) -> Vec<HandObservation>;

    /// Face observation for the frame captured at `timestamp_ms`, if any
    fn detect_face(&mut self, timestamp_ms: i64) -> Option<FaceObservation>;
}

/// Scripted landmark source over pre-recorded frame records.
///
/// Frames are looked up by their capture timestamp, so the driver replays
/// the recorded timeline through the same per-frame contract a live model
/// would satisfy.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    frames: Vec<FrameRecord>,
    warmup_polls: usize,
}

impl ReplaySource {
    /// Build a replay source; frames are sorted by capture timestamp.
    pub fn new(mut frames: Vec<FrameRecord>) -> Self {
        frames.sort_by_key(|frame| frame.timestamp_ms);
        Self {
            frames,
            warmup_polls: 0,
        }
    }

    /// Report "not ready" for the first `polls` readiness checks, to model
    /// asynchronous model loading.
    pub fn with_warmup(mut self, polls: usize) -> Self {
        self.warmup_polls = polls;
        self
    }

    /// Parse one frame record per NDJSON line; blank lines are skipped.
    pub fn parse_ndjson(input: &str) -> Result<Vec<FrameRecord>, DetectorError> {
        let mut frames = Vec::new();
        for (index, line) in input.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let frame: FrameRecord = serde_json::from_str(trimmed).map_err(|err| {
                DetectorError::MalformedRecord(format!("line {}: {}", index + 1, err))
            })?;
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Capture timestamps of the recorded timeline, ascending
    pub fn timestamps(&self) -> Vec<i64> {
        self.frames.iter().map(|frame| frame.timestamp_ms).collect()
    }

    fn frame_at(&self, timestamp_ms: i64) -> Option<&FrameRecord> {
        self.frames
            .binary_search_by_key(&timestamp_ms, |frame| frame.timestamp_ms)
            .ok()
            .map(|index| &self.frames[index])
    }
}

impl LandmarkSource for ReplaySource {
    fn poll_ready(&mut self) -> bool {
        if self.warmup_polls > 0 {
            self.warmup_polls -= 1;
            return false;
        }
        true
    }

    fn detect_hands(&mut self, timestamp_ms: i64) -> Vec<HandObservation> {
        self.frame_at(timestamp_ms)
            .map(|frame| frame.hands.clone())
            .unwrap_or_default()
    }

    fn detect_face(&mut self, timestamp_ms: i64) -> Option<FaceObservation> {
        self.frame_at(timestamp_ms).and_then(|frame| frame.face.clone())
    }
}
