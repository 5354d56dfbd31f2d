//! Core types for the Bitewatch pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: landmark observations, per-frame classifications, debounced
//! detection events, and the live smoother projection.

use serde::{Deserialize, Serialize};

/// A normalized landmark point in `[0, 1]` image space.
///
/// `z` is a depth estimate relative to the image plane; it is unitless and
/// only meaningful after depth weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Which hand a hand observation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
    Unknown,
}

impl Default for Handedness {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
            Handedness::Unknown => "unknown",
        }
    }
}

/// One detected hand: an ordered landmark sequence plus a handedness label.
///
/// Landmark ordering follows the upstream hand model convention (21 points,
/// fingertips at indices 4, 8, 12, 16, 20). Detection confidence is not
/// modeled downstream and is dropped at this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandObservation {
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub handedness: Handedness,
}

/// One detected face. Only the mouth region is consumed downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceObservation {
    pub landmarks: Vec<Landmark>,
}

/// The nearest qualifying fingertip for a positive frame classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiteHit {
    pub handedness: Handedness,
    pub finger_index: usize,
    pub distance: f64,
}

/// Result of classifying a single frame.
///
/// At most one hit is reported: the first fingertip (in hand-then-finger
/// iteration order) within the proximity threshold of the mouth center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameClassification {
    pub hit: Option<BiteHit>,
}

impl FrameClassification {
    /// A negative classification (no qualifying fingertip)
    pub fn negative() -> Self {
        Self { hit: None }
    }

    pub fn positive(hit: BiteHit) -> Self {
        Self { hit: Some(hit) }
    }

    pub fn is_biting(&self) -> bool {
        self.hit.is_some()
    }
}

/// A confirmed nail-biting event, created only on a debounced false→true
/// transition. Immutable once created.
///
/// The serde layout matches the persisted record format:
/// `{timestamp, handedness, fingerIndex, distance}` with epoch-millisecond
/// timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionEvent {
    /// Epoch milliseconds at which the debounced state rose
    pub timestamp: i64,
    pub handedness: Handedness,
    pub finger_index: usize,
    pub distance: f64,
}

impl DetectionEvent {
    pub fn from_hit(timestamp: i64, hit: BiteHit) -> Self {
        Self {
            timestamp,
            handedness: hit.handedness,
            finger_index: hit.finger_index,
            distance: hit.distance,
        }
    }
}

/// Live projection of the temporal smoother, exposed to the presentation
/// layer on every processed frame. `detection_history` is a copy of the
/// rolling window, never an alias into smoother state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmootherSnapshot {
    pub window_size: usize,
    pub confidence_threshold: f64,
    pub detection_history: Vec<bool>,
}

/// One frame of landmark input, as produced by a landmark source or a
/// recorded replay stream (one NDJSON record per frame).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    /// Monotonic capture timestamp in epoch milliseconds
    pub timestamp_ms: i64,
    #[serde(default)]
    pub hands: Vec<HandObservation>,
    #[serde(default)]
    pub face: Option<FaceObservation>,
}
