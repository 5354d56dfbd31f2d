//! Bitewatch - temporal-smoothing detection engine for nail-biting gestures
//!
//! Bitewatch turns noisy per-frame landmark geometry into a stable, debounced
//! event stream through a deterministic pipeline: frame classification →
//! temporal smoothing → event logging → dashboard aggregation.
//!
//! ## Modules
//!
//! - **classifier**: fingertip-to-mouth proximity classification per frame
//! - **smoother**: rolling-window debouncing with rising-edge events
//! - **event_log**: time-windowed, persisted record of confirmed events
//! - **dashboard**: pure aggregation for the presentation layer
//! - **source**: the external landmark-model boundary and a replay source
//! - **session**: single-session pipeline orchestration and frame pacing

pub mod classifier;
pub mod dashboard;
pub mod error;
pub mod event_log;
pub mod pacer;
pub mod session;
pub mod smoother;
pub mod source;
pub mod types;

pub use classifier::{ClassifierConfig, FrameClassifier};
pub use dashboard::{DashboardSummary, LookBack};
pub use error::DetectorError;
pub use event_log::{EventLog, EventStore, JsonFileStore};
pub use pacer::FramePacer;
pub use session::{DetectorSession, FrameOutcome};
pub use smoother::{SmootherConfig, SmootherUpdate, TemporalSmoother};
pub use source::{LandmarkSource, ReplaySource};
pub use types::{
    DetectionEvent, FaceObservation, FrameClassification, FrameRecord, HandObservation,
    Handedness, Landmark, SmootherSnapshot,
};

/// Bitewatch version embedded in CLI output
pub const BITEWATCH_VERSION: &str = env!("CARGO_PKG_VERSION");
