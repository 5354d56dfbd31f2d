//! Temporal smoothing and edge detection
//!
//! Raw per-frame classifications are noisy: a hand passing near the face
//! briefly looks like biting. This module keeps a fixed-size rolling window
//! of recent classifications and asserts a debounced state only when a
//! sufficient fraction of the window is positive, emitting an event on the
//! rising edge of that state.

use std::collections::VecDeque;

use crate::types::{BiteHit, DetectionEvent, FrameClassification, SmootherSnapshot};

/// Default rolling window capacity in frames
pub const DEFAULT_WINDOW_SIZE: usize = 30;

/// Default fraction of the window that must be positive to assert biting
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Tunable smoother parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmootherConfig {
    /// Rolling window capacity `W` in frames
    pub window_size: usize,
    /// Positive fraction that must be strictly exceeded to assert biting
    pub confidence_threshold: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Result of one smoother update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmootherUpdate {
    /// `None` while the window has fewer than `W` entries ("not yet
    /// determined"); callers must treat that as no update, not as `false`.
    pub debounced: Option<bool>,
    /// Emitted exactly once per debounced false→true transition
    pub event: Option<DetectionEvent>,
}

/// Stateful temporal smoother for one detection session.
///
/// The rolling window, thresholds, and remembered debounced state live here
/// explicitly; `update` is the sole mutating entry point.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    config: SmootherConfig,
    window: VecDeque<bool>,
    /// Most recent positive classification; supplies the event payload when
    /// the frame that tips the debounced state is itself negative.
    last_hit: Option<BiteHit>,
    debounced: bool,
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(SmootherConfig::default())
    }
}

impl TemporalSmoother {
    pub fn new(config: SmootherConfig) -> Self {
        Self {
            window: VecDeque::with_capacity(config.window_size),
            config,
            last_hit: None,
            debounced: false,
        }
    }

    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    /// Append one frame classification and recompute the debounced state.
    ///
    /// `timestamp_ms` stamps any event emitted by this update.
    pub fn update(
        &mut self,
        classification: &FrameClassification,
        timestamp_ms: i64,
    ) -> SmootherUpdate {
        self.window.push_back(classification.is_biting());
        while self.window.len() > self.config.window_size {
            self.window.pop_front();
        }

        if let Some(hit) = classification.hit {
            self.last_hit = Some(hit);
        }

        if self.window.len() < self.config.window_size {
            return SmootherUpdate {
                debounced: None,
                event: None,
            };
        }

        let positives = self.window.iter().filter(|&&biting| biting).count();
        let positive_fraction = positives as f64 / self.config.window_size as f64;
        let debounced = positive_fraction > self.config.confidence_threshold;

        let event = if debounced && !self.debounced {
            self.last_hit
                .map(|hit| DetectionEvent::from_hit(timestamp_ms, hit))
        } else {
            None
        };

        self.debounced = debounced;

        SmootherUpdate {
            debounced: Some(debounced),
            event,
        }
    }

    /// Copy of the live window state for visualization, valid after every
    /// update regardless of whether the window is full yet.
    pub fn snapshot(&self) -> SmootherSnapshot {
        SmootherSnapshot {
            window_size: self.config.window_size,
            confidence_threshold: self.config.confidence_threshold,
            detection_history: self.window.iter().copied().collect(),
        }
    }

    /// Clear the window and remembered state for a fresh session
    pub fn reset(&mut self) {
        self.window.clear();
        self.last_hit = None;
        self.debounced = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Handedness;
    use pretty_assertions::assert_eq;

    fn positive() -> FrameClassification {
        FrameClassification::positive(BiteHit {
            handedness: Handedness::Left,
            finger_index: 8,
            distance: 0.03,
        })
    }

    fn negative() -> FrameClassification {
        FrameClassification::negative()
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut smoother = TemporalSmoother::new(SmootherConfig {
            window_size: 10,
            confidence_threshold: 0.4,
        });

        for i in 0..100 {
            smoother.update(&negative(), i);
            assert!(smoother.snapshot().detection_history.len() <= 10);
        }
        assert_eq!(smoother.snapshot().detection_history.len(), 10);
    }

    #[test]
    fn test_no_debounced_state_before_window_full() {
        let mut smoother = TemporalSmoother::default();

        for i in 0..(DEFAULT_WINDOW_SIZE as i64 - 1) {
            let update = smoother.update(&positive(), i);
            assert_eq!(update.debounced, None);
            assert_eq!(update.event, None);
        }

        let update = smoother.update(&positive(), 29);
        assert_eq!(update.debounced, Some(true));
        assert!(update.event.is_some());
    }

    #[test]
    fn test_boundary_fraction_is_not_asserted() {
        // 12 positives over W=30 is exactly 0.4; strict `>` keeps it false
        let mut smoother = TemporalSmoother::default();

        let mut last = None;
        for i in 0..30 {
            let classification = if i < 12 { positive() } else { negative() };
            last = Some(smoother.update(&classification, i));
        }

        let last = last.expect("window was fed");
        assert_eq!(last.debounced, Some(false));
        assert_eq!(last.event, None);
    }

    #[test]
    fn test_edge_fires_once_at_window_fill_frame() {
        // 13 positives then 17 negatives: fraction 0.4333 at frame 30
        let mut smoother = TemporalSmoother::default();
        let mut events = Vec::new();

        for i in 0..30 {
            let classification = if i < 13 { positive() } else { negative() };
            let update = smoother.update(&classification, i);

            if i < 29 {
                assert_eq!(update.debounced, None);
            } else {
                assert_eq!(update.debounced, Some(true));
            }
            if let Some(event) = update.event {
                events.push(event);
            }
        }

        assert_eq!(events.len(), 1);
        // Stamped with the frame that completed the window
        assert_eq!(events[0].timestamp, 29);
        // Payload comes from the latest positive classification
        assert_eq!(events[0].finger_index, 8);
        assert_eq!(events[0].handedness, Handedness::Left);
    }

    #[test]
    fn test_sustained_true_does_not_re_emit() {
        let mut smoother = TemporalSmoother::default();
        let mut event_count = 0;

        for i in 0..90 {
            let update = smoother.update(&positive(), i);
            if update.event.is_some() {
                event_count += 1;
            }
        }

        assert_eq!(event_count, 1);
    }

    #[test]
    fn test_falling_edge_is_silent_and_re_arms() {
        let mut smoother = TemporalSmoother::new(SmootherConfig {
            window_size: 4,
            confidence_threshold: 0.4,
        });
        let mut events = Vec::new();
        let mut timestamp = 0;

        let mut feed = |smoother: &mut TemporalSmoother, biting: bool, n: usize| {
            for _ in 0..n {
                let classification = if biting { positive() } else { negative() };
                let update = smoother.update(&classification, timestamp);
                timestamp += 1;
                if let Some(event) = update.event {
                    events.push(event);
                }
            }
        };

        feed(&mut smoother, true, 8); // rise once
        feed(&mut smoother, false, 8); // fall silently
        feed(&mut smoother, true, 8); // rise again

        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut smoother = TemporalSmoother::default();
        smoother.update(&positive(), 0);

        let snapshot = smoother.snapshot();
        assert_eq!(snapshot.detection_history, vec![true]);
        assert_eq!(snapshot.window_size, DEFAULT_WINDOW_SIZE);

        // Mutating the smoother afterwards must not change the snapshot
        smoother.update(&negative(), 1);
        assert_eq!(snapshot.detection_history, vec![true]);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut smoother = TemporalSmoother::default();
        for i in 0..40 {
            smoother.update(&positive(), i);
        }

        smoother.reset();
        assert!(smoother.snapshot().detection_history.is_empty());

        // A fresh fill emits a fresh edge
        let mut event_count = 0;
        for i in 0..30 {
            if smoother.update(&positive(), i).event.is_some() {
                event_count += 1;
            }
        }
        assert_eq!(event_count, 1);
    }
}
