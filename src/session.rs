//! Session orchestration
//!
//! A `DetectorSession` owns one pipeline instance: classifier → smoother →
//! event log. The pipeline runs synchronously once per captured frame from a
//! single frame-processing path; there is no parallelism and no locking.

use chrono::FixedOffset;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::classifier::{ClassifierConfig, FrameClassifier};
use crate::dashboard::{self, DashboardSummary, LookBack};
use crate::event_log::EventLog;
use crate::smoother::{SmootherConfig, TemporalSmoother};
use crate::source::LandmarkSource;
use crate::types::{
    DetectionEvent, FaceObservation, FrameClassification, HandObservation, SmootherSnapshot,
};

/// Fire-and-forget alert hook, invoked once per confirmed event.
///
/// The hook runs after the event is logged and must not influence detection
/// state; whatever it does (sound, banner) is its own business.
pub type AlertFn = Box<dyn FnMut(&DetectionEvent)>;

/// Everything one processed frame produced
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub classification: FrameClassification,
    /// `None` until the rolling window has filled
    pub debounced: Option<bool>,
    /// Confirmed event, present only on a debounced rising edge
    pub event: Option<DetectionEvent>,
    /// Live window projection for the presentation layer
    pub snapshot: SmootherSnapshot,
}

/// Single active detector for one session.
///
/// All mutable pipeline state (rolling window, remembered debounced state,
/// event log) lives behind this struct and is touched only by
/// `process_frame`.
pub struct DetectorSession {
    session_id: Uuid,
    classifier: FrameClassifier,
    smoother: TemporalSmoother,
    log: EventLog,
    alert: Option<AlertFn>,
    in_frame: bool,
}

impl Default for DetectorSession {
    fn default() -> Self {
        Self::new(
            ClassifierConfig::default(),
            SmootherConfig::default(),
            EventLog::default(),
        )
    }
}

impl DetectorSession {
    pub fn new(
        classifier_config: ClassifierConfig,
        smoother_config: SmootherConfig,
        log: EventLog,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            classifier: FrameClassifier::new(classifier_config),
            smoother: TemporalSmoother::new(smoother_config),
            log,
            alert: None,
            in_frame: false,
        }
    }

    /// Attach a fire-and-forget alert hook
    pub fn with_alert(mut self, alert: AlertFn) -> Self {
        self.alert = Some(alert);
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Run one frame through classify → smooth → log.
    ///
    /// Returns `None` if invoked re-entrantly; nested invocations are
    /// dropped rather than run, so the rolling window cannot be corrupted by
    /// a misbehaving caller.
    pub fn process_frame(
        &mut self,
        hands: &[HandObservation],
        face: Option<&FaceObservation>,
        now_ms: i64,
    ) -> Option<FrameOutcome> {
        if self.in_frame {
            warn!(session = %self.session_id, "re-entrant frame processing dropped");
            return None;
        }
        self.in_frame = true;

        let classification = self.classifier.classify(hands, face);
        let update = self.smoother.update(&classification, now_ms);

        if let Some(event) = update.event {
            self.log.append(event, now_ms);
            debug!(
                session = %self.session_id,
                timestamp_ms = event.timestamp,
                hand = event.handedness.as_str(),
                finger = event.finger_index,
                "nail-biting event confirmed"
            );
            if let Some(alert) = &mut self.alert {
                alert(&event);
            }
        }

        let outcome = FrameOutcome {
            classification,
            debounced: update.debounced,
            event: update.event,
            snapshot: self.smoother.snapshot(),
        };

        self.in_frame = false;
        Some(outcome)
    }

    /// Pull one frame from a landmark source and process it.
    ///
    /// While the source is still loading, the tick is a no-op: nothing is
    /// queued, no state changes, and the next tick retries naturally.
    pub fn tick(
        &mut self,
        source: &mut dyn LandmarkSource,
        now_ms: i64,
    ) -> Option<FrameOutcome> {
        if !source.poll_ready() {
            debug!(session = %self.session_id, "landmark source not ready, skipping frame");
            return None;
        }

        let hands = source.detect_hands(now_ms);
        let face = source.detect_face(now_ms);
        self.process_frame(&hands, face.as_ref(), now_ms)
    }

    /// The pruned event log contents, for the presentation layer
    pub fn events(&self) -> &[DetectionEvent] {
        self.log.events()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Dashboard roll-up over the current log and live window
    pub fn summary(&self, look_back: LookBack, now_ms: i64, tz: &FixedOffset) -> DashboardSummary {
        dashboard::summarize(
            self.log.events(),
            &self.smoother.snapshot().detection_history,
            look_back,
            now_ms,
            tz,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{LOWER_LIP_INDEX, UPPER_LIP_INDEX};
    use crate::smoother::DEFAULT_WINDOW_SIZE;
    use crate::source::ReplaySource;
    use crate::types::{FrameRecord, Handedness, Landmark};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn biting_frame(timestamp_ms: i64) -> FrameRecord {
        let mut face_landmarks = vec![Landmark::new(0.0, 0.0, 0.0); LOWER_LIP_INDEX + 1];
        face_landmarks[UPPER_LIP_INDEX] = Landmark::new(0.50, 0.52, 0.00);
        face_landmarks[LOWER_LIP_INDEX] = Landmark::new(0.50, 0.52, 0.00);

        let mut hand_landmarks = vec![Landmark::new(10.0, 10.0, 0.0); 21];
        hand_landmarks[8] = Landmark::new(0.50, 0.50, 0.00);

        FrameRecord {
            timestamp_ms,
            hands: vec![HandObservation {
                landmarks: hand_landmarks,
                handedness: Handedness::Right,
            }],
            face: Some(FaceObservation {
                landmarks: face_landmarks,
            }),
        }
    }

    fn idle_frame(timestamp_ms: i64) -> FrameRecord {
        FrameRecord {
            timestamp_ms,
            hands: Vec::new(),
            face: None,
        }
    }

    fn run_frames(session: &mut DetectorSession, frames: &[FrameRecord]) -> Vec<DetectionEvent> {
        let mut events = Vec::new();
        for frame in frames {
            let outcome = session
                .process_frame(&frame.hands, frame.face.as_ref(), frame.timestamp_ms)
                .expect("no re-entrancy in tests");
            if let Some(event) = outcome.event {
                events.push(event);
            }
        }
        events
    }

    #[test]
    fn test_sustained_biting_produces_one_logged_event() {
        let mut session = DetectorSession::default();
        let frames: Vec<FrameRecord> =
            (0..DEFAULT_WINDOW_SIZE as i64).map(biting_frame).collect();

        let events = run_frames(&mut session, &frames);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].handedness, Handedness::Right);
        assert_eq!(events[0].finger_index, 8);
        assert_eq!(session.events(), &events[..]);
    }

    #[test]
    fn test_idle_frames_produce_nothing() {
        let mut session = DetectorSession::default();
        let frames: Vec<FrameRecord> = (0..100).map(idle_frame).collect();

        let events = run_frames(&mut session, &frames);

        assert!(events.is_empty());
        assert!(session.events().is_empty());
    }

    #[test]
    fn test_tick_skips_frames_until_source_ready() {
        let frames: Vec<FrameRecord> =
            (0..DEFAULT_WINDOW_SIZE as i64).map(biting_frame).collect();
        let mut source = ReplaySource::new(frames.clone()).with_warmup(2);
        let mut session = DetectorSession::default();

        let mut outcomes = 0;
        for frame in &frames {
            if session.tick(&mut source, frame.timestamp_ms).is_some() {
                outcomes += 1;
            }
        }

        // First two ticks were dropped while the source warmed up, so the
        // window is still two frames short of full.
        assert_eq!(outcomes, frames.len() - 2);
        assert_eq!(session.log().len(), 0);

        // Two more ticks fill the window and confirm the event
        let last = frames.last().unwrap().timestamp_ms;
        let mut extra = ReplaySource::new(vec![biting_frame(last + 1), biting_frame(last + 2)]);
        session.tick(&mut extra, last + 1);
        session.tick(&mut extra, last + 2);
        assert_eq!(session.log().len(), 1);
    }

    #[test]
    fn test_alert_hook_fires_per_event() {
        let fired = Rc::new(RefCell::new(0));
        let fired_in_hook = Rc::clone(&fired);

        let mut session = DetectorSession::default().with_alert(Box::new(move |_event| {
            *fired_in_hook.borrow_mut() += 1;
        }));

        let frames: Vec<FrameRecord> =
            (0..DEFAULT_WINDOW_SIZE as i64 * 2).map(biting_frame).collect();
        run_frames(&mut session, &frames);

        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn test_summary_reflects_session_state() {
        let mut session = DetectorSession::default();
        let frames: Vec<FrameRecord> =
            (0..DEFAULT_WINDOW_SIZE as i64).map(biting_frame).collect();
        run_frames(&mut session, &frames);

        let utc = FixedOffset::east_opt(0).unwrap();
        let now = DEFAULT_WINDOW_SIZE as i64;
        let summary = session.summary(LookBack::Min5, now, &utc);

        assert_eq!(summary.attempts, 1);
        assert_eq!(summary.by_hand.right, 1);
        assert_eq!(summary.hit_rate, 1.0);
        assert_eq!(summary.timeline.len(), 1);
    }
}
