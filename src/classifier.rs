//! Per-frame geometric classification
//!
//! This module decides, for a single frame's landmark sets, whether any
//! fingertip is within a proximity threshold of the mouth center. The output
//! is intentionally noisy; temporal smoothing happens downstream.

use crate::types::{
    BiteHit, FaceObservation, FrameClassification, HandObservation, Landmark,
};

/// Fingertip landmark indices in the 21-point hand model:
/// thumb, index, middle, ring, pinky tips.
pub const FINGERTIP_INDICES: [usize; 5] = [4, 8, 12, 16, 20];

/// Upper inner-lip landmark index in the face mesh
pub const UPPER_LIP_INDEX: usize = 13;

/// Lower inner-lip landmark index in the face mesh
pub const LOWER_LIP_INDEX: usize = 14;

/// Default fingertip-to-mouth proximity threshold in normalized units
pub const DEFAULT_PROXIMITY_THRESHOLD: f64 = 0.08;

/// Default depth-axis weight.
///
/// Depth separation is amplified to suppress false positives from hands that
/// only look close to the mouth in the 2D projection.
pub const DEFAULT_DEPTH_WEIGHT: f64 = 3.0;

/// Tunable classifier parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    /// Maximum weighted fingertip-to-mouth distance that counts as biting
    pub proximity_threshold: f64,
    /// Multiplier applied to the z separation before the distance is taken
    pub depth_weight: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
            depth_weight: DEFAULT_DEPTH_WEIGHT,
        }
    }
}

/// Frame classifier over hand and face landmark observations
#[derive(Debug, Clone, Default)]
pub struct FrameClassifier {
    config: ClassifierConfig,
}

impl FrameClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one frame.
    ///
    /// Iteration is hand-then-finger; the first fingertip under the threshold
    /// wins and classification short-circuits. Ties are deliberately broken by
    /// iteration order, not by minimum distance. The winning hit carries the
    /// handedness of the same hand observation that produced it.
    ///
    /// Malformed observations (missing landmark indices) are treated as
    /// no-detection for that hand or face; this function never panics.
    pub fn classify(
        &self,
        hands: &[HandObservation],
        face: Option<&FaceObservation>,
    ) -> FrameClassification {
        let mouth = match face.and_then(mouth_center) {
            Some(point) => point,
            None => return FrameClassification::negative(),
        };

        for hand in hands {
            for &tip_index in &FINGERTIP_INDICES {
                let tip = match hand.landmarks.get(tip_index) {
                    Some(point) => point,
                    None => continue,
                };

                let distance = weighted_distance(tip, &mouth, self.config.depth_weight);
                if distance < self.config.proximity_threshold {
                    return FrameClassification::positive(BiteHit {
                        handedness: hand.handedness,
                        finger_index: tip_index,
                        distance,
                    });
                }
            }
        }

        FrameClassification::negative()
    }
}

/// Mouth center: midpoint of the upper and lower inner-lip landmarks.
///
/// Returns `None` when the face observation does not carry both landmarks.
pub fn mouth_center(face: &FaceObservation) -> Option<Landmark> {
    let upper = face.landmarks.get(UPPER_LIP_INDEX)?;
    let lower = face.landmarks.get(LOWER_LIP_INDEX)?;

    Some(Landmark::new(
        (upper.x + lower.x) / 2.0,
        (upper.y + lower.y) / 2.0,
        (upper.z + lower.z) / 2.0,
    ))
}

/// Euclidean distance with the z separation scaled by `depth_weight`
fn weighted_distance(a: &Landmark, b: &Landmark, depth_weight: f64) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = (a.z - b.z) * depth_weight;
    (dx * dx + dy * dy + dz * dz).sqrt()
}
