//! Hand-pose classifier over 21-point landmarks.
//!
//! Works on the standard 21-point hand model (wrist plus four joints per
//! finger) in normalized image coordinates, y growing downward. A finger
//! counts as extended when its tip sits above its middle joint. Poses:
//!
//! - fist            -> LOOP
//! - thumbs up       -> IF
//! - open palm       -> FUNCTION
//! - pointing        -> VARIABLE
//! - peace sign      -> PRINT
//!
//! Anything else, including a frame with the wrong landmark count, is a
//! no-gesture frame.

use crate::defaults;
use crate::error::{GestoError, Result};
use crate::gesture::{FramePayload, GestureLabel, RawClassification};

use super::FrameClassifier;

const THUMB_TIP: usize = 4;
const THUMB_IP: usize = 3;
const INDEX_TIP: usize = 8;
const INDEX_PIP: usize = 6;
const MIDDLE_TIP: usize = 12;
const MIDDLE_PIP: usize = 10;
const RING_TIP: usize = 16;
const RING_PIP: usize = 14;
const PINKY_TIP: usize = 20;
const PINKY_PIP: usize = 18;

/// Classifies frames by matching finger-extension patterns.
#[derive(Debug, Clone, Default)]
pub struct LandmarkClassifier;

impl LandmarkClassifier {
    pub fn new() -> Self {
        Self
    }

    fn extended(points: &[[f32; 3]], tip: usize, pip: usize) -> bool {
        points[tip][1] < points[pip][1]
    }
}

impl FrameClassifier for LandmarkClassifier {
    fn classify(&self, payload: &FramePayload) -> Result<RawClassification> {
        let FramePayload::Landmarks { points } = payload else {
            return Err(GestoError::Classifier {
                message: "landmark classifier expects landmark frames".to_string(),
            });
        };
        if points.len() != defaults::LANDMARK_POINTS {
            return Ok(RawClassification::no_gesture());
        }

        let thumb = Self::extended(points, THUMB_TIP, THUMB_IP);
        let index = Self::extended(points, INDEX_TIP, INDEX_PIP);
        let middle = Self::extended(points, MIDDLE_TIP, MIDDLE_PIP);
        let ring = Self::extended(points, RING_TIP, RING_PIP);
        let pinky = Self::extended(points, PINKY_TIP, PINKY_PIP);

        let label = match (thumb, index, middle, ring, pinky) {
            (_, true, true, true, true) => GestureLabel::Function,
            (false, true, true, false, false) => GestureLabel::Print,
            (false, true, false, false, false) => GestureLabel::Variable,
            (true, false, false, false, false) => GestureLabel::If,
            (false, false, false, false, false) => GestureLabel::Loop,
            _ => GestureLabel::NoGesture,
        };

        if label.is_no_gesture() {
            return Ok(RawClassification::no_gesture());
        }
        Ok(RawClassification::new(label, defaults::HEURISTIC_CONFIDENCE))
    }

    fn name(&self) -> &str {
        "landmark"
    }

    fn is_ready(&self) -> bool {
        true
    }
}
