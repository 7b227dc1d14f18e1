//! Mean-luma threshold classifier.
//!
//! The simplest possible lane: average the grayscale pixels of a frame and
//! bucket the mean into a label. It exists for thin clients with no hand
//! tracking at all, and as a deterministic end-to-end exercise of the
//! recognition path.

use crate::defaults;
use crate::error::{GestoError, Result};
use crate::gesture::{FramePayload, GestureLabel, RawClassification};

use super::FrameClassifier;

/// Classifies frames by mean luma against three descending thresholds.
#[derive(Debug, Clone)]
pub struct BrightnessClassifier {
    loop_threshold: f32,
    if_threshold: f32,
    function_threshold: f32,
}

impl BrightnessClassifier {
    pub fn new(loop_threshold: f32, if_threshold: f32, function_threshold: f32) -> Self {
        Self {
            loop_threshold,
            if_threshold,
            function_threshold,
        }
    }

    fn mean_luma(pixels: &[u8]) -> f32 {
        let sum: u64 = pixels.iter().map(|p| u64::from(*p)).sum();
        sum as f32 / pixels.len() as f32
    }
}

impl Default for BrightnessClassifier {
    fn default() -> Self {
        Self::new(
            defaults::LOOP_LUMA_THRESHOLD,
            defaults::IF_LUMA_THRESHOLD,
            defaults::FUNCTION_LUMA_THRESHOLD,
        )
    }
}

impl FrameClassifier for BrightnessClassifier {
    fn classify(&self, payload: &FramePayload) -> Result<RawClassification> {
        let FramePayload::Luma { pixels } = payload else {
            return Err(GestoError::Classifier {
                message: "brightness classifier expects luma frames".to_string(),
            });
        };
        if pixels.is_empty() {
            return Ok(RawClassification::no_gesture());
        }

        let mean = Self::mean_luma(pixels);
        let label = if mean > self.loop_threshold {
            GestureLabel::Loop
        } else if mean > self.if_threshold {
            GestureLabel::If
        } else if mean > self.function_threshold {
            GestureLabel::Function
        } else {
            GestureLabel::Variable
        };
        Ok(RawClassification::new(label, defaults::HEURISTIC_CONFIDENCE))
    }

    fn name(&self) -> &str {
        "brightness"
    }

    fn is_ready(&self) -> bool {
        true
    }
}
