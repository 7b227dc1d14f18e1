//! Passthrough lane for clients that classify frames themselves.
//!
//! The client's label/confidence pair is taken as-is after sanitizing;
//! garbage (unknown label, confidence outside [0, 1]) becomes a no-gesture
//! frame rather than an error, so one bad frame never interrupts a stream.

use crate::error::{GestoError, Result};
use crate::gesture::{FramePayload, RawClassification};

use super::FrameClassifier;

#[derive(Debug, Clone, Default)]
pub struct PassthroughClassifier;

impl PassthroughClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl FrameClassifier for PassthroughClassifier {
    fn classify(&self, payload: &FramePayload) -> Result<RawClassification> {
        let FramePayload::Classification { label, confidence } = payload else {
            return Err(GestoError::Classifier {
                message: "passthrough classifier expects classification frames".to_string(),
            });
        };
        Ok(RawClassification::sanitized(label, *confidence))
    }

    fn name(&self) -> &str {
        "passthrough"
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureLabel;

    fn classify(label: &str, confidence: f32) -> RawClassification {
        PassthroughClassifier::new()
            .classify(&FramePayload::Classification {
                label: label.to_string(),
                confidence,
            })
            .unwrap()
    }

    #[test]
    fn passes_valid_classification_through() {
        let raw = classify("FUNCTION", 0.82);
        assert_eq!(raw.label, GestureLabel::Function);
        assert_eq!(raw.confidence, 0.82);
    }

    #[test]
    fn unknown_label_becomes_no_gesture() {
        assert!(classify("SWIPE", 0.9).is_no_gesture());
    }

    #[test]
    fn out_of_range_confidence_becomes_no_gesture() {
        assert!(classify("LOOP", 1.5).is_no_gesture());
        assert!(classify("LOOP", -0.2).is_no_gesture());
    }

    #[test]
    fn explicit_no_gesture_passes_through() {
        let raw = classify("NO_GESTURE", 0.0);
        assert!(raw.is_no_gesture());
    }

    #[test]
    fn rejects_non_classification_payload() {
        let classifier = PassthroughClassifier::new();
        let result = classifier.classify(&FramePayload::Landmarks { points: vec![] });
        assert!(matches!(result, Err(GestoError::Classifier { .. })));
    }
}
