//! Core gesture types shared by the classifier, stabilizer, and wire protocol.

use crate::error::{GestoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gesture vocabulary.
///
/// Each label maps to a code template per target language, except
/// [`GestureLabel::NoGesture`], the sentinel for "no hand / nothing
/// recognizable" frames. The sentinel never enters the gesture sequence
/// and never fires an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureLabel {
    Loop,
    If,
    Function,
    Variable,
    Print,
    NoGesture,
}

impl GestureLabel {
    /// Wire form of the label, e.g. `"LOOP"` or `"NO_GESTURE"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::Loop => "LOOP",
            GestureLabel::If => "IF",
            GestureLabel::Function => "FUNCTION",
            GestureLabel::Variable => "VARIABLE",
            GestureLabel::Print => "PRINT",
            GestureLabel::NoGesture => "NO_GESTURE",
        }
    }

    pub fn is_no_gesture(&self) -> bool {
        matches!(self, GestureLabel::NoGesture)
    }

    /// All labels that map to code templates, in catalog order.
    pub fn template_labels() -> &'static [GestureLabel] {
        &[
            GestureLabel::Loop,
            GestureLabel::If,
            GestureLabel::Function,
            GestureLabel::Variable,
            GestureLabel::Print,
        ]
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GestureLabel {
    type Err = GestoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LOOP" => Ok(GestureLabel::Loop),
            "IF" => Ok(GestureLabel::If),
            "FUNCTION" => Ok(GestureLabel::Function),
            "VARIABLE" => Ok(GestureLabel::Variable),
            "PRINT" => Ok(GestureLabel::Print),
            "NO_GESTURE" => Ok(GestureLabel::NoGesture),
            other => Err(GestoError::InvalidClassification {
                message: format!("unknown label {}", other),
            }),
        }
    }
}

/// One per-frame classifier verdict before smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawClassification {
    pub label: GestureLabel,
    /// Classifier confidence in [0.0, 1.0].
    pub confidence: f32,
}

impl RawClassification {
    pub fn new(label: GestureLabel, confidence: f32) -> Self {
        Self { label, confidence }
    }

    /// The "nothing recognized" frame. Carries zero confidence so it can
    /// never contribute to a stable gesture's mean.
    pub fn no_gesture() -> Self {
        Self {
            label: GestureLabel::NoGesture,
            confidence: 0.0,
        }
    }

    /// Strict constructor for untrusted label/confidence pairs.
    ///
    /// Rejects unknown labels and confidences outside [0.0, 1.0]
    /// (NaN included).
    pub fn try_from_wire(label: &str, confidence: f32) -> Result<Self> {
        let label = label.parse::<GestureLabel>()?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(GestoError::InvalidClassification {
                message: format!("confidence {} out of range", confidence),
            });
        }
        Ok(Self { label, confidence })
    }

    /// Lenient constructor for the serving path: anything
    /// [`RawClassification::try_from_wire`] rejects becomes a no-gesture
    /// frame instead of an error, so one garbled frame never kills a stream.
    pub fn sanitized(label: &str, confidence: f32) -> Self {
        Self::try_from_wire(label, confidence).unwrap_or_else(|_| Self::no_gesture())
    }

    pub fn is_no_gesture(&self) -> bool {
        self.label.is_no_gesture()
    }
}

/// One camera frame as it crosses the wire.
///
/// The variant decides which classifier lane handles the frame: clients
/// running their own model send `classification`, thin clients send raw
/// `luma` pixels or hand `landmarks` and let the daemon classify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FramePayload {
    /// A label/confidence pair produced by the client.
    Classification { label: String, confidence: f32 },
    /// Grayscale pixel values for the brightness heuristic.
    Luma { pixels: Vec<u8> },
    /// Hand landmarks as normalized `[x, y, z]` image coordinates.
    Landmarks { points: Vec<[f32; 3]> },
}
