//! Per-frame gesture classification.
//!
//! Classifiers turn one [`FramePayload`] into one [`RawClassification`];
//! all smoothing happens downstream in the stabilizer. Which lane a daemon
//! runs is picked once at startup from `[classifier]` config.

pub mod brightness;
pub mod landmark;
pub mod passthrough;

pub use brightness::BrightnessClassifier;
pub use landmark::LandmarkClassifier;
pub use passthrough::PassthroughClassifier;

use crate::config::{ClassifierConfig, ClassifierKind};
use crate::error::{GestoError, Result};
use crate::gesture::{FramePayload, RawClassification};
use std::sync::Arc;

/// Trait for per-frame gesture classification.
///
/// This trait allows swapping implementations (heuristics vs mock vs
/// client-side models).
pub trait FrameClassifier: Send + Sync {
    /// Classify one frame.
    ///
    /// # Arguments
    /// * `payload` - The frame as it arrived on the wire
    ///
    /// # Returns
    /// A raw label/confidence verdict, or an error when the payload kind
    /// does not match the classifier's lane.
    fn classify(&self, payload: &FramePayload) -> Result<RawClassification>;

    /// Get the classifier's name, as reported in status output
    fn name(&self) -> &str;

    /// Check if the classifier is ready
    fn is_ready(&self) -> bool;
}

/// Implement FrameClassifier for Arc<T> to allow sharing across sessions.
impl<T: FrameClassifier> FrameClassifier for Arc<T> {
    fn classify(&self, payload: &FramePayload) -> Result<RawClassification> {
        (**self).classify(payload)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Build the classifier selected by the config.
pub fn create_classifier(config: &ClassifierConfig) -> Arc<dyn FrameClassifier> {
    match config.kind {
        ClassifierKind::Brightness => Arc::new(BrightnessClassifier::new(
            config.loop_threshold,
            config.if_threshold,
            config.function_threshold,
        )),
        ClassifierKind::Landmark => Arc::new(LandmarkClassifier::new()),
        ClassifierKind::Passthrough => Arc::new(PassthroughClassifier::new()),
    }
}

/// Mock classifier for testing
#[derive(Debug, Clone)]
pub struct MockClassifier {
    name: String,
    response: RawClassification,
    should_fail: bool,
}

impl MockClassifier {
    /// Create a new mock classifier with default settings
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            response: RawClassification::no_gesture(),
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific classification
    pub fn with_response(mut self, response: RawClassification) -> Self {
        self.response = response;
        self
    }

    /// Configure the mock to fail on classify
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl FrameClassifier for MockClassifier {
    fn classify(&self, _payload: &FramePayload) -> Result<RawClassification> {
        if self.should_fail {
            Err(GestoError::Classifier {
                message: "mock classification failure".to_string(),
            })
        } else {
            Ok(self.response)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
