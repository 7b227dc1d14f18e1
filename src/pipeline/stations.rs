//! Concrete stations for the replay pipeline.

use crate::classifier::FrameClassifier;
use crate::gesture::{FramePayload, RawClassification};
use crate::ipc::protocol::ServerMessage;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::stabilizer::Stabilizer;
use std::sync::Arc;

/// Classifies each frame payload into a raw label/confidence pair.
///
/// Every frame passes through, no-gesture verdicts included; the stabilizer
/// downstream needs the full stream to vote over.
pub struct ClassifierStation {
    classifier: Arc<dyn FrameClassifier>,
}

impl ClassifierStation {
    pub fn new(classifier: Arc<dyn FrameClassifier>) -> Self {
        Self { classifier }
    }
}

impl Station for ClassifierStation {
    type Input = FramePayload;
    type Output = RawClassification;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StationError> {
        self.classifier
            .classify(&input)
            .map(Some)
            .map_err(StationError::from)
    }

    fn name(&self) -> &'static str {
        "Classifier"
    }
}

/// Runs raw classifications through a stabilizer and emits only new events.
pub struct StabilizerStation {
    stabilizer: Stabilizer,
    language: String,
}

impl StabilizerStation {
    pub fn new(stabilizer: Stabilizer, language: impl Into<String>) -> Self {
        Self {
            stabilizer,
            language: language.into(),
        }
    }
}

impl Station for StabilizerStation {
    type Input = RawClassification;
    type Output = ServerMessage;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, StationError> {
        let stable = self
            .stabilizer
            .ingest(input, &self.language)
            .map_err(StationError::from)?;
        if !stable.is_new_event {
            return Ok(None);
        }
        let Some(template) = stable.template else {
            return Ok(None);
        };
        Ok(Some(ServerMessage::Gesture {
            label: stable.label.as_str().to_string(),
            confidence: stable.confidence,
            command: template.snippet.to_string(),
            description: template.description.to_string(),
            gesture_sequence: self.stabilizer.sequence().wire_labels(),
        }))
    }

    fn name(&self) -> &'static str {
        "Stabilizer"
    }
}
