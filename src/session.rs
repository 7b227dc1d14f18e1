//! Per-connection recognition sessions.
//!
//! Each IPC connection owns one session: its own stabilizer, its own
//! gesture sequence, its own idle/recognizing flag. Two clients gesturing
//! at the same daemon never see each other's state.

use crate::error::Result;
use crate::gesture::RawClassification;
use crate::stabilizer::{StableGesture, Stabilizer, StabilizerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Frames are dropped without touching the stabilizer.
    Idle,
    /// Frames feed the stabilizer.
    Recognizing,
}

pub struct RecognitionSession {
    state: SessionState,
    stabilizer: Stabilizer,
    /// Used when a frame arrives without an explicit language.
    default_language: String,
}

impl RecognitionSession {
    pub fn new(config: StabilizerConfig, default_language: impl Into<String>) -> Self {
        Self {
            state: SessionState::Idle,
            stabilizer: Stabilizer::new(config),
            default_language: default_language.into(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recognizing(&self) -> bool {
        self.state == SessionState::Recognizing
    }

    /// Enter recognizing. Idempotent; restarting never clears history,
    /// only [`RecognitionSession::stop`] does.
    pub fn start(&mut self) {
        self.state = SessionState::Recognizing;
    }

    /// Return to idle and drop all stabilizer state. Harmless when
    /// already idle.
    pub fn stop(&mut self) {
        self.state = SessionState::Idle;
        self.stabilizer.reset();
    }

    /// Feed one raw classification through the session.
    ///
    /// Returns `None` while idle (the frame is dropped entirely), otherwise
    /// the stabilizer's verdict for the frame.
    pub fn ingest(
        &mut self,
        raw: RawClassification,
        language: Option<&str>,
    ) -> Option<Result<StableGesture>> {
        if self.state == SessionState::Idle {
            return None;
        }
        let language = language.unwrap_or(&self.default_language);
        Some(self.stabilizer.ingest(raw, language))
    }

    /// Wire form of the rolling gesture sequence.
    pub fn sequence_labels(&self) -> Vec<String> {
        self.stabilizer.sequence().wire_labels()
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }
}
