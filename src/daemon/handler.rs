//! Session message dispatch for the daemon.

use crate::daemon::DaemonState;
use crate::gesture::FramePayload;
use crate::ipc::protocol::{ClientMessage, ServerMessage};
use crate::ipc::server::SessionHandler;
use crate::session::RecognitionSession;
use crate::version_string;
use std::sync::Arc;

/// Per-message handler for daemon IPC sessions.
pub struct DaemonSessionHandler {
    state: Arc<DaemonState>,
    quiet: bool,
    verbosity: u8,
}

impl DaemonSessionHandler {
    /// Creates a new session handler.
    pub fn new(state: Arc<DaemonState>, quiet: bool, verbosity: u8) -> Self {
        Self {
            state,
            quiet,
            verbosity,
        }
    }

    /// Classify and stabilize one frame. Returns a reply only when the
    /// frame confirms a new gesture or fails.
    async fn handle_frame(
        &self,
        session: &mut RecognitionSession,
        payload: FramePayload,
        language: Option<String>,
    ) -> Option<ServerMessage> {
        // Frames sent before start_recognition are dropped silently.
        if !session.is_recognizing() {
            return None;
        }

        let raw = match self.state.classifier.classify(&payload) {
            Ok(raw) => raw,
            Err(e) => {
                return Some(ServerMessage::Error {
                    message: e.to_string(),
                });
            }
        };

        if self.verbosity >= 2 {
            eprintln!("frame: {} ({:.2})", raw.label, raw.confidence);
        }

        match session.ingest(raw, language.as_deref())? {
            Ok(stable) => {
                if !stable.is_new_event {
                    return None;
                }
                let template = stable.template?;

                if self.verbosity >= 1 {
                    eprintln!("gesture: {} ({:.2})", stable.label, stable.confidence);
                }

                Some(ServerMessage::Gesture {
                    label: stable.label.to_string(),
                    confidence: stable.confidence,
                    command: template.snippet.to_string(),
                    description: template.description.to_string(),
                    gesture_sequence: session.sequence_labels(),
                })
            }
            Err(e) => Some(ServerMessage::Error {
                message: e.to_string(),
            }),
        }
    }

    /// Get daemon status as seen from this session.
    async fn get_status(&self, session: &RecognitionSession) -> ServerMessage {
        ServerMessage::Status {
            recognizing: session.is_recognizing(),
            active_sessions: self.state.active_sessions(),
            classifier: self.state.classifier.name().to_string(),
            daemon_version: version_string(),
        }
    }
}

#[async_trait::async_trait]
impl SessionHandler for DaemonSessionHandler {
    async fn open_session(&self) -> RecognitionSession {
        self.state.session_opened();

        if self.verbosity >= 1 {
            eprintln!("client connected ({} active)", self.state.active_sessions());
        }

        RecognitionSession::new(
            self.state.stabilizer_config().await,
            self.state.default_language().await,
        )
    }

    async fn handle(
        &self,
        session: &mut RecognitionSession,
        message: ClientMessage,
    ) -> Option<ServerMessage> {
        match message {
            ClientMessage::Ping => Some(ServerMessage::Pong),
            ClientMessage::StartRecognition => {
                session.start();
                if self.verbosity >= 1 {
                    eprintln!("recognition started");
                }
                Some(ServerMessage::Started)
            }
            ClientMessage::StopRecognition => {
                session.stop();
                if self.verbosity >= 1 {
                    eprintln!("recognition stopped");
                }
                Some(ServerMessage::Stopped)
            }
            ClientMessage::Frame { payload, language } => {
                self.handle_frame(session, payload, language).await
            }
            ClientMessage::Status => Some(self.get_status(session).await),
            ClientMessage::Shutdown => {
                if !self.quiet {
                    eprintln!("shutdown requested by client");
                }
                self.state.request_shutdown();
                Some(ServerMessage::ShuttingDown)
            }
        }
    }

    async fn close_session(&self) {
        self.state.session_closed();

        if self.verbosity >= 1 {
            eprintln!(
                "client disconnected ({} active)",
                self.state.active_sessions()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{FrameClassifier, MockClassifier};
    use crate::config::Config;
    use crate::gesture::{GestureLabel, RawClassification};
    use std::time::Duration;

    fn create_test_handler(classifier: MockClassifier) -> DaemonSessionHandler {
        let classifier: Arc<dyn FrameClassifier> = Arc::new(classifier);
        let state = Arc::new(DaemonState::new(Config::default(), classifier));
        DaemonSessionHandler::new(state, true, 0)
    }

    fn classification_frame() -> ClientMessage {
        ClientMessage::Frame {
            payload: FramePayload::Classification {
                label: "LOOP".to_string(),
                confidence: 0.9,
            },
            language: None,
        }
    }

    #[tokio::test]
    async fn test_handler_ping() {
        let handler = create_test_handler(MockClassifier::new("mock"));
        let mut session = handler.open_session().await;

        let reply = handler.handle(&mut session, ClientMessage::Ping).await;

        assert_eq!(reply, Some(ServerMessage::Pong));
    }

    #[tokio::test]
    async fn test_handler_start_and_stop() {
        let handler = create_test_handler(MockClassifier::new("mock"));
        let mut session = handler.open_session().await;

        let reply = handler
            .handle(&mut session, ClientMessage::StartRecognition)
            .await;
        assert_eq!(reply, Some(ServerMessage::Started));
        assert!(session.is_recognizing());

        let reply = handler
            .handle(&mut session, ClientMessage::StopRecognition)
            .await;
        assert_eq!(reply, Some(ServerMessage::Stopped));
        assert!(!session.is_recognizing());
    }

    #[tokio::test]
    async fn test_frames_before_start_are_dropped() {
        let handler = create_test_handler(
            MockClassifier::new("mock")
                .with_response(RawClassification::new(GestureLabel::Loop, 0.9)),
        );
        let mut session = handler.open_session().await;

        let reply = handler.handle(&mut session, classification_frame()).await;

        assert_eq!(reply, None, "Idle sessions must not reply to frames");
        assert!(session.sequence_labels().is_empty());
    }

    #[tokio::test]
    async fn test_first_stable_frame_emits_gesture() {
        let handler = create_test_handler(
            MockClassifier::new("mock")
                .with_response(RawClassification::new(GestureLabel::Loop, 0.9)),
        );
        let mut session = handler.open_session().await;

        handler
            .handle(&mut session, ClientMessage::StartRecognition)
            .await;

        let reply = handler.handle(&mut session, classification_frame()).await;

        match reply {
            Some(ServerMessage::Gesture {
                label,
                confidence,
                command,
                description,
                gesture_sequence,
            }) => {
                assert_eq!(label, "LOOP");
                assert!((confidence - 0.9).abs() < 1e-6);
                assert!(command.contains("for ("));
                assert_eq!(description, "Creates a for loop");
                assert_eq!(gesture_sequence, vec!["LOOP".to_string()]);
            }
            other => panic!("Expected Gesture reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_repeated_frames_stay_silent() {
        let handler = create_test_handler(
            MockClassifier::new("mock")
                .with_response(RawClassification::new(GestureLabel::Print, 0.8)),
        );
        let mut session = handler.open_session().await;

        handler
            .handle(&mut session, ClientMessage::StartRecognition)
            .await;

        let first = handler.handle(&mut session, classification_frame()).await;
        assert!(matches!(first, Some(ServerMessage::Gesture { .. })));

        for _ in 0..4 {
            let reply = handler.handle(&mut session, classification_frame()).await;
            assert_eq!(reply, None, "Repeated stable frames must not re-fire");
        }
    }

    #[tokio::test]
    async fn test_frame_with_language_override() {
        let handler = create_test_handler(
            MockClassifier::new("mock")
                .with_response(RawClassification::new(GestureLabel::Print, 0.8)),
        );
        let mut session = handler.open_session().await;

        handler
            .handle(&mut session, ClientMessage::StartRecognition)
            .await;

        let frame = ClientMessage::Frame {
            payload: FramePayload::Classification {
                label: "PRINT".to_string(),
                confidence: 0.8,
            },
            language: Some("python".to_string()),
        };
        let reply = handler.handle(&mut session, frame).await;

        match reply {
            Some(ServerMessage::Gesture { command, .. }) => {
                assert_eq!(command, "print()");
            }
            other => panic!("Expected Gesture reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsupported_language_reports_error() {
        let handler = create_test_handler(
            MockClassifier::new("mock")
                .with_response(RawClassification::new(GestureLabel::Loop, 0.9)),
        );
        let mut session = handler.open_session().await;

        handler
            .handle(&mut session, ClientMessage::StartRecognition)
            .await;

        let frame = ClientMessage::Frame {
            payload: FramePayload::Classification {
                label: "LOOP".to_string(),
                confidence: 0.9,
            },
            language: Some("cobol".to_string()),
        };
        let reply = handler.handle(&mut session, frame).await;

        match reply {
            Some(ServerMessage::Error { message }) => {
                assert!(message.contains("Unsupported target language"));
                assert!(message.contains("cobol"));
            }
            other => panic!("Expected Error reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_classifier_failure_reports_error() {
        let handler = create_test_handler(MockClassifier::new("mock").with_failure());
        let mut session = handler.open_session().await;

        handler
            .handle(&mut session, ClientMessage::StartRecognition)
            .await;

        let reply = handler.handle(&mut session, classification_frame()).await;

        match reply {
            Some(ServerMessage::Error { message }) => {
                assert!(message.contains("mock classification failure"));
            }
            other => panic!("Expected Error reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handler_status() {
        let handler = create_test_handler(MockClassifier::new("mock"));
        let mut session = handler.open_session().await;

        let reply = handler.handle(&mut session, ClientMessage::Status).await;

        match reply {
            Some(ServerMessage::Status {
                recognizing,
                active_sessions,
                classifier,
                daemon_version,
            }) => {
                assert!(!recognizing, "Sessions start idle");
                assert_eq!(active_sessions, 1);
                assert_eq!(classifier, "mock");
                assert!(daemon_version.starts_with(env!("CARGO_PKG_VERSION")));
            }
            other => panic!("Expected Status reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handler_shutdown() {
        let handler = create_test_handler(MockClassifier::new("mock"));
        let mut session = handler.open_session().await;

        let reply = handler.handle(&mut session, ClientMessage::Shutdown).await;

        assert_eq!(reply, Some(ServerMessage::ShuttingDown));

        // The shutdown permit is stored, so the wait resolves immediately.
        tokio::time::timeout(Duration::from_millis(100), handler.state.shutdown.notified())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_open_and_close_update_session_count() {
        let handler = create_test_handler(MockClassifier::new("mock"));

        let _session = handler.open_session().await;
        assert_eq!(handler.state.active_sessions(), 1);

        handler.close_session().await;
        assert_eq!(handler.state.active_sessions(), 0);
    }
}
