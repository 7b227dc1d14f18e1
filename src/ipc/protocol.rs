//! JSON message protocol for IPC communication between clients and the daemon.
//!
//! Messages are newline-delimited JSON. A connection is a session: clients
//! keep it open, stream frames, and read whatever events come back. Frames
//! that confirm nothing produce no reply at all.

use crate::gesture::FramePayload;
use serde::{Deserialize, Serialize};

/// Messages sent by clients to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Keepalive probe
    Ping,
    /// Begin feeding frames into this connection's session
    StartRecognition,
    /// Return to idle and clear all session state
    StopRecognition,
    /// One camera frame
    Frame {
        payload: FramePayload,
        /// Target language for the emitted snippet; the daemon default
        /// applies when omitted.
        #[serde(default)]
        language: Option<String>,
    },
    /// Get daemon and session status
    Status,
    /// Shutdown the daemon
    Shutdown,
}

impl ClientMessage {
    /// Serialize message to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize message from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Messages sent by the daemon to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Keepalive reply
    Pong,
    /// Recognition started
    Started,
    /// Recognition stopped, session state cleared
    Stopped,
    /// A gesture was confirmed
    Gesture {
        label: String,
        confidence: f32,
        /// The code snippet for the gesture in the requested language.
        command: String,
        description: String,
        /// Rolling record of recently confirmed gestures, oldest first.
        gesture_sequence: Vec<String>,
    },
    /// Current daemon and session status
    Status {
        recognizing: bool,
        active_sessions: usize,
        classifier: String,
        daemon_version: String,
    },
    /// Daemon is shutting down
    ShuttingDown,
    /// Error occurred
    Error { message: String },
}

impl ServerMessage {
    /// Serialize message to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize message from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ClientMessage Tests

    #[test]
    fn test_client_message_ping_format() {
        let msg = ClientMessage::Ping;
        let json = msg.to_json().expect("should serialize");
        assert_eq!(json, r#"{"type":"ping"}"#);
    }

    #[test]
    fn test_client_message_snake_case_tags() {
        let json = ClientMessage::StartRecognition
            .to_json()
            .expect("should serialize");
        assert_eq!(json, r#"{"type":"start_recognition"}"#);

        let json = ClientMessage::StopRecognition
            .to_json()
            .expect("should serialize");
        assert_eq!(json, r#"{"type":"stop_recognition"}"#);
    }

    #[test]
    fn test_client_message_frame_format() {
        let msg = ClientMessage::Frame {
            payload: FramePayload::Classification {
                label: "LOOP".to_string(),
                confidence: 0.9,
            },
            language: Some("javascript".to_string()),
        };
        let json = msg.to_json().expect("should serialize");
        assert_eq!(
            json,
            r#"{"type":"frame","payload":{"kind":"classification","label":"LOOP","confidence":0.9},"language":"javascript"}"#
        );
    }

    #[test]
    fn test_client_message_frame_language_optional() {
        let json = r#"{"type":"frame","payload":{"kind":"luma","pixels":[10,20]}}"#;
        let msg = ClientMessage::from_json(json).expect("should deserialize");
        match msg {
            ClientMessage::Frame { language, .. } => assert!(language.is_none()),
            other => panic!("expected Frame, got {:?}", other),
        }
    }

    #[test]
    fn test_client_message_all_variants_roundtrip() {
        let messages = vec![
            ClientMessage::Ping,
            ClientMessage::StartRecognition,
            ClientMessage::StopRecognition,
            ClientMessage::Frame {
                payload: FramePayload::Landmarks {
                    points: vec![[0.1, 0.2, 0.3]],
                },
                language: None,
            },
            ClientMessage::Status,
            ClientMessage::Shutdown,
        ];

        for msg in messages {
            let json = msg.to_json().expect("should serialize");
            let deserialized = ClientMessage::from_json(&json).expect("should deserialize");
            assert_eq!(msg, deserialized, "roundtrip failed for {:?}", msg);
        }
    }

    #[test]
    fn test_client_message_invalid_json_fails() {
        assert!(ClientMessage::from_json("not json").is_err());
        assert!(ClientMessage::from_json(r#"{"type":"warp"}"#).is_err());
        assert!(ClientMessage::from_json("").is_err());
    }

    // ServerMessage Tests

    #[test]
    fn test_server_message_pong_format() {
        let json = ServerMessage::Pong.to_json().expect("should serialize");
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_server_message_gesture_format() {
        let msg = ServerMessage::Gesture {
            label: "LOOP".to_string(),
            confidence: 0.92,
            command: "for i in range(10):\n    pass".to_string(),
            description: "Creates a for loop".to_string(),
            gesture_sequence: vec!["LOOP".to_string()],
        };
        let json = msg.to_json().expect("should serialize");
        assert!(json.starts_with(r#"{"type":"gesture","label":"LOOP""#));
        assert!(json.contains(r#""gesture_sequence":["LOOP"]"#));

        let deserialized = ServerMessage::from_json(&json).expect("should deserialize");
        assert_eq!(msg, deserialized);
    }

    #[test]
    fn test_server_message_status_roundtrip() {
        let msg = ServerMessage::Status {
            recognizing: true,
            active_sessions: 2,
            classifier: "brightness".to_string(),
            daemon_version: "0.2.1".to_string(),
        };
        let json = msg.to_json().expect("should serialize");
        let deserialized = ServerMessage::from_json(&json).expect("should deserialize");
        assert_eq!(msg, deserialized);
    }

    #[test]
    fn test_server_message_error_roundtrip() {
        let msg = ServerMessage::Error {
            message: "Unsupported target language: rust".to_string(),
        };
        let json = msg.to_json().expect("should serialize");
        assert!(json.contains("unsupported") || json.contains("Unsupported"));
        let deserialized = ServerMessage::from_json(&json).expect("should deserialize");
        assert_eq!(msg, deserialized);
    }

    #[test]
    fn test_server_message_special_characters() {
        let msg = ServerMessage::Gesture {
            label: "FUNCTION".to_string(),
            confidence: 0.8,
            command: "function myFunction() {\n    \n}".to_string(),
            description: "Defines a function".to_string(),
            gesture_sequence: vec![],
        };
        let json = msg.to_json().expect("should serialize");
        let deserialized = ServerMessage::from_json(&json).expect("should deserialize");
        match deserialized {
            ServerMessage::Gesture { command, .. } => {
                assert_eq!(command, "function myFunction() {\n    \n}");
            }
            other => panic!("expected Gesture, got {:?}", other),
        }
    }

    #[test]
    fn test_server_message_invalid_json_fails() {
        assert!(ServerMessage::from_json("{").is_err());
        assert!(ServerMessage::from_json(r#"{"type":"gesture"}"#).is_err());
    }
}
