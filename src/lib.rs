//! gesto - Turn hand gestures into code snippets
//!
//! Stabilizes noisy gesture classifications into debounced snippet events.

// Error handling discipline: unwrap/expect stay in tests.
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod classifier;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod defaults;
pub mod error;
pub mod gesture;
pub mod ipc;
pub mod pipeline;
pub mod session;
pub mod stabilizer;
pub mod templates;

// Core types (raw frame → stable gesture → snippet)
pub use gesture::{FramePayload, GestureLabel, RawClassification};
pub use stabilizer::{GestureSequence, HistoryWindow, StableGesture, Stabilizer, StabilizerConfig};
pub use templates::{GestureTemplate, Language, get_template};

// Session management
pub use session::{RecognitionSession, SessionState};

// Classifier seam
pub use classifier::{FrameClassifier, create_classifier};

// Error handling
pub use error::{GestoError, Result};

// Config
pub use config::Config;

// Station framework (for advanced users)
pub use pipeline::{ErrorReporter, Station, StationError};

/// Build version string with optional git commit hash.
///
/// Returns `"0.2.1+abc1234"` when git hash is available, `"0.2.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        // In a git repo build, GIT_HASH is set → expect "0.2.1+<hash>"
        // In CI without git, expect plain "0.2.1"
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(
                hash_part.len(),
                7,
                "Git hash should be 7 chars, got: {}",
                hash_part
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
