//! Default configuration constants for gesto.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default history window capacity in frames.
///
/// The stable label is the majority vote over the last N raw classifications.
/// Five frames at the 5 FPS client cadence means one second of history, enough
/// to absorb single-frame classifier flicker without feeling laggy.
pub const HISTORY_WINDOW: usize = 5;

/// Default gesture sequence capacity.
///
/// The rolling record of recently confirmed gestures shown to clients.
/// Kept short; it is a context strip, not a full history.
pub const SEQUENCE_CAPACITY: usize = 5;

/// Default target language for code templates.
pub const DEFAULT_LANGUAGE: &str = "javascript";

/// Default frame interval in milliseconds for the feed client.
///
/// 200ms (5 FPS) matches the capture cadence the daemon is tuned for.
pub const FRAME_INTERVAL_MS: u64 = 200;

/// Confidence reported by the heuristic classifiers.
///
/// Brightness and landmark classification are threshold rules with no
/// probabilistic output; a fixed high confidence keeps their frames from
/// being starved by the confidence gate.
pub const HEURISTIC_CONFIDENCE: f32 = 0.95;

/// Mean luma above which a frame classifies as LOOP.
pub const LOOP_LUMA_THRESHOLD: f32 = 200.0;

/// Mean luma above which a frame classifies as IF.
pub const IF_LUMA_THRESHOLD: f32 = 150.0;

/// Mean luma above which a frame classifies as FUNCTION.
///
/// Frames at or below this threshold classify as VARIABLE. The three
/// thresholds must stay in descending order; config validation enforces it.
pub const FUNCTION_LUMA_THRESHOLD: f32 = 100.0;

/// Default minimum confidence for a raw classification to count.
///
/// Frames below the gate are treated as no-gesture. 0.0 disables the gate,
/// which suits the heuristic classifiers; raise it for model-backed input.
pub const MIN_CONFIDENCE: f32 = 0.0;

/// Whether stable gestures are debounced by default.
///
/// With debouncing on, a held gesture fires one event; every further frame of
/// the same stable label is suppressed until the label changes.
pub const DEBOUNCE: bool = true;

/// Number of hand landmarks per frame.
///
/// Matches the 21-point hand model (wrist plus four joints per finger).
pub const LANDMARK_POINTS: usize = 21;
