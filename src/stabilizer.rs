//! Majority-vote smoothing and debouncing for raw gesture streams.
//!
//! Per-frame classifier output flickers; this module turns it into a stream
//! a client can act on:
//!
//! ```text
//! raw frames ──▶ confidence gate ──▶ history window ──▶ majority vote ──▶ debounce ──▶ events
//! ```
//!
//! The stabilizer is single-session state. Every connection gets its own
//! [`Stabilizer`]; nothing here is shared or locked.

use crate::defaults;
use crate::error::{GestoError, Result};
use crate::gesture::{GestureLabel, RawClassification};
use crate::templates::{self, GestureTemplate, Language};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;

/// Tuning knobs for one stabilizer instance.
///
/// Mirrors the `[stabilizer]` section of the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Raw classifications kept for the majority vote.
    pub history_window: usize,
    /// Confirmed gestures kept in the rolling sequence.
    pub sequence_capacity: usize,
    /// Suppress repeat events while a stable label is held.
    pub debounce: bool,
    /// Raw frames below this confidence count as no-gesture.
    pub min_confidence: f32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            history_window: defaults::HISTORY_WINDOW,
            sequence_capacity: defaults::SEQUENCE_CAPACITY,
            debounce: defaults::DEBOUNCE,
            min_confidence: defaults::MIN_CONFIDENCE,
        }
    }
}

/// Bounded FIFO of the most recent raw classifications.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    entries: VecDeque<RawClassification>,
    capacity: usize,
}

impl HistoryWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a frame, evicting the oldest when full.
    pub fn push(&mut self, raw: RawClassification) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(raw);
    }

    /// Oldest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &RawClassification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Bounded FIFO of confirmed gesture labels, oldest first.
///
/// Only gets appended to when a *new* stable gesture is confirmed; held
/// gestures and the no-gesture sentinel never enter it.
#[derive(Debug, Clone)]
pub struct GestureSequence {
    labels: VecDeque<GestureLabel>,
    capacity: usize,
}

impl GestureSequence {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            labels: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, label: GestureLabel) {
        if self.labels.len() == self.capacity {
            self.labels.pop_front();
        }
        self.labels.push_back(label);
    }

    /// Snapshot of the sequence, oldest first.
    pub fn labels(&self) -> Vec<GestureLabel> {
        self.labels.iter().copied().collect()
    }

    /// Wire form of the sequence, e.g. `["LOOP", "IF"]`.
    pub fn wire_labels(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.as_str().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }
}

/// The stabilized verdict for one ingested frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StableGesture {
    /// Majority label over the current history window.
    pub label: GestureLabel,
    /// Mean confidence over the window entries carrying the winning label.
    /// Zero when the label is the no-gesture sentinel.
    pub confidence: f32,
    /// Code template for the label in the requested language.
    /// `None` only for the no-gesture sentinel.
    pub template: Option<&'static GestureTemplate>,
    /// True exactly when this frame confirmed a gesture the client should
    /// act on. Never true for the no-gesture sentinel.
    pub is_new_event: bool,
}

/// Turns a noisy per-frame classification stream into stable gesture events.
pub struct Stabilizer {
    window: HistoryWindow,
    sequence: GestureSequence,
    /// Stable label of the previous frame, for debouncing.
    previous: Option<GestureLabel>,
    config: StabilizerConfig,
}

impl Stabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            window: HistoryWindow::new(config.history_window),
            sequence: GestureSequence::new(config.sequence_capacity),
            previous: None,
            config,
        }
    }

    /// Ingest one raw classification and return the stabilized verdict.
    ///
    /// The language is validated before any state changes, so an
    /// unsupported language leaves the stabilizer exactly as it was. A
    /// missing template is the opposite: the frame has already been
    /// recorded and the sequence updated by the time the lookup fails, so
    /// retrying the same gesture does not double-append.
    pub fn ingest(&mut self, raw: RawClassification, language: &str) -> Result<StableGesture> {
        let language = Language::from_str(language)?;

        let raw = if raw.confidence < self.config.min_confidence {
            RawClassification::no_gesture()
        } else {
            raw
        };
        self.window.push(raw);

        let (label, confidence) = self.resolve_window();

        let changed = !label.is_no_gesture() && self.previous != Some(label);
        if changed {
            self.sequence.push(label);
        }
        self.previous = Some(label);

        let is_new_event = if self.config.debounce {
            changed
        } else {
            !label.is_no_gesture()
        };

        if label.is_no_gesture() {
            return Ok(StableGesture {
                label,
                confidence: 0.0,
                template: None,
                is_new_event,
            });
        }

        let template = templates::get_template(label, language).ok_or_else(|| {
            GestoError::MissingTemplate {
                label: label.as_str().to_string(),
                language: language.as_str().to_string(),
            }
        })?;

        Ok(StableGesture {
            label,
            confidence,
            template: Some(template),
            is_new_event,
        })
    }

    /// Majority vote over the window; ties go to the label seen first.
    fn resolve_window(&self) -> (GestureLabel, f32) {
        let mut seen: Vec<GestureLabel> = Vec::new();
        for entry in self.window.iter() {
            if !seen.contains(&entry.label) {
                seen.push(entry.label);
            }
        }

        let mut winner = GestureLabel::NoGesture;
        let mut winner_count = 0;
        for label in seen {
            let count = self.window.iter().filter(|e| e.label == label).count();
            if count > winner_count {
                winner = label;
                winner_count = count;
            }
        }

        if winner.is_no_gesture() {
            return (GestureLabel::NoGesture, 0.0);
        }

        let mut sum = 0.0;
        let mut matching = 0;
        for entry in self.window.iter().filter(|e| e.label == winner) {
            sum += entry.confidence;
            matching += 1;
        }
        (winner, sum / matching as f32)
    }

    /// Drop all state: history, sequence, and debounce memory.
    ///
    /// Idempotent; a reset stabilizer behaves exactly like a fresh one.
    pub fn reset(&mut self) {
        self.window.clear();
        self.sequence.clear();
        self.previous = None;
    }

    pub fn sequence(&self) -> &GestureSequence {
        &self.sequence
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(StabilizerConfig::default())
    }
}
