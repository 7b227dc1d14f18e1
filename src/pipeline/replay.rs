//! Offline replay of a recorded frame trace.
//!
//! Reads newline-delimited [`FramePayload`] JSON, runs it through the same
//! classify-then-stabilize path the daemon uses, and writes the gesture
//! events that would have fired, one JSON message per line.

use crate::classifier::FrameClassifier;
use crate::error::{GestoError, Result};
use crate::gesture::FramePayload;
use crate::pipeline::error::{ErrorReporter, StationError};
use crate::pipeline::station::StationRunner;
use crate::pipeline::stations::{ClassifierStation, StabilizerStation};
use crate::stabilizer::{Stabilizer, StabilizerConfig};
use crate::templates::Language;
use crossbeam_channel::bounded;
use std::io::{BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::thread;

/// Channel capacity between stations. Small on purpose: a slow stage
/// backpressures the reader instead of buffering the whole trace.
const CHANNEL_CAPACITY: usize = 32;

/// What a replay run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Frames fed into the pipeline.
    pub frames: usize,
    /// Input lines that did not parse as frame payloads.
    pub skipped: usize,
    /// Gesture events written out.
    pub events: usize,
}

/// Run a frame trace through the recognition pipeline.
///
/// The language is validated up front; an unsupported one fails the whole
/// run before any thread spawns. Unparseable input lines and recoverable
/// station errors are reported and skipped.
pub fn run_replay<R, W>(
    input: R,
    output: &mut W,
    classifier: Arc<dyn FrameClassifier>,
    config: StabilizerConfig,
    language: &str,
    reporter: Arc<dyn ErrorReporter>,
) -> Result<ReplayOutcome>
where
    R: BufRead,
    W: Write,
{
    Language::from_str(language)?;

    let lines: Vec<String> = input.lines().collect::<std::io::Result<_>>()?;

    let (frame_tx, frame_rx) = bounded::<FramePayload>(CHANNEL_CAPACITY);
    let (raw_tx, raw_rx) = bounded(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = bounded(CHANNEL_CAPACITY);

    let classify_runner = StationRunner::spawn(
        ClassifierStation::new(classifier),
        frame_rx,
        raw_tx,
        reporter.clone(),
    );
    let stabilize_runner = StationRunner::spawn(
        StabilizerStation::new(Stabilizer::new(config), language),
        raw_rx,
        event_tx,
        reporter.clone(),
    );

    // Feed from a separate thread so this one can drain events; with both
    // loops on one thread the bounded channels would deadlock.
    let producer_reporter = reporter.clone();
    let producer = thread::spawn(move || {
        let mut frames = 0usize;
        let mut skipped = 0usize;
        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<FramePayload>(trimmed) {
                Ok(payload) => {
                    if frame_tx.send(payload).is_err() {
                        break;
                    }
                    frames += 1;
                }
                Err(err) => {
                    producer_reporter.report(
                        "Reader",
                        &StationError::Recoverable(format!("bad frame line: {}", err)),
                    );
                    skipped += 1;
                }
            }
        }
        (frames, skipped)
    });

    let mut events = 0usize;
    while let Ok(event) = event_rx.recv() {
        let json = event.to_json().map_err(|e| GestoError::IpcProtocol {
            message: e.to_string(),
        })?;
        writeln!(output, "{}", json)?;
        events += 1;
    }

    let (frames, skipped) = producer
        .join()
        .map_err(|_| GestoError::Other("reader thread panicked".to_string()))?;
    classify_runner.join().map_err(GestoError::Other)?;
    stabilize_runner.join().map_err(GestoError::Other)?;

    Ok(ReplayOutcome {
        frames,
        skipped,
        events,
    })
}
