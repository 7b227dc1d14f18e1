//! Station pipeline for offline frame-trace replay.
//!
//! Each station runs in its own thread, connected by bounded crossbeam
//! channels for backpressure:
//!
//! ```text
//! trace lines ──▶ Classifier ──▶ Stabilizer ──▶ gesture events
//! ```
//!
//! The live daemon does not use this; sessions there are driven directly
//! by the IPC handler. Replay exists to answer "what would the daemon have
//! emitted for this trace" without standing a daemon up.

pub mod error;
pub mod replay;
pub mod station;
pub mod stations;

pub use error::{ErrorReporter, LogReporter, StationError};
pub use replay::{ReplayOutcome, run_replay};
pub use station::{Station, StationRunner};
pub use stations::{ClassifierStation, StabilizerStation};
