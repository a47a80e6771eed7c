//! Phytotron Backbone curation core.
//!
//! The backbone ingests five independently-timestamped measurement streams
//! from a research growth facility and periodically produces one
//! temporally-aligned, validated dataset:
//!
//! ```text
//! spool store ──► collect ──► validate ──► join ──► snapshot
//!                    │   (telemetry only)    │      (atomic CSV)
//!                    └── five streams, per-stream lookback windows
//! ```
//!
//! Every cycle recomputes the full window from scratch; there is no
//! watermark or checkpoint state to corrupt. The scheduler isolates cycles
//! from each other: one failed cycle leaves the previous snapshot intact
//! and the next tick is the retry.

pub mod cli;
pub mod collect;
pub mod curate;
pub mod exit_codes;
pub mod join;
pub mod model;
pub mod scheduler;
pub mod snapshot;
pub mod validate;

pub use curate::{Curator, CycleOutcome};
pub use exit_codes::ExitCode;
