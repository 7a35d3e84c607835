//! Run reporting.
//!
//! Tracks what an analysis run processed, excluded and skipped, and builds
//! the run-level summary document.

pub mod log;
pub mod summary;

// Re-export commonly used types
pub use log::{ExclusionRecord, RunLog, RunStats, TrialFailure};
pub use summary::{summary_file_name, RunSummary, SummaryBuilder, PRODUCER_NAME, SUMMARY_VERSION};
