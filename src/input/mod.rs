//! Input boundary for the analysis.
//!
//! Recordings arrive as one delimited file per trial, written by the
//! experiment runner. This module turns them into [`TrialRecording`]s.

pub mod reader;
pub mod types;

// Re-export commonly used types
pub use reader::{discover_trials, read_recording, read_samples, ColumnMap, InputError};
pub use types::{trial_id_from_path, GazeSample, RawSample, TrialRecording};
