//! Gaze sample types shared by the reader and the analysis core.
//!
//! A recording is kept exactly as read: rows may carry missing fields until
//! a phase segment is cleaned.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single cleaned gaze sample.
///
/// Coordinates are screen pixels with a top-left origin, as written by the
/// recording software.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    /// Seconds since trial start
    pub time: f64,
    /// Horizontal screen coordinate
    pub x: f64,
    /// Vertical screen coordinate (top-left origin)
    pub y: f64,
}

impl GazeSample {
    pub fn new(time: f64, x: f64, y: f64) -> Self {
        Self { time, x, y }
    }

    /// Euclidean distance to another sample in screen space.
    pub fn distance(&self, other: &GazeSample) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A recorded row before cleaning. Any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub time: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl RawSample {
    pub fn new(time: Option<f64>, x: Option<f64>, y: Option<f64>) -> Self {
        Self { time, x, y }
    }

    /// Build a complete row.
    pub fn complete(time: f64, x: f64, y: f64) -> Self {
        Self::new(Some(time), Some(x), Some(y))
    }

    /// Convert to a clean sample, or `None` if any field is missing.
    pub fn to_sample(&self) -> Option<GazeSample> {
        match (self.time, self.x, self.y) {
            (Some(time), Some(x), Some(y)) => Some(GazeSample { time, x, y }),
            _ => None,
        }
    }
}

/// One trial's full recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecording {
    /// Trial identifier derived from the file name
    pub trial_id: String,
    /// File the recording was read from
    pub source: PathBuf,
    /// Rows in recorded order
    pub rows: Vec<RawSample>,
}

impl TrialRecording {
    pub fn new(trial_id: impl Into<String>, source: PathBuf, rows: Vec<RawSample>) -> Self {
        Self {
            trial_id: trial_id.into(),
            source,
            rows,
        }
    }

    /// Build an in-memory recording from complete samples.
    pub fn from_samples(trial_id: impl Into<String>, samples: &[GazeSample]) -> Self {
        let rows = samples
            .iter()
            .map(|s| RawSample::complete(s.time, s.x, s.y))
            .collect();
        Self::new(trial_id, PathBuf::new(), rows)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Time of the last row that carries a timestamp.
    pub fn last_time(&self) -> Option<f64> {
        self.rows.iter().rev().find_map(|r| r.time)
    }
}

/// Derive a trial identifier from a recording file name.
///
/// The identifier is the token before the first `_` of the file stem, so
/// `12_ID52b_scratch.csv` becomes `12`.
pub fn trial_id_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let token = stem.split('_').next()?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
