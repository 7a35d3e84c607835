//! Splitting a trial recording into experiment phases.
//!
//! Every trial of the gaze scratch paradigm runs through three phases:
//! a free-viewing baseline, a gaze-contingent phase, and a final
//! disruption phase. Phases are cut by fixed time rules relative to the
//! trial start and the last recorded timestamp, then cleaned.

use crate::input::types::{GazeSample, RawSample, TrialRecording};
use serde::{Deserialize, Serialize};

/// Experiment phase of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Baseline,
    Contingent,
    Disruption,
}

impl Phase {
    /// All phases in trial order.
    pub const ALL: [Phase; 3] = [Phase::Baseline, Phase::Contingent, Phase::Disruption];

    /// Lowercase name, used in fixation table file names.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Baseline => "baseline",
            Phase::Contingent => "contingent",
            Phase::Disruption => "disruption",
        }
    }

    /// Capitalised name, used in aggregate table file names.
    pub fn title(&self) -> &'static str {
        match self {
            Phase::Baseline => "Baseline",
            Phase::Contingent => "Contingent",
            Phase::Disruption => "Disruption",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baseline" => Ok(Phase::Baseline),
            "contingent" => Ok(Phase::Contingent),
            "disruption" => Ok(Phase::Disruption),
            other => Err(format!("unknown phase '{other}'")),
        }
    }
}

/// Time rules for cutting phases, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTiming {
    /// Baseline keeps samples strictly after this time
    pub baseline_start: f64,
    /// Baseline keeps samples strictly before this time
    pub baseline_end: f64,
    /// Disruption keeps samples within this many seconds of the last timestamp
    pub disruption_window: f64,
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self {
            baseline_start: 4.0,
            baseline_end: 9.0,
            disruption_window: 5.0,
        }
    }
}

/// Segmentation failures. A failing trial is skipped, the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentError {
    /// The recording has no timestamped rows.
    EmptyRecording,
    /// A phase needed as a boundary for another phase is empty.
    MissingData(Phase),
}

impl std::fmt::Display for SegmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentError::EmptyRecording => write!(f, "recording has no timestamped samples"),
            SegmentError::MissingData(phase) => write!(
                f,
                "{phase} segment is empty, contingent phase boundary is undefined"
            ),
        }
    }
}

impl std::error::Error for SegmentError {}

/// The cleaned samples of one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSegment {
    pub phase: Phase,
    /// Samples with all fields present, in recorded order
    pub samples: Vec<GazeSample>,
    /// Rows in the phase window dropped for missing fields
    pub dropped_rows: usize,
}

impl PhaseSegment {
    /// Clean the rows of a phase window. Rows with any missing field are dropped.
    pub fn from_rows<'a>(phase: Phase, rows: impl IntoIterator<Item = &'a RawSample>) -> Self {
        let mut samples = Vec::new();
        let mut dropped_rows = 0;

        for row in rows {
            match row.to_sample() {
                Some(sample) => samples.push(sample),
                None => dropped_rows += 1,
            }
        }

        Self {
            phase,
            samples,
            dropped_rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// A trial split into its three cleaned phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedTrial {
    pub trial_id: String,
    pub baseline: PhaseSegment,
    pub contingent: PhaseSegment,
    pub disruption: PhaseSegment,
}

impl SegmentedTrial {
    pub fn segment(&self, phase: Phase) -> &PhaseSegment {
        match phase {
            Phase::Baseline => &self.baseline,
            Phase::Contingent => &self.contingent,
            Phase::Disruption => &self.disruption,
        }
    }

    /// Segments in trial order.
    pub fn segments(&self) -> [&PhaseSegment; 3] {
        [&self.baseline, &self.contingent, &self.disruption]
    }
}

/// Split a recording into baseline, contingent and disruption phases.
///
/// - baseline: `baseline_start < time < baseline_end`
/// - disruption: `time > last_time - disruption_window`
/// - contingent: between the last baseline row and the first disruption row,
///   both exclusive
///
/// Boundaries are taken from the rows before cleaning, in recorded order.
/// Rows without a timestamp belong to no phase.
pub fn segment_trial(
    recording: &TrialRecording,
    timing: &PhaseTiming,
) -> Result<SegmentedTrial, SegmentError> {
    let last_time = recording
        .last_time()
        .ok_or(SegmentError::EmptyRecording)?;

    let timed: Vec<(f64, &RawSample)> = recording
        .rows
        .iter()
        .filter_map(|row| row.time.map(|t| (t, row)))
        .collect();

    let baseline_rows: Vec<(f64, &RawSample)> = timed
        .iter()
        .copied()
        .filter(|(t, _)| *t > timing.baseline_start && *t < timing.baseline_end)
        .collect();

    let disruption_start = last_time - timing.disruption_window;
    let disruption_rows: Vec<(f64, &RawSample)> = timed
        .iter()
        .copied()
        .filter(|(t, _)| *t > disruption_start)
        .collect();

    let baseline_last = baseline_rows
        .last()
        .map(|(t, _)| *t)
        .ok_or(SegmentError::MissingData(Phase::Baseline))?;
    let disruption_first = disruption_rows
        .first()
        .map(|(t, _)| *t)
        .ok_or(SegmentError::MissingData(Phase::Disruption))?;

    let contingent_rows = timed
        .iter()
        .filter(|(t, _)| *t > baseline_last && *t < disruption_first)
        .map(|(_, row)| *row);

    Ok(SegmentedTrial {
        trial_id: recording.trial_id.clone(),
        baseline: PhaseSegment::from_rows(Phase::Baseline, baseline_rows.iter().map(|(_, r)| *r)),
        contingent: PhaseSegment::from_rows(Phase::Contingent, contingent_rows),
        disruption: PhaseSegment::from_rows(
            Phase::Disruption,
            disruption_rows.iter().map(|(_, r)| *r),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// A recording sampled at 120 Hz from 0 to `duration` seconds.
    fn recording(duration: f64) -> TrialRecording {
        let n = (duration * 120.0).round() as usize;
        let rows = (0..=n)
            .map(|k| RawSample::complete(k as f64 / 120.0, 500.0, 500.0))
            .collect();
        TrialRecording::new("1", PathBuf::new(), rows)
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::Baseline.name(), "baseline");
        assert_eq!(Phase::Disruption.title(), "Disruption");
        assert_eq!("Contingent".parse::<Phase>(), Ok(Phase::Contingent));
        assert!("warmup".parse::<Phase>().is_err());
    }

    #[test]
    fn test_segment_fifteen_second_trial() {
        let trial = segment_trial(&recording(15.0), &PhaseTiming::default()).unwrap();

        assert!(trial.baseline.samples.iter().all(|s| s.time > 4.0 && s.time < 9.0));
        assert!(trial.disruption.samples.iter().all(|s| s.time > 10.0));
        assert!(trial.disruption.samples.last().unwrap().time == 15.0);

        let baseline_last = trial.baseline.samples.last().unwrap().time;
        let disruption_first = trial.disruption.samples.first().unwrap().time;
        assert!(!trial.contingent.is_empty());
        assert!(trial
            .contingent
            .samples
            .iter()
            .all(|s| s.time > baseline_last && s.time < disruption_first));
    }

    #[test]
    fn test_baseline_bounds_are_exclusive() {
        let rows = vec![
            RawSample::complete(4.0, 1.0, 1.0),
            RawSample::complete(5.0, 1.0, 1.0),
            RawSample::complete(9.0, 1.0, 1.0),
            RawSample::complete(20.0, 1.0, 1.0),
        ];
        let rec = TrialRecording::new("1", PathBuf::new(), rows);
        let trial = segment_trial(&rec, &PhaseTiming::default()).unwrap();

        assert_eq!(trial.baseline.len(), 1);
        assert_eq!(trial.baseline.samples[0].time, 5.0);
        // 9.0 lies between the baseline end and the disruption start
        assert_eq!(trial.contingent.len(), 1);
        assert_eq!(trial.contingent.samples[0].time, 9.0);
        assert_eq!(trial.disruption.len(), 1);
    }

    #[test]
    fn test_empty_baseline_is_missing_data() {
        let err = segment_trial(&recording(3.0), &PhaseTiming::default()).unwrap_err();
        assert_eq!(err, SegmentError::MissingData(Phase::Baseline));
    }

    #[test]
    fn test_empty_recording() {
        let rec = TrialRecording::new("1", PathBuf::new(), vec![RawSample::default()]);
        assert_eq!(
            segment_trial(&rec, &PhaseTiming::default()),
            Err(SegmentError::EmptyRecording)
        );
    }

    #[test]
    fn test_cleaning_drops_incomplete_rows() {
        let mut rec = recording(15.0);
        for row in rec.rows.iter_mut().filter(|r| r.time.unwrap() > 12.0) {
            row.x = None;
        }
        let trial = segment_trial(&rec, &PhaseTiming::default()).unwrap();

        assert!(trial.disruption.dropped_rows > 0);
        assert!(trial.disruption.samples.iter().all(|s| s.time <= 12.0));
        assert_eq!(trial.baseline.dropped_rows, 0);
    }

    #[test]
    fn test_boundaries_use_rows_before_cleaning() {
        // The last baseline row lacks a coordinate but still bounds the contingent phase.
        let rows = vec![
            RawSample::complete(5.0, 1.0, 1.0),
            RawSample::complete(8.0, 1.0, 1.0),
            RawSample::new(Some(8.5), None, Some(1.0)),
            RawSample::complete(9.5, 1.0, 1.0),
            RawSample::complete(20.0, 1.0, 1.0),
        ];
        let rec = TrialRecording::new("1", PathBuf::new(), rows);
        let trial = segment_trial(&rec, &PhaseTiming::default()).unwrap();

        assert_eq!(trial.baseline.len(), 2);
        assert_eq!(trial.baseline.dropped_rows, 1);
        assert_eq!(trial.contingent.len(), 1);
        assert_eq!(trial.contingent.samples[0].time, 9.5);
    }
}
