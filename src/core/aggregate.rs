//! Per-trial looking-time aggregates and run-level phase statistics.
//!
//! For each included (trial, phase) the fixation durations inside the two
//! areas of interest are summed and combined into the duration looking
//! score:
//!
//! ```text
//! DLS = (duration_rise - duration_drop) / (duration_rise + duration_drop)
//! ```
//!
//! DLS is `NaN` when no fixation landed in either area.

use crate::core::aoi::Region;
use crate::core::fixation::Fixation;
use crate::core::phases::Phase;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Aggregate row for one trial in one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialPhaseAggregate {
    pub trial_id: String,
    pub duration_rise: f64,
    pub duration_drop: f64,
    pub duration_sum: f64,
    pub dls: f64,
    pub condition: String,
}

impl TrialPhaseAggregate {
    /// Build a row from the fixations detected inside each area.
    pub fn from_fixations(
        trial_id: impl Into<String>,
        condition: impl Into<String>,
        rise: &[Fixation],
        drop: &[Fixation],
    ) -> Self {
        Self::from_durations(
            trial_id,
            condition,
            total_duration(rise),
            total_duration(drop),
        )
    }

    /// Build a row from summed durations.
    pub fn from_durations(
        trial_id: impl Into<String>,
        condition: impl Into<String>,
        duration_rise: f64,
        duration_drop: f64,
    ) -> Self {
        let duration_sum = duration_rise + duration_drop;
        Self {
            trial_id: trial_id.into(),
            duration_rise,
            duration_drop,
            duration_sum,
            dls: (duration_rise - duration_drop) / duration_sum,
            condition: condition.into(),
        }
    }
}

/// Sum of fixation durations.
pub fn total_duration(fixations: &[Fixation]) -> f64 {
    fixations.iter().map(|f| f.duration).sum()
}

/// Sum, mean and population standard deviation of per-trial durations.
///
/// Mean and standard deviation are `NaN` when no trial contributed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub trials: usize,
    pub sum: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl RegionStats {
    pub fn from_durations(durations: &[f64]) -> Self {
        Self {
            trials: durations.len(),
            sum: durations.iter().sum(),
            mean: durations.iter().mean(),
            std_dev: durations.iter().population_std_dev(),
        }
    }
}

/// Run-level statistics for one phase across included trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub rise: RegionStats,
    pub drop: RegionStats,
}

impl PhaseSummary {
    pub fn region(&self, region: Region) -> &RegionStats {
        match region {
            Region::Drop => &self.drop,
            Region::Rise => &self.rise,
        }
    }
}

/// Summarise the aggregate rows of one phase.
pub fn summarize_phase<'a>(
    phase: Phase,
    rows: impl IntoIterator<Item = &'a TrialPhaseAggregate>,
) -> PhaseSummary {
    let (rise, drop): (Vec<f64>, Vec<f64>) = rows
        .into_iter()
        .map(|row| (row.duration_rise, row.duration_drop))
        .unzip();

    PhaseSummary {
        phase,
        rise: RegionStats::from_durations(&rise),
        drop: RegionStats::from_durations(&drop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixation(start: f64, end: f64) -> Fixation {
        Fixation {
            start,
            end,
            duration: end - start,
            x: 0.0,
            y: 0.0,
        }
    }

    #[test]
    fn test_dls_from_fixations() {
        let rise = vec![fixation(0.0, 1.0), fixation(2.0, 3.5)];
        let drop = vec![fixation(4.0, 4.5)];
        let row = TrialPhaseAggregate::from_fixations("3", "Rise", &rise, &drop);

        assert_eq!(row.duration_rise, 2.5);
        assert_eq!(row.duration_drop, 0.5);
        assert_eq!(row.duration_sum, 3.0);
        assert!((row.dls - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(row.condition, "Rise");
    }

    #[test]
    fn test_dls_bounds() {
        let only_rise = TrialPhaseAggregate::from_durations("1", "Drop", 2.0, 0.0);
        assert_eq!(only_rise.dls, 1.0);

        let only_drop = TrialPhaseAggregate::from_durations("1", "Drop", 0.0, 2.0);
        assert_eq!(only_drop.dls, -1.0);
    }

    #[test]
    fn test_dls_nan_without_fixations() {
        let row = TrialPhaseAggregate::from_fixations("1", "Rise", &[], &[]);
        assert_eq!(row.duration_sum, 0.0);
        assert!(row.dls.is_nan());
    }

    #[test]
    fn test_phase_summary_statistics() {
        let rows = vec![
            TrialPhaseAggregate::from_durations("1", "Rise", 2.0, 1.0),
            TrialPhaseAggregate::from_durations("2", "Rise", 4.0, 1.0),
        ];
        let summary = summarize_phase(Phase::Contingent, &rows);

        assert_eq!(summary.rise.trials, 2);
        assert_eq!(summary.rise.sum, 6.0);
        assert!((summary.rise.mean - 3.0).abs() < 1e-12);
        assert!((summary.rise.std_dev - 1.0).abs() < 1e-12);
        assert_eq!(summary.region(Region::Drop).std_dev, 0.0);
    }

    #[test]
    fn test_empty_phase_summary() {
        let rows: Vec<TrialPhaseAggregate> = Vec::new();
        let summary = summarize_phase(Phase::Baseline, &rows);
        assert_eq!(summary.rise.trials, 0);
        assert_eq!(summary.rise.sum, 0.0);
        assert!(summary.rise.mean.is_nan());
        assert!(summary.drop.std_dev.is_nan());
    }
}
