//! Pre-registered inclusion criteria for phase segments.
//!
//! The looking-time estimate is `sample_count * ((1000 / sample_rate_hz) * duration_scale)`.
//! With the default scale of 1000 this is not seconds; the defaults reproduce
//! the figures used by earlier analyses of the paradigm and must not change.

use crate::core::phases::{Phase, PhaseSegment};
use serde::{Deserialize, Serialize};

/// Minimum looking time per phase and the sampling assumptions behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclusionCriteria {
    /// Threshold for the baseline phase
    pub baseline: f64,
    /// Threshold for the contingent phase
    pub contingent: f64,
    /// Threshold for the disruption phase
    pub disruption: f64,
    /// Nominal eye-tracker sampling rate
    pub sample_rate_hz: f64,
    /// Multiplier applied to the sampling interval in milliseconds
    pub duration_scale: f64,
}

impl Default for InclusionCriteria {
    fn default() -> Self {
        Self {
            baseline: 1.0,
            contingent: 10.0,
            disruption: 0.5,
            sample_rate_hz: 120.0,
            duration_scale: 1000.0,
        }
    }
}

impl InclusionCriteria {
    /// Criteria whose estimate is in seconds.
    pub fn in_seconds() -> Self {
        Self {
            duration_scale: 0.001,
            ..Self::default()
        }
    }

    /// Threshold for a phase.
    pub fn threshold(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Baseline => self.baseline,
            Phase::Contingent => self.contingent,
            Phase::Disruption => self.disruption,
        }
    }

    /// Looking-time estimate for a number of samples.
    pub fn duration_estimate(&self, sample_count: usize) -> f64 {
        sample_count as f64 * ((1000.0 / self.sample_rate_hz) * self.duration_scale)
    }

    /// Classify a cleaned segment. Never fails.
    pub fn evaluate(&self, segment: &PhaseSegment) -> InclusionOutcome {
        let estimate = self.duration_estimate(segment.len());
        let threshold = self.threshold(segment.phase);

        InclusionOutcome {
            phase: segment.phase,
            sample_count: segment.len(),
            estimate,
            threshold,
            included: estimate >= threshold,
        }
    }
}

/// Result of checking one (trial, phase) segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InclusionOutcome {
    pub phase: Phase,
    pub sample_count: usize,
    pub estimate: f64,
    pub threshold: f64,
    pub included: bool,
}

impl InclusionOutcome {
    pub fn is_excluded(&self) -> bool {
        !self.included
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::types::GazeSample;

    fn segment(phase: Phase, n: usize) -> PhaseSegment {
        PhaseSegment {
            phase,
            samples: (0..n)
                .map(|k| GazeSample::new(k as f64 / 120.0, 0.0, 0.0))
                .collect(),
            dropped_rows: 0,
        }
    }

    #[test]
    fn test_baseline_estimate_uses_reference_scale() {
        let criteria = InclusionCriteria::default();
        let outcome = criteria.evaluate(&segment(Phase::Baseline, 100));

        assert_eq!(outcome.estimate, 100.0 * ((1000.0 / 120.0) * 1000.0));
        assert_eq!(outcome.threshold, 1.0);
        assert!(outcome.included);
    }

    #[test]
    fn test_empty_segment_is_excluded() {
        let criteria = InclusionCriteria::default();
        for phase in Phase::ALL {
            let outcome = criteria.evaluate(&segment(phase, 0));
            assert!(outcome.is_excluded(), "{phase} should be excluded");
            assert_eq!(outcome.estimate, 0.0);
        }
    }

    #[test]
    fn test_thresholds_per_phase() {
        let criteria = InclusionCriteria::default();
        assert_eq!(criteria.threshold(Phase::Baseline), 1.0);
        assert_eq!(criteria.threshold(Phase::Contingent), 10.0);
        assert_eq!(criteria.threshold(Phase::Disruption), 0.5);
    }

    #[test]
    fn test_seconds_scale() {
        let criteria = InclusionCriteria::in_seconds();

        // 24 samples at 120 Hz is 0.2 s
        let short = criteria.evaluate(&segment(Phase::Disruption, 24));
        assert!((short.estimate - 0.2).abs() < 1e-9);
        assert!(short.is_excluded());

        let long = criteria.evaluate(&segment(Phase::Disruption, 600));
        assert!(long.included);
    }
}
