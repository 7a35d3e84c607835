//! Run summary builder.
//!
//! The summary is the run-level output of an analysis: per-phase
//! sum/mean/std of area durations across included trials, plus the
//! exclusion and failure records. It is never merged into the per-trial
//! CSV tables.

use crate::core::aggregate::PhaseSummary;
use crate::core::aoi::Region;
use crate::report::log::{ExclusionRecord, RunLog, RunStats, TrialFailure};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The current summary format version.
pub const SUMMARY_VERSION: &str = "1.0";

/// The name of this producer.
pub const PRODUCER_NAME: &str = "gaze-scratch-analysis";

/// Producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
}

/// Run-level summary document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub summary_version: String,
    /// Unique id of this run
    pub run_id: String,
    /// When this summary was computed (RFC3339)
    pub computed_at_utc: String,
    pub producer: Producer,
    pub participant_id: String,
    pub condition: String,
    /// Statistics per phase, in trial order. `NaN` values serialize as `null`.
    pub phases: Vec<PhaseSummary>,
    pub stats: RunStats,
    pub exclusions: Vec<ExclusionRecord>,
    pub failures: Vec<TrialFailure>,
}

impl RunSummary {
    /// Human-readable statistics block, one line per phase and area.
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        for summary in &self.phases {
            for region in [Region::Rise, Region::Drop] {
                let stats = summary.region(region);
                lines.push(format!(
                    "{} {}: n={} sum={:.4} mean={:.4} std={:.4}",
                    summary.phase.title(),
                    region,
                    stats.trials,
                    stats.sum,
                    stats.mean,
                    stats.std_dev
                ));
            }
        }
        lines.join("\n")
    }
}

/// Builder for run summaries.
pub struct SummaryBuilder {
    run_id: Uuid,
}

impl SummaryBuilder {
    /// Create a new builder with a unique run id.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn build(
        &self,
        participant_id: &str,
        condition: &str,
        phases: Vec<PhaseSummary>,
        log: &RunLog,
    ) -> RunSummary {
        RunSummary {
            summary_version: SUMMARY_VERSION.to_string(),
            run_id: self.run_id.to_string(),
            computed_at_utc: Utc::now().to_rfc3339(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            participant_id: participant_id.to_string(),
            condition: condition.to_string(),
            phases,
            stats: log.stats(),
            exclusions: log.exclusions().to_vec(),
            failures: log.failures().to_vec(),
        }
    }
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// File name of the run summary.
pub fn summary_file_name(participant_id: &str, condition: &str) -> String {
    format!("SUMMARY_{participant_id}_{condition}.json")
}
