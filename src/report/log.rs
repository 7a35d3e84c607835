//! Processing log for one analysis run.
//!
//! Counts what the run did and keeps a record of every excluded segment
//! and every skipped trial, so a run can be audited after the fact.

use crate::core::phases::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A (trial, phase) segment that failed its inclusion criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionRecord {
    pub trial_id: String,
    pub phase: Phase,
    pub sample_count: usize,
    pub estimate: f64,
    pub threshold: f64,
}

/// A trial that could not be analysed at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialFailure {
    /// Trial id, when one could be derived
    pub trial_id: Option<String>,
    pub source: PathBuf,
    pub reason: String,
}

/// Counters and records for the current run.
#[derive(Debug, Clone)]
pub struct RunLog {
    trials_discovered: u64,
    trials_analyzed: u64,
    segments_included: u64,
    segments_excluded: u64,
    fixations_detected: u64,
    tables_written: u64,
    tables_skipped: u64,
    started_at: DateTime<Utc>,
    exclusions: Vec<ExclusionRecord>,
    failures: Vec<TrialFailure>,
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            trials_discovered: 0,
            trials_analyzed: 0,
            segments_included: 0,
            segments_excluded: 0,
            fixations_detected: 0,
            tables_written: 0,
            tables_skipped: 0,
            started_at: Utc::now(),
            exclusions: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record_trials_discovered(&mut self, count: u64) {
        self.trials_discovered += count;
    }

    pub fn record_trial_analyzed(&mut self) {
        self.trials_analyzed += 1;
    }

    pub fn record_included(&mut self) {
        self.segments_included += 1;
    }

    pub fn record_excluded(&mut self, record: ExclusionRecord) {
        self.segments_excluded += 1;
        self.exclusions.push(record);
    }

    pub fn record_failure(&mut self, failure: TrialFailure) {
        self.failures.push(failure);
    }

    pub fn record_fixations(&mut self, count: u64) {
        self.fixations_detected += count;
    }

    pub fn record_table_written(&mut self) {
        self.tables_written += 1;
    }

    pub fn record_table_skipped(&mut self) {
        self.tables_skipped += 1;
    }

    pub fn exclusions(&self) -> &[ExclusionRecord] {
        &self.exclusions
    }

    pub fn failures(&self) -> &[TrialFailure] {
        &self.failures
    }

    /// Get the current statistics.
    pub fn stats(&self) -> RunStats {
        RunStats {
            trials_discovered: self.trials_discovered,
            trials_analyzed: self.trials_analyzed,
            trials_failed: self.failures.len() as u64,
            segments_included: self.segments_included,
            segments_excluded: self.segments_excluded,
            fixations_detected: self.fixations_detected,
            tables_written: self.tables_written,
            tables_skipped: self.tables_skipped,
            started_at: self.started_at,
            elapsed_ms: (Utc::now() - self.started_at).num_milliseconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        let mut out = format!(
            "Run Statistics:\n\
             - Trials discovered: {}\n\
             - Trials analysed: {}\n\
             - Trials skipped: {}\n\
             - Phase segments included: {}\n\
             - Phase segments excluded: {}\n\
             - Fixations detected: {}\n\
             - Tables written: {}\n\
             - Empty fixation tables skipped: {}",
            stats.trials_discovered,
            stats.trials_analyzed,
            stats.trials_failed,
            stats.segments_included,
            stats.segments_excluded,
            stats.fixations_detected,
            stats.tables_written,
            stats.tables_skipped,
        );

        if !self.exclusions.is_empty() {
            out.push_str("\n\nExcluded segments (inclusion criteria not matched):");
            for e in &self.exclusions {
                out.push_str(&format!(
                    "\n - Trial '{}' | Phase '{}' | {} samples | estimate {} < {}",
                    e.trial_id, e.phase, e.sample_count, e.estimate, e.threshold
                ));
            }
        }

        if !self.failures.is_empty() {
            out.push_str("\n\nSkipped trials:");
            for f in &self.failures {
                out.push_str(&format!(
                    "\n - {} ({}): {}",
                    f.trial_id.as_deref().unwrap_or("?"),
                    f.source.display(),
                    f.reason
                ));
            }
        }

        out
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub trials_discovered: u64,
    pub trials_analyzed: u64,
    pub trials_failed: u64,
    pub segments_included: u64,
    pub segments_excluded: u64,
    pub fixations_detected: u64,
    pub tables_written: u64,
    pub tables_skipped: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}
