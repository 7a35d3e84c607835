//! End-to-end analysis of one participant and condition.
//!
//! Each trial is processed independently: segmentation, inclusion,
//! fixation detection per area and aggregation. A trial that cannot be
//! read or segmented is recorded as a failure and the run continues.
//! Output tables are written once every trial has been processed.

use crate::config::{Config, ConfigError, EmptyTablePolicy};
use crate::core::aggregate::{summarize_phase, PhaseSummary, TrialPhaseAggregate};
use crate::core::aoi::{partition, Region};
use crate::core::fixation::{Fixation, FixationDetector};
use crate::core::inclusion::InclusionOutcome;
use crate::core::phases::{segment_trial, Phase, PhaseSegment, SegmentError};
use crate::export::tables::{
    aggregate_table_name, fixation_table_name, write_aggregate_table, write_fixation_table,
    ExportError,
};
use crate::input::reader::{discover_trials, read_recording, InputError};
use crate::input::types::{trial_id_from_path, TrialRecording};
use crate::report::log::{ExclusionRecord, RunLog, TrialFailure};
use crate::report::summary::{summary_file_name, RunSummary, SummaryBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Errors that abort a run.
#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigError),
    Input(InputError),
    Export(ExportError),
    Io { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Config(e) => write!(f, "{e}"),
            PipelineError::Input(e) => write!(f, "{e}"),
            PipelineError::Export(e) => write!(f, "{e}"),
            PipelineError::Io { path, source } => {
                write!(f, "IO error on {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Config(e) => Some(e),
            PipelineError::Input(e) => Some(e),
            PipelineError::Export(e) => Some(e),
            PipelineError::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        PipelineError::Config(e)
    }
}

impl From<InputError> for PipelineError {
    fn from(e: InputError) -> Self {
        PipelineError::Input(e)
    }
}

impl From<ExportError> for PipelineError {
    fn from(e: ExportError) -> Self {
        PipelineError::Export(e)
    }
}

/// Result of analysing one phase of one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseAnalysis {
    pub phase: Phase,
    pub inclusion: InclusionOutcome,
    /// Fixations over the whole phase
    pub fixations: Vec<Fixation>,
    pub drop_fixations: Vec<Fixation>,
    pub rise_fixations: Vec<Fixation>,
    /// Present only for included segments
    pub aggregate: Option<TrialPhaseAggregate>,
}

impl PhaseAnalysis {
    fn excluded(inclusion: InclusionOutcome) -> Self {
        Self {
            phase: inclusion.phase,
            inclusion,
            fixations: Vec::new(),
            drop_fixations: Vec::new(),
            rise_fixations: Vec::new(),
            aggregate: None,
        }
    }

    pub fn is_included(&self) -> bool {
        self.inclusion.included
    }

    pub fn region_fixations(&self, region: Region) -> &[Fixation] {
        match region {
            Region::Drop => &self.drop_fixations,
            Region::Rise => &self.rise_fixations,
        }
    }
}

/// Result of analysing one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialAnalysis {
    pub trial_id: String,
    pub source: PathBuf,
    /// One entry per phase, in phase order
    pub phases: Vec<PhaseAnalysis>,
}

impl TrialAnalysis {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseAnalysis> {
        self.phases.iter().find(|p| p.phase == phase)
    }
}

/// Segment a recording and analyse every phase.
pub fn analyze_trial(
    recording: &TrialRecording,
    config: &Config,
) -> Result<TrialAnalysis, SegmentError> {
    let segmented = segment_trial(recording, &config.phases)?;
    let detector = FixationDetector::new(config.detector, config.screen.height);

    let phases = segmented
        .segments()
        .into_iter()
        .map(|segment| analyze_phase(&segmented.trial_id, segment, &detector, config))
        .collect();

    Ok(TrialAnalysis {
        trial_id: segmented.trial_id.clone(),
        source: recording.source.clone(),
        phases,
    })
}

fn analyze_phase(
    trial_id: &str,
    segment: &PhaseSegment,
    detector: &FixationDetector,
    config: &Config,
) -> PhaseAnalysis {
    let inclusion = config.inclusion.evaluate(segment);
    if inclusion.is_excluded() {
        return PhaseAnalysis::excluded(inclusion);
    }

    // Areas are defined in recorded screen coordinates; the detector flips.
    let regions = partition(&segment.samples, &config.aoi);
    let fixations = detector.detect(&segment.samples);
    let drop_fixations = detector.detect(regions.region(Region::Drop));
    let rise_fixations = detector.detect(regions.region(Region::Rise));

    debug!(
        trial = trial_id,
        phase = %segment.phase,
        samples = segment.len(),
        dropped_rows = segment.dropped_rows,
        fixations = fixations.len(),
        drop = drop_fixations.len(),
        rise = rise_fixations.len(),
        "Detected fixations"
    );

    let aggregate = TrialPhaseAggregate::from_fixations(
        trial_id,
        &config.condition,
        &rise_fixations,
        &drop_fixations,
    );

    PhaseAnalysis {
        phase: segment.phase,
        inclusion,
        fixations,
        drop_fixations,
        rise_fixations,
        aggregate: Some(aggregate),
    }
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub analyses: Vec<TrialAnalysis>,
    pub phase_summaries: Vec<PhaseSummary>,
    pub aggregate_tables: Vec<PathBuf>,
    pub fixation_tables: Vec<PathBuf>,
    pub summary_path: PathBuf,
    pub summary: RunSummary,
    pub log: RunLog,
}

impl RunReport {
    pub fn trial(&self, trial_id: &str) -> Option<&TrialAnalysis> {
        self.analyses.iter().find(|a| a.trial_id == trial_id)
    }
}

/// Run the full analysis described by `config`.
pub fn run(config: &Config) -> Result<RunReport, PipelineError> {
    config.validate()?;
    config.ensure_directories()?;

    let mut log = RunLog::new();
    let files = discover_trials(&config.input_dir)?;
    log.record_trials_discovered(files.len() as u64);
    info!(
        input = %config.input_dir.display(),
        trials = files.len(),
        "Starting analysis"
    );

    let analyses = analyze_files(&files, config, &mut log);

    let mut aggregate_tables = Vec::new();
    let mut phase_summaries = Vec::new();
    for phase in Phase::ALL {
        let rows: Vec<TrialPhaseAggregate> = analyses
            .iter()
            .filter_map(|a| a.phase(phase).and_then(|p| p.aggregate.clone()))
            .collect();

        let summary = summarize_phase(phase, &rows);
        info!(
            phase = %phase,
            trials = summary.rise.trials,
            rise_sum = summary.rise.sum,
            rise_mean = summary.rise.mean,
            rise_std = summary.rise.std_dev,
            drop_sum = summary.drop.sum,
            drop_mean = summary.drop.mean,
            drop_std = summary.drop.std_dev,
            "Phase summary"
        );
        phase_summaries.push(summary);

        let path = config.aggregate_dir.join(aggregate_table_name(
            &config.participant_id,
            &config.condition,
            phase,
        ));
        write_aggregate_table(&path, &rows)?;
        log.record_table_written();
        aggregate_tables.push(path);
    }

    let fixation_tables = write_fixation_tables(&analyses, config, &mut log)?;

    let summary = SummaryBuilder::new().build(
        &config.participant_id,
        &config.condition,
        phase_summaries.clone(),
        &log,
    );
    let summary_path = config
        .aggregate_dir
        .join(summary_file_name(&config.participant_id, &config.condition));
    write_summary(&summary_path, &summary)?;

    info!(
        analysed = log.stats().trials_analyzed,
        failed = log.failures().len(),
        excluded = log.exclusions().len(),
        "Analysis complete"
    );

    Ok(RunReport {
        analyses,
        phase_summaries,
        aggregate_tables,
        fixation_tables,
        summary_path,
        summary,
        log,
    })
}

fn analyze_files(files: &[PathBuf], config: &Config, log: &mut RunLog) -> Vec<TrialAnalysis> {
    let mut seen = HashSet::new();
    let mut analyses = Vec::new();

    for path in files {
        let trial_id = trial_id_from_path(path);

        if let Some(id) = &trial_id {
            if !seen.insert(id.clone()) {
                record_failure(log, trial_id.clone(), path, "duplicate trial id".to_string());
                continue;
            }
        }

        let recording = match read_recording(path) {
            Ok(recording) => recording,
            Err(e) => {
                record_failure(log, trial_id, path, e.to_string());
                continue;
            }
        };

        match analyze_trial(&recording, config) {
            Ok(analysis) => {
                for phase in &analysis.phases {
                    if phase.is_included() {
                        log.record_included();
                        log.record_fixations(phase.fixations.len() as u64);
                    } else {
                        let outcome = &phase.inclusion;
                        warn!(
                            trial = %analysis.trial_id,
                            phase = %outcome.phase,
                            estimate = outcome.estimate,
                            threshold = outcome.threshold,
                            "Inclusion criteria not matched"
                        );
                        log.record_excluded(ExclusionRecord {
                            trial_id: analysis.trial_id.clone(),
                            phase: outcome.phase,
                            sample_count: outcome.sample_count,
                            estimate: outcome.estimate,
                            threshold: outcome.threshold,
                        });
                    }
                }
                info!(
                    trial = %analysis.trial_id,
                    rows = recording.row_count(),
                    "Analysed trial"
                );
                log.record_trial_analyzed();
                analyses.push(analysis);
            }
            Err(e) => record_failure(log, trial_id, path, e.to_string()),
        }
    }

    analyses
}

fn record_failure(log: &mut RunLog, trial_id: Option<String>, path: &Path, reason: String) {
    warn!(path = %path.display(), reason = %reason, "Skipping trial");
    log.record_failure(TrialFailure {
        trial_id,
        source: path.to_path_buf(),
        reason,
    });
}

fn write_fixation_tables(
    analyses: &[TrialAnalysis],
    config: &Config,
    log: &mut RunLog,
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut written = Vec::new();

    for analysis in analyses {
        for phase in analysis.phases.iter().filter(|p| p.is_included()) {
            if phase.fixations.is_empty()
                && config.empty_fixation_tables == EmptyTablePolicy::Skip
            {
                debug!(trial = %analysis.trial_id, phase = %phase.phase, "No fixations, table skipped");
                log.record_table_skipped();
                continue;
            }

            let path = config.fixation_dir.join(fixation_table_name(
                phase.phase,
                &config.participant_id,
                &config.condition,
                &analysis.trial_id,
            ));
            write_fixation_table(&path, &analysis.trial_id, &phase.fixations)?;
            log.record_table_written();
            written.push(path);
        }
    }

    Ok(written)
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), PipelineError> {
    let io_err = |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| io_err(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    std::fs::write(path, json).map_err(io_err)
}
