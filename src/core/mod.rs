//! Core analysis for gaze scratch paradigm recordings.
//!
//! This module contains:
//! - Phase segmentation and cleaning of trial recordings
//! - Inclusion criteria for phase segments
//! - Area-of-interest partitioning
//! - Dispersion-threshold fixation detection
//! - Looking-time aggregation per trial and phase

pub mod aggregate;
pub mod aoi;
pub mod fixation;
pub mod inclusion;
pub mod phases;

// Re-export commonly used types
pub use aggregate::{summarize_phase, total_duration, PhaseSummary, RegionStats, TrialPhaseAggregate};
pub use aoi::{partition, AoiBounds, Region, RegionPartition, ScreenGeometry};
pub use fixation::{detect_fixations, flip_vertical, DetectorParams, Fixation, FixationDetector};
pub use inclusion::{InclusionCriteria, InclusionOutcome};
pub use phases::{segment_trial, Phase, PhaseSegment, PhaseTiming, SegmentError, SegmentedTrial};
