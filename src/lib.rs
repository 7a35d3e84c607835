//! Gaze Scratch Analysis - offline analysis of gaze scratch paradigm
//! eye-tracking recordings.
//!
//! Each trial of the paradigm is recorded as one file of timestamped gaze
//! samples. A trial is cut into a baseline, a contingent and a disruption
//! phase, and looking time towards the "drop" and "rise" corners of the
//! screen is measured from the fixations detected in each phase.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Gaze Scratch Analysis                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────┐   ┌────────────┐             │
//! │  │   Input   │──▶│   Phases   │──▶│ Inclusion  │             │
//! │  │  (CSV)    │   │ (segment)  │   │  (filter)  │             │
//! │  └───────────┘   └────────────┘   └────────────┘             │
//! │                                          │                   │
//! │                                          ▼                   │
//! │  ┌───────────┐   ┌────────────┐   ┌────────────┐             │
//! │  │  Export   │◀──│ Aggregate  │◀──│ AOI + Fix. │             │
//! │  │  (CSV)    │   │   (DLS)    │   │ detection  │             │
//! │  └───────────┘   └────────────┘   └────────────┘             │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  ┌───────────┐                                               │
//! │  │  Report   │  run log + summary JSON                       │
//! │  └───────────┘                                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gaze_scratch_analysis::{pipeline, Config};
//!
//! let mut config = Config::default();
//! config.participant_id = "ID_52b".to_string();
//! config.input_dir = "recordings/ID_52b".into();
//!
//! let report = pipeline::run(&config)?;
//! println!("{}", report.log.summary());
//! # Ok::<(), pipeline::PipelineError>(())
//! ```

pub mod config;
pub mod core;
pub mod export;
pub mod input;
pub mod pipeline;
pub mod report;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, EmptyTablePolicy};
pub use core::{
    detect_fixations, segment_trial, AoiBounds, DetectorParams, Fixation, FixationDetector,
    InclusionCriteria, Phase, PhaseTiming, Region, TrialPhaseAggregate,
};
pub use input::{read_recording, GazeSample, TrialRecording};
pub use pipeline::{analyze_trial, run, PipelineError, RunReport, TrialAnalysis};
pub use report::{RunLog, RunSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
