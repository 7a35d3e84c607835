//! Gaze Scratch Analysis CLI
//!
//! Batch analysis of gaze scratch paradigm recordings.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use gaze_scratch_analysis::{
    config::{Config, EmptyTablePolicy},
    core::{partition, segment_trial, AoiBounds, FixationDetector, Phase, Region},
    input::read_recording,
    pipeline, VERSION,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gaze-scratch")]
#[command(version = VERSION)]
#[command(about = "Fixation and looking-time analysis for gaze scratch recordings", long_about = None)]
struct Cli {
    /// Enable debug output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse every trial of one participant and condition
    Run {
        /// Participant identifier
        #[arg(long)]
        participant: Option<String>,

        /// Condition label (e.g. Rise or Drop)
        #[arg(long)]
        condition: Option<String>,

        /// Directory with one recording file per trial
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Directory for aggregate tables and the run summary
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Directory for per-trial fixation tables
        #[arg(long)]
        fixation_output: Option<PathBuf>,

        /// Area-of-interest layout
        #[arg(long, value_enum)]
        aoi: Option<AoiLayout>,

        /// Maximum dispersion in pixels
        #[arg(long)]
        max_dispersion: Option<f64>,

        /// Minimum fixation duration in seconds
        #[arg(long)]
        min_duration: Option<f64>,

        /// Write header-only tables for phases without fixations
        #[arg(long)]
        write_empty_tables: bool,
    },

    /// Print the fixations of one recording
    Fixations {
        /// Recording file
        file: PathBuf,

        /// Only this phase (baseline, contingent or disruption)
        #[arg(long)]
        phase: Option<Phase>,

        /// Only fixations inside this area (drop or rise)
        #[arg(long)]
        region: Option<Region>,
    },

    /// Show configuration
    Config {
        /// Write the default configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AoiLayout {
    /// Quadrants around the corner objects
    Corners,
    /// Whole screen split at its centre
    Quadrants,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            participant,
            condition,
            input,
            output,
            fixation_output,
            aoi,
            max_dispersion,
            min_duration,
            write_empty_tables,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(p) = participant {
                config.participant_id = p;
            }
            if let Some(c) = condition {
                config.condition = c;
            }
            if let Some(dir) = input {
                config.input_dir = dir;
            }
            if let Some(dir) = output {
                config.aggregate_dir = dir;
            }
            if let Some(dir) = fixation_output {
                config.fixation_dir = dir;
            }
            match aoi {
                Some(AoiLayout::Corners) => config.aoi = AoiBounds::corner_objects(),
                Some(AoiLayout::Quadrants) => {
                    config.aoi = AoiBounds::screen_quadrants(&config.screen)
                }
                None => {}
            }
            if let Some(d) = max_dispersion {
                config.detector.max_dispersion = d;
            }
            if let Some(d) = min_duration {
                config.detector.min_duration = d;
            }
            if write_empty_tables {
                config.empty_fixation_tables = EmptyTablePolicy::Write;
            }
            cmd_run(&config)
        }
        Commands::Fixations {
            file,
            phase,
            region,
        } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_fixations(&config, &file, phase, region)
        }
        Commands::Config { init } => cmd_config(cli.config.as_deref(), init),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(p) => Config::load_from(p)
            .with_context(|| format!("Failed to load configuration from {}", p.display()))?,
        None => Config::load()?,
    };
    Ok(config)
}

fn cmd_run(config: &Config) -> anyhow::Result<()> {
    println!("Gaze Scratch Analysis v{VERSION}");
    println!();
    println!("  Participant: {}", config.participant_id);
    println!("  Condition: {}", config.condition);
    println!("  Input: {}", config.input_dir.display());
    println!();

    let report = pipeline::run(config)?;

    println!("{}", report.log.summary());
    println!();
    println!("Phase statistics (included trials):");
    println!("{}", report.summary.describe());
    println!();
    println!("Aggregate tables:");
    for path in &report.aggregate_tables {
        println!("  {}", path.display());
    }
    println!(
        "Fixation tables: {} written to {}",
        report.fixation_tables.len(),
        config.fixation_dir.display()
    );
    println!("Summary: {}", report.summary_path.display());

    Ok(())
}

fn cmd_fixations(
    config: &Config,
    file: &Path,
    phase: Option<Phase>,
    region: Option<Region>,
) -> anyhow::Result<()> {
    let recording = read_recording(file)?;
    let segmented = segment_trial(&recording, &config.phases)
        .with_context(|| format!("Cannot segment trial '{}'", recording.trial_id))?;
    let detector = FixationDetector::new(config.detector, config.screen.height);

    info!(trial = %segmented.trial_id, rows = recording.row_count(), "Loaded recording");

    for segment in segmented.segments() {
        if phase.is_some_and(|p| p != segment.phase) {
            continue;
        }

        let inclusion = config.inclusion.evaluate(segment);
        let fixations = match region {
            Some(r) => detector.detect(partition(&segment.samples, &config.aoi).region(r)),
            None => detector.detect(&segment.samples),
        };

        println!(
            "Trial {} | {} | {} samples | {} | {} fixations",
            segmented.trial_id,
            segment.phase.title(),
            segment.len(),
            if inclusion.included {
                "included"
            } else {
                "excluded"
            },
            fixations.len()
        );
        println!(
            "  {:>10} {:>10} {:>10} {:>10} {:>10}",
            "Start", "End", "Duration", "X", "Y"
        );
        for f in &fixations {
            println!(
                "  {:>10.4} {:>10.4} {:>10.4} {:>10.2} {:>10.2}",
                f.start, f.end, f.duration, f.x, f.y
            );
        }
        println!();
    }

    Ok(())
}

fn cmd_config(path: Option<&Path>, init: bool) -> anyhow::Result<()> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::config_path);

    if init {
        match path {
            Some(p) => Config::default().save_to(p)?,
            None => Config::default().save()?,
        }
        println!("Wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    let config = load_config(path)?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {}", config_path.display());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
