//! CSV tables written for downstream statistics.
//!
//! Two kinds of table are produced per participant and condition:
//! - `DUR_<ID>_<Condition>_<Phase>.csv` with one aggregate row per trial;
//! - `<phase>_fixation_<ID>_<Condition>_<Trial>.csv` with one row per fixation.
//!
//! Column names and order are fixed; `NaN` is written literally.

use crate::core::aggregate::TrialPhaseAggregate;
use crate::core::fixation::Fixation;
use crate::core::phases::Phase;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Aggregate table columns.
pub const AGGREGATE_COLUMNS: [&str; 6] = [
    "Trial",
    "Duration_Rise",
    "Duration_Drop",
    "Duration_Sum",
    "DLS",
    "Condition",
];

/// Fixation table columns.
pub const FIXATION_COLUMNS: [&str; 6] = ["Start", "End", "Duration", "X", "Y", "Trial"];

/// Export errors.
#[derive(Debug)]
pub enum ExportError {
    Io { path: PathBuf, source: std::io::Error },
    Csv { path: PathBuf, source: csv::Error },
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io { path, source } => {
                write!(f, "IO error on {}: {source}", path.display())
            }
            ExportError::Csv { path, source } => {
                write!(f, "CSV error on {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io { source, .. } => Some(source),
            ExportError::Csv { source, .. } => Some(source),
        }
    }
}

/// One row of an aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    #[serde(rename = "Trial")]
    pub trial: String,
    #[serde(rename = "Duration_Rise")]
    pub duration_rise: f64,
    #[serde(rename = "Duration_Drop")]
    pub duration_drop: f64,
    #[serde(rename = "Duration_Sum")]
    pub duration_sum: f64,
    #[serde(rename = "DLS")]
    pub dls: f64,
    #[serde(rename = "Condition")]
    pub condition: String,
}

impl From<&TrialPhaseAggregate> for AggregateRow {
    fn from(a: &TrialPhaseAggregate) -> Self {
        Self {
            trial: a.trial_id.clone(),
            duration_rise: a.duration_rise,
            duration_drop: a.duration_drop,
            duration_sum: a.duration_sum,
            dls: a.dls,
            condition: a.condition.clone(),
        }
    }
}

/// One row of a fixation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixationRow {
    #[serde(rename = "Start")]
    pub start: f64,
    #[serde(rename = "End")]
    pub end: f64,
    #[serde(rename = "Duration")]
    pub duration: f64,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Trial")]
    pub trial: String,
}

impl FixationRow {
    pub fn new(fixation: &Fixation, trial_id: &str) -> Self {
        Self {
            start: fixation.start,
            end: fixation.end,
            duration: fixation.duration,
            x: fixation.x,
            y: fixation.y,
            trial: trial_id.to_string(),
        }
    }

    pub fn to_fixation(&self) -> Fixation {
        Fixation {
            start: self.start,
            end: self.end,
            duration: self.duration,
            x: self.x,
            y: self.y,
        }
    }
}

/// File name of a phase aggregate table.
pub fn aggregate_table_name(participant_id: &str, condition: &str, phase: Phase) -> String {
    format!("DUR_{participant_id}_{condition}_{}.csv", phase.title())
}

/// File name of a trial's fixation table for one phase.
pub fn fixation_table_name(
    phase: Phase,
    participant_id: &str,
    condition: &str,
    trial_id: &str,
) -> String {
    format!(
        "{}_fixation_{participant_id}_{condition}_{trial_id}.csv",
        phase.name()
    )
}

fn write_table<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<(), ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Header is written explicitly so an empty table still has one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(header).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_table<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(csv_err)
}

/// Write a phase aggregate table, one row per trial.
pub fn write_aggregate_table(
    path: &Path,
    rows: &[TrialPhaseAggregate],
) -> Result<(), ExportError> {
    let rows: Vec<AggregateRow> = rows.iter().map(AggregateRow::from).collect();
    write_table(path, &AGGREGATE_COLUMNS, &rows)
}

/// Write a fixation table for one trial.
pub fn write_fixation_table(
    path: &Path,
    trial_id: &str,
    fixations: &[Fixation],
) -> Result<(), ExportError> {
    let rows: Vec<FixationRow> = fixations
        .iter()
        .map(|f| FixationRow::new(f, trial_id))
        .collect();
    write_table(path, &FIXATION_COLUMNS, &rows)
}

pub fn read_aggregate_table(path: &Path) -> Result<Vec<AggregateRow>, ExportError> {
    read_table(path)
}

pub fn read_fixation_table(path: &Path) -> Result<Vec<FixationRow>, ExportError> {
    read_table(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(
            aggregate_table_name("ID_52b", "Rise", Phase::Disruption),
            "DUR_ID_52b_Rise_Disruption.csv"
        );
        assert_eq!(
            fixation_table_name(Phase::Baseline, "ID_52b", "Rise", "12"),
            "baseline_fixation_ID_52b_Rise_12.csv"
        );
    }

    #[test]
    fn test_fixation_table_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fix.csv");
        let fixations = vec![
            Fixation {
                start: 4.008333333333334,
                end: 4.675,
                duration: 4.675 - 4.008333333333334,
                x: 1000.25,
                y: 923.5,
            },
            Fixation {
                start: 5.1,
                end: 5.6,
                duration: 0.5,
                x: 100.0,
                y: 924.0,
            },
        ];

        write_fixation_table(&path, "7", &fixations).unwrap();
        let rows = read_fixation_table(&path).unwrap();

        assert_eq!(rows.len(), 2);
        for (row, fixation) in rows.iter().zip(&fixations) {
            assert_eq!(row.to_fixation(), *fixation);
            assert_eq!(row.trial, "7");
        }
    }

    #[test]
    fn test_fixation_table_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_fixation_table(&path, "1", &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), "Start,End,Duration,X,Y,Trial");
    }

    #[test]
    fn test_aggregate_table_keeps_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("DUR.csv");
        let rows = vec![
            TrialPhaseAggregate::from_durations("1", "Rise", 1.5, 0.5),
            TrialPhaseAggregate::from_durations("2", "Rise", 0.0, 0.0),
        ];

        write_aggregate_table(&path, &rows).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Trial,Duration_Rise,Duration_Drop,Duration_Sum,DLS,Condition"));
        assert!(content.contains("NaN"));

        let back = read_aggregate_table(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].dls, 0.5);
        assert!(back[1].dls.is_nan());
        assert_eq!(back[1].condition, "Rise");
    }
}
