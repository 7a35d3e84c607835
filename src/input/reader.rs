//! Reading per-trial gaze recordings from delimited files.

use crate::input::types::{trial_id_from_path, RawSample, TrialRecording};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Column holding seconds since trial start.
pub const TIME_COLUMN: &str = "time";
/// Column holding the horizontal screen coordinate.
pub const X_COLUMN: &str = "gaze_point_x";
/// Column holding the vertical screen coordinate.
pub const Y_COLUMN: &str = "gaze_point_y";

/// Errors that can occur while reading recordings.
#[derive(Debug)]
pub enum InputError {
    Io { path: PathBuf, source: std::io::Error },
    Csv(csv::Error),
    MissingColumns { found: usize },
    /// Two of the time, x and y roles resolved to the same column.
    AmbiguousColumns { time: usize, x: usize, y: usize },
    InvalidTrialName(PathBuf),
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::Io { path, source } => write!(f, "IO error on {}: {source}", path.display()),
            InputError::Csv(e) => write!(f, "CSV error: {e}"),
            InputError::MissingColumns { found } => write!(
                f,
                "expected time, x and y columns, header has only {found} column(s)"
            ),
            InputError::AmbiguousColumns { time, x, y } => write!(
                f,
                "time, x and y columns must differ, resolved to {time}, {x} and {y}"
            ),
            InputError::InvalidTrialName(path) => {
                write!(f, "cannot derive a trial id from {}", path.display())
            }
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::Io { source, .. } => Some(source),
            InputError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for InputError {
    fn from(e: csv::Error) -> Self {
        InputError::Csv(e)
    }
}

/// Positions of the time and coordinate columns in a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub time: usize,
    pub x: usize,
    pub y: usize,
}

impl ColumnMap {
    /// Resolve columns by name, falling back to positions 0, 1 and 2.
    ///
    /// Fails when two roles end up on the same column.
    pub fn from_headers(headers: &csv::StringRecord) -> Result<Self, InputError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let map = Self {
            time: find(TIME_COLUMN).unwrap_or(0),
            x: find(X_COLUMN).unwrap_or(1),
            y: find(Y_COLUMN).unwrap_or(2),
        };

        if map.time == map.x || map.time == map.y || map.x == map.y {
            return Err(InputError::AmbiguousColumns {
                time: map.time,
                x: map.x,
                y: map.y,
            });
        }

        let needed = map.time.max(map.x).max(map.y) + 1;
        if headers.len() < needed {
            return Err(InputError::MissingColumns {
                found: headers.len(),
            });
        }
        Ok(map)
    }
}

/// Parse a numeric field. Empty, unparseable and non-finite values are missing.
fn parse_field(record: &csv::StringRecord, index: usize) -> Option<f64> {
    let value = record.get(index)?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read raw rows from any reader. The first line must be a header.
pub fn read_samples<R: Read>(reader: R) -> Result<Vec<RawSample>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(csv_reader.headers()?)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(RawSample::new(
            parse_field(&record, columns.time),
            parse_field(&record, columns.x),
            parse_field(&record, columns.y),
        ));
    }
    Ok(rows)
}

/// Read one trial recording from disk.
pub fn read_recording(path: &Path) -> Result<TrialRecording, InputError> {
    let trial_id =
        trial_id_from_path(path).ok_or_else(|| InputError::InvalidTrialName(path.to_path_buf()))?;

    let file = std::fs::File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = read_samples(file)?;

    Ok(TrialRecording::new(trial_id, path.to_path_buf(), rows))
}

/// List recording files in a directory, sorted by file name.
pub fn discover_trials(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let entries = std::fs::read_dir(dir).map_err(|source| InputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|e| e.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_named_columns() {
        let data = "gaze_point_y,time,gaze_point_x\n10,0.5,20\n11,0.6,21\n";
        let rows = read_samples(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RawSample::complete(0.5, 20.0, 10.0));
        assert_eq!(rows[1], RawSample::complete(0.6, 21.0, 11.0));
    }

    #[test]
    fn test_read_positional_fallback() {
        let data = "t,a,b\n1.0,2.0,3.0\n";
        let rows = read_samples(data.as_bytes()).unwrap();
        assert_eq!(rows[0], RawSample::complete(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_missing_and_malformed_fields() {
        let data = "time,gaze_point_x,gaze_point_y\n\
                    0.1,,5\n\
                    0.2,nan,5\n\
                    0.3,abc,5\n\
                    0.4,1\n\
                    0.5,1,2\n";
        let rows = read_samples(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].x, None);
        assert_eq!(rows[1].x, None);
        assert_eq!(rows[2].x, None);
        assert_eq!(rows[3].y, None);
        assert!(rows[4].to_sample().is_some());
    }

    #[test]
    fn test_fallback_cannot_reuse_named_column() {
        // `time` is found at index 1, where x would fall back to.
        let data = "idx,time,gaze_point_y\n0,5.0,300\n";
        assert!(matches!(
            read_samples(data.as_bytes()),
            Err(InputError::AmbiguousColumns { time: 1, x: 1, y: 2 })
        ));

        // A partial match that leaves distinct positions is accepted.
        let data = "time,a,gaze_point_y\n5.0,20,300\n";
        let rows = read_samples(data.as_bytes()).unwrap();
        assert_eq!(rows[0], RawSample::complete(5.0, 20.0, 300.0));
    }

    #[test]
    fn test_too_few_columns() {
        let data = "time,x\n1,2\n";
        assert!(matches!(
            read_samples(data.as_bytes()),
            Err(InputError::MissingColumns { found: 2 })
        ));
    }

    #[test]
    fn test_discover_trials_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_rec.csv", "a_rec.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "time,gaze_point_x,gaze_point_y\n").unwrap();
        }

        let files = discover_trials(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a_rec.csv", "b_rec.csv"]);
    }

    #[test]
    fn test_read_recording_trial_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("7_ID52b_img.csv");
        std::fs::write(&path, "time,gaze_point_x,gaze_point_y\n0.1,1,2\n").unwrap();

        let rec = read_recording(&path).unwrap();
        assert_eq!(rec.trial_id, "7");
        assert_eq!(rec.row_count(), 1);
    }
}
