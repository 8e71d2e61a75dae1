use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

const TIME_COLUMN: &str = "time";

#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Trajectory '{path}' has no 'time' column as its first field")]
    MissingTimeColumn { path: String },
    #[error("Invalid value '{value}' in row {row}, column '{column}' of '{path}'")]
    InvalidValue {
        path: String,
        row: usize,
        column: String,
        value: String,
    },
    #[error("Row {row} of '{path}' has {found} fields, expected {expected}")]
    RaggedRow {
        path: String,
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Species time courses sampled on a shared time grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    species: Vec<String>,
    columns: HashMap<String, usize>,
    /// One row per time point, one value per species column.
    rows: Vec<Vec<f64>>,
}

impl Trajectory {
    pub fn new(species: Vec<String>, times: Vec<f64>, rows: Vec<Vec<f64>>) -> Self {
        let columns = species
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self {
            times,
            species,
            columns,
            rows,
        }
    }

    pub fn load(path: &Path) -> Result<Self, TrajectoryError> {
        let label = path.to_string_lossy().to_string();
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| TrajectoryError::Csv {
                path: label.clone(),
                source: e,
            })?;
        Self::from_csv_reader(reader, &label)
    }

    pub fn from_reader(reader: impl Read, label: &str) -> Result<Self, TrajectoryError> {
        Self::from_csv_reader(
            csv::ReaderBuilder::new().flexible(true).from_reader(reader),
            label,
        )
    }

    fn from_csv_reader<R: Read>(
        mut reader: csv::Reader<R>,
        label: &str,
    ) -> Result<Self, TrajectoryError> {
        let csv_error = |e| TrajectoryError::Csv {
            path: label.to_string(),
            source: e,
        };

        let headers = reader.headers().map_err(csv_error)?.clone();
        if headers.get(0).map(str::trim) != Some(TIME_COLUMN) {
            return Err(TrajectoryError::MissingTimeColumn {
                path: label.to_string(),
            });
        }
        let species: Vec<String> = headers
            .iter()
            .skip(1)
            .map(|h| h.trim().to_string())
            .collect();

        let mut times = Vec::new();
        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(csv_error)?;
            let row = index + 1;
            if record.len() != headers.len() {
                return Err(TrajectoryError::RaggedRow {
                    path: label.to_string(),
                    row,
                    found: record.len(),
                    expected: headers.len(),
                });
            }
            let mut values = Vec::with_capacity(record.len());
            for (field, column) in record.iter().zip(headers.iter()) {
                let value = field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| TrajectoryError::InvalidValue {
                        path: label.to_string(),
                        row,
                        column: column.to_string(),
                        value: field.to_string(),
                    })?;
                values.push(value);
            }
            times.push(values.remove(0));
            rows.push(values);
        }

        Ok(Self::new(species, times, rows))
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn column_index(&self, species_id: &str) -> Option<usize> {
        self.columns.get(species_id).copied()
    }

    pub fn final_value(&self, species_id: &str) -> Option<f64> {
        let column = self.column_index(species_id)?;
        self.rows.last().and_then(|row| row.get(column)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const FAST_BINDING: &str = "time,A,B,AB\n0,10,10,0\n5,4,4,6\n10,2.5,2.5,7.5\n";

    #[test]
    fn load_reads_time_grid_and_final_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fast.csv");
        File::create(&path)
            .unwrap()
            .write_all(FAST_BINDING.as_bytes())
            .unwrap();

        let trajectory = Trajectory::load(&path).unwrap();
        assert_eq!(trajectory.times(), &[0.0, 5.0, 10.0]);
        assert_eq!(trajectory.species(), &["A", "B", "AB"]);
        assert_eq!(trajectory.column_index("AB"), Some(2));
        assert_eq!(trajectory.final_value("AB"), Some(7.5));
        assert_eq!(trajectory.final_value("C"), None);
    }

    #[test]
    fn from_reader_requires_time_column_first() {
        let err = Trajectory::from_reader("A,time\n1,0\n".as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, TrajectoryError::MissingTimeColumn { .. }));
    }

    #[test]
    fn from_reader_reports_invalid_numbers_with_location() {
        let err = Trajectory::from_reader("time,A\n0,abc\n".as_bytes(), "inline").unwrap_err();
        match err {
            TrajectoryError::InvalidValue { row, column, .. } => {
                assert_eq!(row, 1);
                assert_eq!(column, "A");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn from_reader_rejects_ragged_rows() {
        let err = Trajectory::from_reader("time,A,B\n0,1\n".as_bytes(), "inline").unwrap_err();
        assert!(matches!(
            err,
            TrajectoryError::RaggedRow {
                found: 2,
                expected: 3,
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_a_csv_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Trajectory::load(&dir.path().join("absent.csv")),
            Err(TrajectoryError::Csv { .. })
        ));
    }
}
