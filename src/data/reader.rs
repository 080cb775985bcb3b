//! CSV ingestion of labelled tabular data.
use crate::data::dataset::{Dataset, Label};
use crate::error::ImbalanceError;
use csv::ReaderBuilder;
use nalgebra::{DMatrix, DVector};
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument};

/// Reads a headed CSV file into a dataset.
///
/// `label_column` must hold 0/1 values; every other column not listed in `drop_columns`
/// becomes a feature, in header order, and must hold finite numbers. Returns the dataset and
/// the feature names.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the label column is missing, a cell is not
/// numeric, or a label is not 0/1.
#[instrument(skip(path, drop_columns), fields(path = %path.as_ref().display()))]
pub fn read_csv<P: AsRef<Path>>(
    path: P,
    label_column: &str,
    drop_columns: &[String],
) -> Result<(Dataset<f64>, Vec<String>), ImbalanceError> {
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path.as_ref())?;
    read_records(reader, label_column, drop_columns)
}

/// Same as [`read_csv`] but from any byte source.
pub fn read_csv_from<R: Read>(
    source: R,
    label_column: &str,
    drop_columns: &[String],
) -> Result<(Dataset<f64>, Vec<String>), ImbalanceError> {
    let reader = ReaderBuilder::new().has_headers(true).from_reader(source);
    read_records(reader, label_column, drop_columns)
}

fn read_records<R: Read>(
    mut reader: csv::Reader<R>,
    label_column: &str,
    drop_columns: &[String],
) -> Result<(Dataset<f64>, Vec<String>), ImbalanceError> {
    let headers = reader.headers()?.clone();
    let label_index = headers
        .iter()
        .position(|h| h == label_column)
        .ok_or_else(|| ImbalanceError::MissingColumn {
            name: label_column.to_string(),
        })?;
    let feature_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|&(i, h)| i != label_index && !drop_columns.iter().any(|d| d == h))
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut features = Vec::new();
    let mut labels: Vec<Label> = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;

        for (column, name) in &feature_columns {
            let cell = record.get(*column).unwrap_or("").trim();
            let value = cell
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ImbalanceError::Parse {
                    row,
                    column: name.clone(),
                    value: cell.to_string(),
                })?;
            features.push(value);
        }

        let raw = record.get(label_index).unwrap_or("").trim();
        let label = match raw.parse::<f64>() {
            Ok(v) if v == 0.0 => 0,
            Ok(v) if v == 1.0 => 1,
            _ => {
                return Err(ImbalanceError::InvalidLabel {
                    row,
                    value: raw.to_string(),
                })
            }
        };
        labels.push(label);
    }

    debug!(
        rows = labels.len(),
        features = feature_columns.len(),
        "read csv dataset"
    );

    let x = DMatrix::from_row_slice(labels.len(), feature_columns.len(), &features);
    let names = feature_columns.into_iter().map(|(_, name)| name).collect();
    Ok((Dataset::new(x, DVector::from_vec(labels))?, names))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREDIT: &str = "\
Time,V1,V2,Amount,Class
0,-1.5,0.2,149.62,0
1,1.2,0.3,2.69,0
2,-0.4,\"1.1\",378.66,\"1\"
";

    #[test]
    fn test_read_csv_drops_and_keeps_columns() {
        let (dataset, names) =
            read_csv_from(CREDIT.as_bytes(), "Class", &["Time".to_string()]).unwrap();
        assert_eq!(names, vec!["V1", "V2", "Amount"]);
        assert_eq!(dataset.nrows(), 3);
        assert_eq!(dataset.ncols(), 3);
        assert_eq!(dataset.class_counts(), [2, 1]);
        assert_eq!(dataset.x()[(2, 1)], 1.1);
        assert_eq!(dataset.x()[(0, 2)], 149.62);
    }

    #[test]
    fn test_read_csv_missing_label_column() {
        let result = read_csv_from(CREDIT.as_bytes(), "Fraud", &[]);
        assert!(matches!(result, Err(ImbalanceError::MissingColumn { .. })));
    }

    #[test]
    fn test_read_csv_non_numeric_cell() {
        let data = "a,Class\nx,0\n";
        let result = read_csv_from(data.as_bytes(), "Class", &[]);
        assert!(matches!(result, Err(ImbalanceError::Parse { row: 0, .. })));
    }

    #[test]
    fn test_read_csv_rejects_non_finite_cells() {
        for cell in ["NaN", "inf", "-inf"] {
            let data = format!("a,b,Class\n1.0,2.0,0\n3.0,{cell},1\n");
            let result = read_csv_from(data.as_bytes(), "Class", &[]);
            assert!(matches!(
                result,
                Err(ImbalanceError::Parse { row: 1, ref column, .. }) if column == "b"
            ));
        }
    }

    #[test]
    fn test_read_csv_invalid_label() {
        let data = "a,Class\n1.0,0\n2.0,3\n";
        let result = read_csv_from(data.as_bytes(), "Class", &[]);
        assert!(matches!(result, Err(ImbalanceError::InvalidLabel { row: 1, .. })));
    }
}
