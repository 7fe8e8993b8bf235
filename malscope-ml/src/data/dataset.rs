//! Labeled feature matrix built from a raw batch.

use crate::config::DatasetConfig;
use crate::data::schema::{ColumnRole, DatasetSchema};
use crate::data::source::{CsvSource, DataBatch};
use crate::error::MlError;
use ndarray::Array2;
use tracing::{debug, info};

/// Feature matrix (rows are samples) with binary labels, 1 = malicious.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Array2<f64>,
    pub labels: Vec<usize>,
    pub feature_names: Vec<String>,
}

impl Dataset {
    /// Load and validate the dataset described by `config`.
    pub fn load(config: &DatasetConfig) -> Result<Self, MlError> {
        let source = CsvSource::new(&config.path, config.delimiter);
        let batch = source.load(None)?;
        let info = source.source_info(Some(batch.row_count()));
        debug!(location = %info.location, rows = ?info.row_count, accessed_at = %info.accessed_at, "Read data source");
        let schema = DatasetSchema::from_config(config);
        let dataset = Self::from_batch(&batch, &schema)?;
        info!(
            path = %config.path.display(),
            samples = dataset.n_samples(),
            features = dataset.n_features(),
            malicious = dataset.class_count(1),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    pub fn from_batch(batch: &DataBatch, schema: &DatasetSchema) -> Result<Self, MlError> {
        schema.validate(&batch.columns)?;

        let feature_idx: Vec<usize> = batch
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| schema.role(name) == ColumnRole::Feature)
            .map(|(i, _)| i)
            .collect();
        let label_idx = batch
            .column_index(&schema.label_column)
            .ok_or_else(|| MlError::config(format!("missing label column {}", schema.label_column)))?;

        if feature_idx.is_empty() {
            return Err(MlError::config("dataset has no feature columns"));
        }
        if batch.rows.is_empty() {
            return Err(MlError::config("dataset has no rows"));
        }

        let n_cols = batch.column_count();
        let mut values = Vec::with_capacity(batch.row_count() * feature_idx.len());
        let mut labels = Vec::with_capacity(batch.row_count());

        for (r, row) in batch.rows.iter().enumerate() {
            // Header is line 1.
            let line = r + 2;
            if row.len() != n_cols {
                return Err(MlError::dataset(format!(
                    "line {line}: expected {n_cols} fields, found {}",
                    row.len()
                )));
            }
            for &c in &feature_idx {
                let value = row[c].parse::<f64>().map_err(|_| {
                    MlError::dataset(format!(
                        "line {line}: column {} is not numeric: {:?}",
                        batch.columns[c], row[c]
                    ))
                })?;
                values.push(value);
            }
            labels.push(parse_label(&row[label_idx]).ok_or_else(|| {
                MlError::dataset(format!(
                    "line {line}: label {:?} is not 0 or 1",
                    row[label_idx]
                ))
            })?);
        }

        let features = Array2::from_shape_vec((labels.len(), feature_idx.len()), values)
            .map_err(|e| MlError::dataset(format!("feature matrix shape: {e}")))?;
        let feature_names = feature_idx.iter().map(|&c| batch.columns[c].clone()).collect();

        Ok(Self {
            features,
            labels,
            feature_names,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn class_count(&self, class: usize) -> usize {
        self.labels.iter().filter(|&&l| l == class).count()
    }
}

fn parse_label(cell: &str) -> Option<usize> {
    match cell {
        "0" => Some(0),
        "1" => Some(1),
        other => match other.parse::<f64>() {
            Ok(v) if v == 0.0 => Some(0),
            Ok(v) if v == 1.0 => Some(1),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::parse_delimited;

    const SAMPLE: &str = "\
Name,e_magic,TimeDateStamp,SizeOfCode,CheckSum,Machine,Malware
a.exe,23117,1000,512,0,332,1
b.exe,23117,2000,1024,7,332,0
c.exe,23117,3000,2048.5,0,34404,1
";

    #[test]
    fn test_from_batch_drops_excluded_columns() {
        let batch = parse_delimited(SAMPLE, ',', None).unwrap();
        let ds = Dataset::from_batch(&batch, &DatasetSchema::malware()).unwrap();
        assert_eq!(ds.feature_names, vec!["e_magic", "SizeOfCode"]);
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.labels, vec![1, 0, 1]);
        assert_eq!(ds.features[[2, 1]], 2048.5);
        assert_eq!(ds.class_count(1), 2);
    }

    #[test]
    fn test_missing_label_column_is_config_error() {
        let batch = parse_delimited("Name,TimeDateStamp,CheckSum,Machine,x\na,1,2,3,4\n", ',', None)
            .unwrap();
        let err = Dataset::from_batch(&batch, &DatasetSchema::malware()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_non_numeric_feature_is_dataset_error() {
        let batch = parse_delimited(
            "Name,TimeDateStamp,CheckSum,Machine,Malware,f\na,1,2,3,1,oops\n",
            ',',
            None,
        )
        .unwrap();
        let err = Dataset::from_batch(&batch, &DatasetSchema::malware()).unwrap_err();
        assert!(matches!(err, MlError::Dataset(_)));
        assert!(err.is_config());
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_ragged_row_is_dataset_error() {
        let batch = parse_delimited(
            "Name,TimeDateStamp,CheckSum,Machine,Malware,f\na,1,2,3,1\n",
            ',',
            None,
        )
        .unwrap();
        let err = Dataset::from_batch(&batch, &DatasetSchema::malware()).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("expected 6 fields, found 5"));
    }

    #[test]
    fn test_quoted_name_with_delimiter() {
        let batch = parse_delimited(
            "Name,TimeDateStamp,CheckSum,Machine,Malware,f\n\"setup, v2.exe\",1,2,3,1,0.5\n",
            ',',
            None,
        )
        .unwrap();
        let ds = Dataset::from_batch(&batch, &DatasetSchema::malware()).unwrap();
        assert_eq!(ds.labels, vec![1]);
        assert_eq!(ds.features[[0, 0]], 0.5);
    }

    #[test]
    fn test_bad_label_is_rejected() {
        let batch = parse_delimited(
            "Name,TimeDateStamp,CheckSum,Machine,Malware,f\na,1,2,3,2,0.5\n",
            ',',
            None,
        )
        .unwrap();
        assert!(
            Dataset::from_batch(&batch, &DatasetSchema::malware())
                .unwrap_err()
                .is_config()
        );
    }

    #[test]
    fn test_no_feature_columns() {
        let batch =
            parse_delimited("Name,TimeDateStamp,CheckSum,Machine,Malware\na,1,2,3,1\n", ',', None)
                .unwrap();
        assert!(
            Dataset::from_batch(&batch, &DatasetSchema::malware())
                .unwrap_err()
                .is_config()
        );
    }

    #[test]
    fn test_parse_label_variants() {
        assert_eq!(parse_label("1"), Some(1));
        assert_eq!(parse_label("0.0"), Some(0));
        assert_eq!(parse_label("yes"), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset_malwares.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = DatasetConfig {
            path,
            ..Default::default()
        };
        let ds = Dataset::load(&config).unwrap();
        assert_eq!(ds.n_samples(), 3);
    }
}
