//! Column roles for the malware dataset.

use crate::config::DatasetConfig;
use crate::error::MlError;
use serde::{Deserialize, Serialize};

/// Role a header column plays when building the feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Feature,
    Label,
    Excluded,
}

/// Which columns are the label, which are dropped, and which are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub label_column: String,
    pub excluded_columns: Vec<String>,
}

impl DatasetSchema {
    /// Schema of the PE-header malware dataset: `Malware` label, identifier
    /// and metadata columns excluded.
    pub fn malware() -> Self {
        Self::from_config(&DatasetConfig::default())
    }

    pub fn from_config(config: &DatasetConfig) -> Self {
        Self {
            label_column: config.label_column.clone(),
            excluded_columns: config.excluded_columns.clone(),
        }
    }

    /// Columns that must be present in the header.
    pub fn required_columns(&self) -> Vec<&str> {
        self.excluded_columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.label_column.as_str()))
            .collect()
    }

    pub fn role(&self, column: &str) -> ColumnRole {
        if column == self.label_column {
            ColumnRole::Label
        } else if self.excluded_columns.iter().any(|c| c == column) {
            ColumnRole::Excluded
        } else {
            ColumnRole::Feature
        }
    }

    /// Fail with a configuration error listing every missing required column.
    pub fn validate(&self, columns: &[String]) -> Result<(), MlError> {
        let missing: Vec<&str> = self
            .required_columns()
            .into_iter()
            .filter(|req| !columns.iter().any(|c| c == req))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MlError::config(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )))
        }
    }
}
