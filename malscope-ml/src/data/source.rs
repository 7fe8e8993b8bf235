//! Delimited-text data source.

use crate::error::MlError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A batch of raw data rows, cells kept as trimmed strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

impl DataBatch {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            total_rows: 0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Position of a named column in the header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Information about a data source for run logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub source_type: String,
    pub location: String,
    pub accessed_at: chrono::DateTime<chrono::Utc>,
    pub row_count: Option<usize>,
}

/// CSV file data source.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub delimiter: char,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, delimiter: char) -> Self {
        Self {
            path: path.into(),
            delimiter,
        }
    }

    /// Load the file, optionally limiting the number of data rows.
    pub fn load(&self, limit: Option<usize>) -> Result<DataBatch, MlError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            MlError::config(format!("cannot read dataset {}: {e}", self.path.display()))
        })?;
        parse_delimited(&content, self.delimiter, limit)
    }

    pub fn source_info(&self, row_count: Option<usize>) -> DataSourceInfo {
        DataSourceInfo {
            source_type: "csv".to_string(),
            location: self.path.display().to_string(),
            accessed_at: chrono::Utc::now(),
            row_count,
        }
    }
}

/// Split one record, honoring `"..."` fields with `""` as an escaped quote.
fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' && field.trim().is_empty() {
            field.clear();
            in_quotes = true;
        } else if c == delimiter {
            fields.push(field.trim().to_string());
            field.clear();
        } else {
            field.push(c);
        }
    }
    fields.push(field.trim().to_string());
    fields
}

/// Parse delimited text with a header row.
pub fn parse_delimited(
    content: &str,
    delimiter: char,
    limit: Option<usize>,
) -> Result<DataBatch, MlError> {
    let mut lines = content.lines();

    let header = lines
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| MlError::dataset("Empty CSV file"))?;
    let columns = split_line(header, delimiter);

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(max) = limit {
            if rows.len() >= max {
                break;
            }
        }
        rows.push(split_line(line, delimiter));
    }

    let total_rows = rows.len();
    Ok(DataBatch {
        columns,
        rows,
        total_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_batch_empty() {
        let batch = DataBatch::empty();
        assert_eq!(batch.row_count(), 0);
        assert_eq!(batch.column_count(), 0);
    }

    #[test]
    fn test_parse_delimited_trims_and_skips_blank_lines() {
        let batch = parse_delimited("a, \"b\" ,c\n1,2,3\n\n4,5,6\n", ',', None).unwrap();
        assert_eq!(batch.columns, vec!["a", "b", "c"]);
        assert_eq!(batch.row_count(), 2);
        assert_eq!(batch.rows[1], vec!["4", "5", "6"]);
        assert_eq!(batch.column_index("c"), Some(2));
    }

    #[test]
    fn test_quoted_fields_keep_delimiters_and_escaped_quotes() {
        let batch = parse_delimited(
            "Name,Machine,Malware\n\"setup, v2.exe\",332,1\n\"say \"\"hi\"\".exe\",332,0\n",
            ',',
            None,
        )
        .unwrap();
        assert_eq!(batch.rows[0], vec!["setup, v2.exe", "332", "1"]);
        assert_eq!(batch.rows[1], vec!["say \"hi\".exe", "332", "0"]);
    }

    #[test]
    fn test_parse_delimited_limit_and_delimiter() {
        let batch = parse_delimited("x;y\n1;2\n3;4\n5;6\n", ';', Some(2)).unwrap();
        assert_eq!(batch.total_rows, 2);
        assert_eq!(batch.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(parse_delimited("", ',', None).unwrap_err().is_config());
        assert!(parse_delimited("\n\n", ',', None).unwrap_err().is_config());
    }

    #[test]
    fn test_csv_source_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "f1,f2\n1.5,2\n").unwrap();
        let source = CsvSource::new(&path, ',');
        let batch = source.load(None).unwrap();
        assert_eq!(batch.columns, vec!["f1", "f2"]);
        assert_eq!(source.source_info(Some(1)).source_type, "csv");
    }

    #[test]
    fn test_csv_source_missing_file_is_config_error() {
        let source = CsvSource::new("/nonexistent/dataset.csv", ',');
        assert!(source.load(None).unwrap_err().is_config());
    }
}
