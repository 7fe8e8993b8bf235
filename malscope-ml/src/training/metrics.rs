//! Held-out classification metrics.

use crate::error::MlError;
use crate::eval::curves::{roc_auc, roc_curve};
use serde::{Deserialize, Serialize};

/// 2x2 confusion matrix, rows = actual class, columns = predicted class.
///
/// `counts[1][1]` is true positives (malicious flagged as malicious).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[usize], predicted: &[usize]) -> Result<Self, MlError> {
        if actual.len() != predicted.len() {
            return Err(MlError::evaluation(format!(
                "{} labels but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }
        let mut counts = [[0usize; 2]; 2];
        for (&a, &p) in actual.iter().zip(predicted) {
            if a > 1 || p > 1 {
                return Err(MlError::evaluation("labels must be 0 or 1"));
            }
            counts[a][p] += 1;
        }
        Ok(Self { counts })
    }

    pub fn true_negatives(&self) -> usize {
        self.counts[0][0]
    }

    pub fn false_positives(&self) -> usize {
        self.counts[0][1]
    }

    pub fn false_negatives(&self) -> usize {
        self.counts[1][0]
    }

    pub fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives() + self.true_negatives(), self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives(),
            self.true_positives() + self.false_positives(),
        )
    }

    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives(),
            self.true_positives() + self.false_negatives(),
        )
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Each row divided by its total; an empty row stays zero.
    pub fn normalized(&self) -> [[f64; 2]; 2] {
        let mut out = [[0.0; 2]; 2];
        for (row_out, row) in out.iter_mut().zip(&self.counts) {
            let total: usize = row.iter().sum();
            for (cell_out, &cell) in row_out.iter_mut().zip(row) {
                *cell_out = ratio(cell, total);
            }
        }
        out
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Classification metrics on the test partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion_matrix: ConfusionMatrix,
    /// `None` when the test labels contain a single class.
    pub auc_roc: Option<f64>,
}

impl ClassificationMetrics {
    pub fn from_predictions(
        actual: &[usize],
        predicted: &[usize],
        scores: &[f64],
    ) -> Result<Self, MlError> {
        let confusion_matrix = ConfusionMatrix::from_predictions(actual, predicted)?;
        let auc_roc = if actual.contains(&0) && actual.contains(&1) {
            Some(roc_auc(&roc_curve(actual, scores)?))
        } else {
            None
        };
        Ok(Self {
            accuracy: confusion_matrix.accuracy(),
            precision: confusion_matrix.precision(),
            recall: confusion_matrix.recall(),
            f1_score: confusion_matrix.f1(),
            confusion_matrix,
            auc_roc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix_counts() {
        let actual = [1, 1, 1, 0, 0, 0, 0];
        let predicted = [1, 1, 0, 0, 0, 1, 0];
        let cm = ConfusionMatrix::from_predictions(&actual, &predicted).unwrap();
        assert_eq!(cm.true_positives(), 2);
        assert_eq!(cm.false_negatives(), 1);
        assert_eq!(cm.false_positives(), 1);
        assert_eq!(cm.true_negatives(), 3);
        assert_eq!(cm.total(), 7);
        assert!((cm.accuracy() - 5.0 / 7.0).abs() < 1e-12);
        assert!((cm.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.recall() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.f1() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_rows_sum_to_one() {
        let cm = ConfusionMatrix {
            counts: [[3, 1], [0, 0]],
        };
        let norm = cm.normalized();
        assert_eq!(norm[0], [0.75, 0.25]);
        assert_eq!(norm[1], [0.0, 0.0]);
    }

    #[test]
    fn test_degenerate_metrics_are_zero() {
        let cm = ConfusionMatrix::from_predictions(&[0, 0], &[0, 0]).unwrap();
        assert_eq!(cm.precision(), 0.0);
        assert_eq!(cm.recall(), 0.0);
        assert_eq!(cm.f1(), 0.0);
        assert_eq!(cm.accuracy(), 1.0);
    }

    #[test]
    fn test_mismatched_lengths() {
        assert!(ConfusionMatrix::from_predictions(&[0, 1], &[0]).is_err());
        assert!(ConfusionMatrix::from_predictions(&[2], &[0]).is_err());
    }

    #[test]
    fn test_classification_metrics() {
        let actual = [0, 0, 1, 1];
        let predicted = [0, 1, 1, 1];
        let scores = [0.1, 0.6, 0.7, 0.9];
        let m = ClassificationMetrics::from_predictions(&actual, &predicted, &scores).unwrap();
        assert_eq!(m.accuracy, 0.75);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.auc_roc, Some(1.0));

        let single = ClassificationMetrics::from_predictions(&[1, 1], &[1, 0], &[0.9, 0.2]).unwrap();
        assert!(single.auc_roc.is_none());
    }
}
