//! Classifier families and the capability trait the model selector drives.

pub mod classical;
pub mod evaluation;
pub mod knn;
pub mod logistic;
pub mod svm;

pub use classical::ClassifierFamily;
pub use evaluation::{CrossValidationResult, StratifiedKFold, cross_validate};
pub use knn::{KNearestNeighbors, NeighborWeights};
pub use logistic::LogisticRegression;
pub use svm::LinearSvm;

use crate::error::MlError;
use ndarray::Array2;

/// Binary classifier over standardized feature rows, labels in `{0, 1}`.
pub trait Classifier {
    /// Fit on `x` (one row per sample) and `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<(), MlError>;

    /// Predicted label per row.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>, MlError>;

    /// Continuous score per row, larger meaning more likely malicious.
    fn decision_scores(&self, x: &Array2<f64>) -> Result<Vec<f64>, MlError>;

    /// Fraction of rows predicted correctly.
    fn score(&self, x: &Array2<f64>, y: &[usize]) -> Result<f64, MlError> {
        if y.is_empty() {
            return Err(MlError::invalid_input("cannot score zero samples"));
        }
        let predictions = self.predict(x)?;
        if predictions.len() != y.len() {
            return Err(MlError::invalid_input(format!(
                "{} predictions for {} labels",
                predictions.len(),
                y.len()
            )));
        }
        let correct = predictions.iter().zip(y).filter(|(p, t)| p == t).count();
        Ok(correct as f64 / y.len() as f64)
    }

    /// Mean accuracy under stratified `folds`-fold cross-validation.
    fn cross_validate_mean(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        folds: usize,
    ) -> Result<f64, MlError>
    where
        Self: Sized + Clone,
    {
        cross_validate(self, x, y, &StratifiedKFold::new(folds)).map(|r| r.mean_score)
    }
}

/// Shared input checks for `fit`.
pub(crate) fn check_fit_input(x: &Array2<f64>, y: &[usize]) -> Result<(), MlError> {
    if x.nrows() == 0 {
        return Err(MlError::invalid_input("cannot fit with zero samples"));
    }
    if x.nrows() != y.len() {
        return Err(MlError::invalid_input(format!(
            "{} feature rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    if y.iter().any(|&l| l > 1) {
        return Err(MlError::invalid_input("labels must be 0 or 1"));
    }
    Ok(())
}

/// Shared width check for `predict`.
pub(crate) fn check_width(expected: usize, x: &Array2<f64>) -> Result<(), MlError> {
    if x.ncols() != expected {
        return Err(MlError::invalid_input(format!(
            "model fitted on {expected} features, got {}",
            x.ncols()
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use ndarray::Array2;

    /// Two well separated Gaussian-ish blobs, `n` samples split evenly.
    pub fn blobs(n: usize) -> (Array2<f64>, Vec<usize>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            let class = (i % 2) as f64;
            let jitter = ((i * 7 + j * 13) % 10) as f64 / 10.0 - 0.45;
            class * 4.0 - 2.0 + jitter
        });
        let y = (0..n).map(|i| i % 2).collect();
        (x, y)
    }
}
