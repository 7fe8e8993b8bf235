//! Cross-validation: stratified fold assignment and fold scoring.

use crate::algorithms::Classifier;
use crate::data::split::min_class_count;
use crate::error::MlError;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stratified k-fold splitter over binary labels.
///
/// Without shuffling the assignment is deterministic: each class's samples,
/// in index order, are cut into `n_folds` consecutive chunks with the
/// remainder spread over the first folds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratifiedKFold {
    pub n_folds: usize,
}

impl StratifiedKFold {
    pub fn new(n_folds: usize) -> Self {
        Self { n_folds }
    }

    /// Check that every class can populate every fold.
    pub fn validate(&self, y: &[usize]) -> Result<(), MlError> {
        if self.n_folds < 2 {
            return Err(MlError::config(format!(
                "fold count must be at least 2, got {}",
                self.n_folds
            )));
        }
        let smallest = min_class_count(y);
        if self.n_folds > smallest {
            return Err(MlError::config(format!(
                "fold count {} exceeds the {} sample(s) of the smallest class",
                self.n_folds, smallest
            )));
        }
        Ok(())
    }

    /// Generate `(train_indices, test_indices)` for each fold.
    pub fn split(&self, y: &[usize]) -> Result<Vec<(Vec<usize>, Vec<usize>)>, MlError> {
        self.validate(y)?;

        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_folds];
        for class in [0usize, 1] {
            let members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
            let base = members.len() / self.n_folds;
            let remainder = members.len() % self.n_folds;
            let mut start = 0;
            for (f, fold) in folds.iter_mut().enumerate() {
                let size = if f < remainder { base + 1 } else { base };
                fold.extend_from_slice(&members[start..start + size]);
                start += size;
            }
        }

        Ok((0..self.n_folds)
            .map(|i| {
                let mut test = folds[i].clone();
                test.sort_unstable();
                let mut train: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();
                train.sort_unstable();
                (train, test)
            })
            .collect())
    }
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Per-fold scores and their summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidationResult {
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
    pub metric_name: String,
}

impl CrossValidationResult {
    pub fn from_scores(scores: Vec<f64>, metric_name: &str) -> Self {
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;
        Self {
            fold_scores: scores,
            mean_score: mean,
            std_score: variance.sqrt(),
            metric_name: metric_name.to_string(),
        }
    }
}

/// Fit a fresh clone of `model` on each training fold and score accuracy on the held-out fold.
pub fn cross_validate<M>(
    model: &M,
    x: &Array2<f64>,
    y: &[usize],
    cv: &StratifiedKFold,
) -> Result<CrossValidationResult, MlError>
where
    M: Classifier + Clone,
{
    if x.nrows() != y.len() {
        return Err(MlError::invalid_input(format!(
            "{} feature rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }

    let mut scores = Vec::with_capacity(cv.n_folds);
    for (fold, (train_idx, test_idx)) in cv.split(y)?.into_iter().enumerate() {
        let x_train = x.select(Axis(0), &train_idx);
        let y_train: Vec<usize> = train_idx.iter().map(|&i| y[i]).collect();
        let x_test = x.select(Axis(0), &test_idx);
        let y_test: Vec<usize> = test_idx.iter().map(|&i| y[i]).collect();

        let mut fold_model = model.clone();
        fold_model
            .fit(&x_train, &y_train)
            .map_err(|e| MlError::config(format!("cross-validation fold {fold}: {e}")))?;
        let score = fold_model.score(&x_test, &y_test)?;
        debug!(fold, score, "Scored fold");
        scores.push(score);
    }

    Ok(CrossValidationResult::from_scores(scores, "accuracy"))
}
