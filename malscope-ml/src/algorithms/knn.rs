//! k-nearest-neighbors classifier.

use super::{Classifier, check_fit_input, check_width};
use crate::error::MlError;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// How neighbors vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborWeights {
    Uniform,
    /// Inverse-distance weighting; an exact match takes the whole vote.
    Distance,
}

/// Lazy learner: `fit` stores the training rows, `predict` votes among the
/// `k` closest under the Minkowski distance of order `p`.
#[derive(Debug, Clone)]
pub struct KNearestNeighbors {
    k: usize,
    p: u32,
    weights: NeighborWeights,
    x_train: Option<Array2<f64>>,
    y_train: Option<Vec<usize>>,
}

impl KNearestNeighbors {
    /// Uniform weights, Euclidean distance.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            p: 2,
            weights: NeighborWeights::Uniform,
            x_train: None,
            y_train: None,
        }
    }

    pub fn with_p(mut self, p: u32) -> Self {
        self.p = p;
        self
    }

    pub fn with_weights(mut self, weights: NeighborWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self.p {
            1 => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
            2 => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
            p => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).abs().powi(p as i32))
                .sum::<f64>()
                .powf(1.0 / p as f64),
        }
    }

    /// Weighted share of the positive class among each row's neighbors.
    fn positive_share(&self, x: &Array2<f64>) -> Result<Vec<f64>, MlError> {
        let (Some(x_train), Some(y_train)) = (self.x_train.as_ref(), self.y_train.as_ref()) else {
            return Err(MlError::model("k-NN model not fitted"));
        };
        check_width(x_train.ncols(), x)?;

        let mut shares = Vec::with_capacity(x.nrows());
        let mut distances: Vec<(f64, usize)> = Vec::with_capacity(y_train.len());
        for row in x.rows() {
            distances.clear();
            distances.extend(
                x_train
                    .rows()
                    .into_iter()
                    .zip(y_train)
                    .map(|(train_row, &label)| (self.distance(row, train_row), label)),
            );
            // Stable: equal distances keep training order.
            distances.sort_by(|a, b| a.0.total_cmp(&b.0));
            let nearest = &distances[..self.k];

            let share = match self.weights {
                NeighborWeights::Uniform => {
                    nearest.iter().filter(|(_, l)| *l == 1).count() as f64 / self.k as f64
                }
                NeighborWeights::Distance => {
                    let exact: Vec<_> = nearest.iter().filter(|(d, _)| *d == 0.0).collect();
                    if exact.is_empty() {
                        let total: f64 = nearest.iter().map(|(d, _)| 1.0 / d).sum();
                        let positive: f64 = nearest
                            .iter()
                            .filter(|(_, l)| *l == 1)
                            .map(|(d, _)| 1.0 / d)
                            .sum();
                        positive / total
                    } else {
                        exact.iter().filter(|(_, l)| *l == 1).count() as f64 / exact.len() as f64
                    }
                }
            };
            shares.push(share);
        }
        Ok(shares)
    }
}

impl Classifier for KNearestNeighbors {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<(), MlError> {
        check_fit_input(x, y)?;
        if self.k == 0 {
            return Err(MlError::invalid_input("k must be at least 1"));
        }
        if self.k > x.nrows() {
            return Err(MlError::invalid_input(format!(
                "k = {} exceeds the {} training samples",
                self.k,
                x.nrows()
            )));
        }
        if self.p == 0 {
            return Err(MlError::invalid_input("Minkowski order p must be at least 1"));
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.to_vec());
        Ok(())
    }

    /// Majority vote; an even split goes to the benign class.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>, MlError> {
        Ok(self
            .positive_share(x)?
            .into_iter()
            .map(|s| usize::from(s > 0.5))
            .collect())
    }

    fn decision_scores(&self, x: &Array2<f64>) -> Result<Vec<f64>, MlError> {
        self.positive_share(x)
    }
}
