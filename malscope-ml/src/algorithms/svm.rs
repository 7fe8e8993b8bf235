//! Linear support-vector machine trained by subgradient descent on the hinge loss.

use super::{Classifier, check_fit_input, check_width};
use crate::error::MlError;
use ndarray::{Array1, Array2};

/// Soft-margin linear SVM.
///
/// Minimizes `(1 / (2 n C)) ||w||^2 + (1/n) sum max(0, 1 - y (w.x + b))` with
/// labels mapped to `{-1, +1}`. Larger `C` means weaker regularization.
#[derive(Debug, Clone)]
pub struct LinearSvm {
    c: f64,
    learning_rate: f64,
    max_iter: usize,
    tol: f64,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl LinearSvm {
    pub fn new(c: f64) -> Self {
        Self {
            c,
            learning_rate: 0.1,
            max_iter: 200,
            tol: 1e-4,
            weights: None,
            bias: 0.0,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

impl Classifier for LinearSvm {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<(), MlError> {
        check_fit_input(x, y)?;
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(MlError::invalid_input(format!(
                "C must be positive and finite, got {}",
                self.c
            )));
        }

        let n = x.nrows() as f64;
        let signed: Vec<f64> = y.iter().map(|&l| if l == 1 { 1.0 } else { -1.0 }).collect();
        let lambda = 1.0 / (n * self.c);

        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;

        for epoch in 0..self.max_iter {
            let eta = self.learning_rate / (1.0 + epoch as f64 * 0.01);
            let margins = x.dot(&w) + b;

            let mut grad_w = &w * lambda;
            let mut grad_b = 0.0;
            for (i, (&m, &yi)) in margins.iter().zip(&signed).enumerate() {
                if yi * m < 1.0 {
                    grad_w.scaled_add(-yi / n, &x.row(i));
                    grad_b -= yi / n;
                }
            }

            w.scaled_add(-eta, &grad_w);
            b -= eta * grad_b;

            let step = eta * (grad_w.dot(&grad_w) + grad_b * grad_b).sqrt();
            if step < self.tol {
                break;
            }
        }

        if w.iter().any(|v| !v.is_finite()) || !b.is_finite() {
            return Err(MlError::training("SVM weights diverged"));
        }
        self.weights = Some(w);
        self.bias = b;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>, MlError> {
        Ok(self
            .decision_scores(x)?
            .into_iter()
            .map(|d| usize::from(d >= 0.0))
            .collect())
    }

    /// Signed distance-like margin `w.x + b`.
    fn decision_scores(&self, x: &Array2<f64>) -> Result<Vec<f64>, MlError> {
        let w = self
            .weights
            .as_ref()
            .ok_or_else(|| MlError::model("SVM not fitted"))?;
        check_width(w.len(), x)?;
        Ok((x.dot(w) + self.bias).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::test_support::blobs;
    use ndarray::array;

    #[test]
    fn test_svm_separable() {
        let (x, y) = blobs(60);
        let mut svm = LinearSvm::new(1.0);
        svm.fit(&x, &y).unwrap();
        assert_eq!(svm.score(&x, &y).unwrap(), 1.0);
        let w = svm.weights().unwrap();
        assert!(w[0] > 0.0 && w[1] > 0.0);
    }

    #[test]
    fn test_svm_scores_sign_matches_prediction() {
        let (x, y) = blobs(20);
        let mut svm = LinearSvm::new(10.0).with_max_iter(500);
        svm.fit(&x, &y).unwrap();
        let scores = svm.decision_scores(&x).unwrap();
        let preds = svm.predict(&x).unwrap();
        for (s, p) in scores.iter().zip(&preds) {
            assert_eq!(usize::from(*s >= 0.0), *p);
        }
    }

    #[test]
    fn test_svm_rejects_invalid_c() {
        let x = array![[0.0], [1.0]];
        assert!(LinearSvm::new(0.0).fit(&x, &[0, 1]).is_err());
        assert!(LinearSvm::new(f64::NAN).fit(&x, &[0, 1]).is_err());
    }

    #[test]
    fn test_svm_unfitted() {
        assert!(LinearSvm::new(1.0).predict(&array![[1.0]]).is_err());
    }
}
