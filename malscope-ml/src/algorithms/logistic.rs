//! L2-regularized logistic regression fitted by batch gradient descent.

use super::{Classifier, check_fit_input, check_width};
use crate::error::MlError;
use ndarray::{Array1, Array2};

/// Binary logistic regression with inverse regularization strength `C`.
///
/// Minimizes mean log-loss plus `||w||^2 / (2 n C)`; the intercept is not
/// penalized.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    c: f64,
    learning_rate: f64,
    max_iter: usize,
    tol: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl LogisticRegression {
    pub fn new(c: f64) -> Self {
        Self {
            c,
            learning_rate: 0.1,
            max_iter: 200,
            tol: 1e-4,
            coefficients: None,
            intercept: 0.0,
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

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Probability of the malicious class per row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>, MlError> {
        let coef = self
            .coefficients
            .as_ref()
            .ok_or_else(|| MlError::model("logistic regression not fitted"))?;
        check_width(coef.len(), x)?;
        Ok((x.dot(coef) + self.intercept).mapv(sigmoid).to_vec())
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> Result<(), MlError> {
        check_fit_input(x, y)?;
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(MlError::invalid_input(format!(
                "C must be positive and finite, got {}",
                self.c
            )));
        }

        let n = x.nrows() as f64;
        let targets: Array1<f64> = y.iter().map(|&l| l as f64).collect();
        let mut coef = Array1::<f64>::zeros(x.ncols());
        let mut intercept = 0.0;

        for _ in 0..self.max_iter {
            let probas = (x.dot(&coef) + intercept).mapv(sigmoid);
            let errors = &probas - &targets;

            let grad_coef = x.t().dot(&errors) / n + &coef / (n * self.c);
            let grad_intercept = errors.sum() / n;

            coef.scaled_add(-self.learning_rate, &grad_coef);
            intercept -= self.learning_rate * grad_intercept;

            let max_grad = grad_coef
                .iter()
                .fold(grad_intercept.abs(), |acc, g| acc.max(g.abs()));
            if max_grad < self.tol {
                break;
            }
        }

        if coef.iter().any(|v| !v.is_finite()) || !intercept.is_finite() {
            return Err(MlError::training("logistic regression weights diverged"));
        }
        self.coefficients = Some(coef);
        self.intercept = intercept;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>, MlError> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| usize::from(p >= 0.5))
            .collect())
    }

    fn decision_scores(&self, x: &Array2<f64>) -> Result<Vec<f64>, MlError> {
        self.predict_proba(x)
    }
}
