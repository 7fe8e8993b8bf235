//! Z-score feature standardization.

use crate::error::MlError;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Per-feature standardization with statistics from a reference set.
///
/// Uses population variance. Features with zero variance keep a scale of 1 so
/// they map to 0 instead of NaN.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Vec<f64>>,
    scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    pub fn mean(&self) -> Option<&[f64]> {
        self.mean.as_deref()
    }

    pub fn scale(&self) -> Option<&[f64]> {
        self.scale.as_deref()
    }

    pub fn fit(&mut self, x: &Array2<f64>) -> Result<(), MlError> {
        if x.nrows() == 0 {
            return Err(MlError::invalid_input("cannot fit scaler on zero samples"));
        }
        let mean: Array1<f64> = x
            .mean_axis(Axis(0))
            .ok_or_else(|| MlError::invalid_input("cannot fit scaler on zero samples"))?;
        let std = x.std_axis(Axis(0), 0.0);
        let scale = std
            .iter()
            .map(|&s| if s > f64::EPSILON { s } else { 1.0 })
            .collect();
        self.mean = Some(mean.to_vec());
        self.scale = Some(scale);
        Ok(())
    }

    fn fitted(&self, n_features: usize) -> Result<(&[f64], &[f64]), MlError> {
        let (Some(mean), Some(scale)) = (self.mean.as_deref(), self.scale.as_deref()) else {
            return Err(MlError::model("scaler not fitted"));
        };
        if mean.len() != n_features {
            return Err(MlError::invalid_input(format!(
                "scaler fitted on {} features, got {n_features}",
                mean.len()
            )));
        }
        Ok((mean, scale))
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, MlError> {
        let (mean, scale) = self.fitted(x.ncols())?;
        let mut out = x.clone();
        for mut row in out.rows_mut() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (*v - mean[j]) / scale[j];
            }
        }
        Ok(out)
    }

    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, MlError> {
        let (mean, scale) = self.fitted(x.ncols())?;
        let mut out = x.clone();
        for mut row in out.rows_mut() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = *v * scale[j] + mean[j];
            }
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>, MlError> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform_zero_mean_unit_variance() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(&x).unwrap();
        for col in z.columns() {
            let mean = col.sum() / col.len() as f64;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / col.len() as f64;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
        assert_eq!(scaler.mean().unwrap(), &[2.5, 25.0]);
    }

    #[test]
    fn test_inverse_transform_roundtrip() {
        let x = array![[0.5, -3.0, 7.0], [1.5, 4.0, 7.0], [9.0, 0.25, 7.0]];
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(&x).unwrap();
        let back = scaler.inverse_transform(&z).unwrap();
        for (a, b) in x.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_feature_maps_to_zero() {
        let x = array![[5.0], [5.0], [5.0]];
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(&x).unwrap();
        assert!(z.iter().all(|&v| v == 0.0));
        assert_eq!(scaler.scale().unwrap(), &[1.0]);
    }

    #[test]
    fn test_transform_uses_fitted_statistics_only() {
        let train = array![[0.0], [2.0]];
        let test = array![[100.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&train).unwrap();
        let z = scaler.transform(&test).unwrap();
        // mean 1, std 1
        assert_eq!(z[[0, 0]], 99.0);
    }

    #[test]
    fn test_unfitted_and_mismatched() {
        let scaler = StandardScaler::new();
        assert!(!scaler.is_fitted());
        assert!(scaler.transform(&array![[1.0]]).is_err());

        let mut scaler = StandardScaler::new();
        scaler.fit(&array![[1.0, 2.0]]).unwrap();
        assert!(scaler.transform(&array![[1.0]]).is_err());
        assert!(scaler.fit(&Array2::zeros((0, 2))).is_err());
    }
}
