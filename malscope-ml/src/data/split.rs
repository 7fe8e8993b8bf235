//! Train/test partitioning.

use crate::data::dataset::Dataset;
use crate::data::scaler::StandardScaler;
use crate::error::MlError;
use ndarray::{Array2, Axis};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use tracing::info;

/// Disjoint training and test partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train_x: Array2<f64>,
    pub train_y: Vec<usize>,
    pub test_x: Array2<f64>,
    pub test_y: Vec<usize>,
}

impl Split {
    pub fn new(
        train_x: Array2<f64>,
        train_y: Vec<usize>,
        test_x: Array2<f64>,
        test_y: Vec<usize>,
    ) -> Result<Self, MlError> {
        if train_x.nrows() != train_y.len() || test_x.nrows() != test_y.len() {
            return Err(MlError::invalid_input(
                "feature rows and label count differ",
            ));
        }
        if train_x.ncols() != test_x.ncols() {
            return Err(MlError::invalid_input(
                "train and test partitions have different widths",
            ));
        }
        Ok(Self {
            train_x,
            train_y,
            test_x,
            test_y,
        })
    }

    /// Fit a scaler on the training partition and apply it to both partitions.
    ///
    /// The test partition never contributes to the scaler statistics.
    pub fn standardize(&self) -> Result<(Split, StandardScaler), MlError> {
        let mut scaler = StandardScaler::new();
        let train_x = scaler.fit_transform(&self.train_x)?;
        let test_x = scaler.transform(&self.test_x)?;
        Ok((
            Split {
                train_x,
                train_y: self.train_y.clone(),
                test_x,
                test_y: self.test_y.clone(),
            },
            scaler,
        ))
    }

    /// Smallest per-class sample count in the training labels (0 when a class is absent).
    pub fn min_train_class_count(&self) -> usize {
        min_class_count(&self.train_y)
    }
}

/// Smallest count among classes 0 and 1.
pub fn min_class_count(labels: &[usize]) -> usize {
    let positives = labels.iter().filter(|&&l| l == 1).count();
    positives.min(labels.len() - positives)
}

/// Shuffle and partition `dataset`, holding out `ceil(test_size * n)` samples.
pub fn train_test_split(
    dataset: &Dataset,
    test_size: f64,
    seed: Option<u64>,
) -> Result<Split, MlError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(MlError::config(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }
    let n = dataset.n_samples();
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(MlError::config(format!(
            "test_size {test_size} leaves an empty partition for {n} samples"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    match seed {
        Some(seed) => {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            indices.shuffle(&mut rng);
        }
        None => {
            let mut rng = rand::thread_rng();
            indices.shuffle(&mut rng);
        }
    }

    let (test_idx, train_idx) = indices.split_at(n_test);
    let split = Split {
        train_x: dataset.features.select(Axis(0), train_idx),
        train_y: train_idx.iter().map(|&i| dataset.labels[i]).collect(),
        test_x: dataset.features.select(Axis(0), test_idx),
        test_y: test_idx.iter().map(|&i| dataset.labels[i]).collect(),
    };
    info!(
        train = split.train_y.len(),
        test = split.test_y.len(),
        seed = ?seed,
        "Split dataset"
    );
    Ok(split)
}
