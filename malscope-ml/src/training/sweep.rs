//! One-dimensional hyperparameter sweep with cross-validated model selection.
//!
//! `ModelSelector::select` walks `Sweep -> Select -> Retrain -> Measure`:
//! every candidate value is scored by stratified k-fold cross-validation on
//! the training partition, the first value reaching the maximum mean score
//! wins, and a fresh model built from it is fitted on the whole training
//! partition and scored on the test partition under a wall clock.

use crate::algorithms::Classifier;
use crate::data::Split;
use crate::data::split::min_class_count;
use crate::error::MlError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default cross-validation fold count.
pub const DEFAULT_FOLD_COUNT: usize = 5;

/// Mean cross-validation score of one candidate value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry<H> {
    pub value: H,
    pub mean_score: f64,
}

/// Candidate scores in sweep order; values are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord<H> {
    pub entries: Vec<SweepEntry<H>>,
}

impl<H: Copy> SweepRecord<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, value: H, mean_score: f64) {
        self.entries.push(SweepEntry { value, mean_score });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry reaching the maximum mean score. NaN scores never win.
    pub fn optimal(&self) -> Option<SweepEntry<H>> {
        best_index(self.entries.iter().map(|e| e.mean_score)).map(|i| self.entries[i])
    }
}

impl<H: Copy> Default for SweepRecord<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the first maximum among `scores`, skipping NaN.
pub fn best_index(scores: impl IntoIterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, score) in scores.into_iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Outcome of a sweep: the retrained model and its measurements.
#[derive(Debug, Clone)]
pub struct TrainedModel<M, H> {
    pub model: M,
    pub optimal: H,
    pub sweep: SweepRecord<H>,
    /// Wall clock of fitting on the full training partition.
    pub training_latency: Duration,
    /// Wall clock of scoring the test partition.
    pub inference_latency: Duration,
    /// Held-out accuracy in percent, 0..=100.
    pub accuracy: f64,
}

impl<M, H> TrainedModel<M, H> {
    pub fn training_ms(&self) -> f64 {
        self.training_latency.as_secs_f64() * 1000.0
    }

    pub fn inference_ms(&self) -> f64 {
        self.inference_latency.as_secs_f64() * 1000.0
    }
}

/// Cross-validated selector over a single hyperparameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelSelector {
    pub fold_count: usize,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::new(DEFAULT_FOLD_COUNT)
    }
}

impl ModelSelector {
    pub fn new(fold_count: usize) -> Self {
        Self { fold_count }
    }

    /// Run the sweep on a prepared split.
    pub fn select<M, H, F>(
        &self,
        split: &Split,
        builder: F,
        values: &[H],
    ) -> Result<TrainedModel<M, H>, MlError>
    where
        M: Classifier + Clone,
        H: Copy + PartialEq + Debug + Display,
        F: Fn(H) -> M,
    {
        self.select_arrays(
            &split.train_x,
            &split.train_y,
            &split.test_x,
            &split.test_y,
            builder,
            values,
        )
    }

    /// Run the sweep on explicit train/test arrays.
    pub fn select_arrays<M, H, F>(
        &self,
        train_x: &Array2<f64>,
        train_y: &[usize],
        test_x: &Array2<f64>,
        test_y: &[usize],
        builder: F,
        values: &[H],
    ) -> Result<TrainedModel<M, H>, MlError>
    where
        M: Classifier + Clone,
        H: Copy + PartialEq + Debug + Display,
        F: Fn(H) -> M,
    {
        self.validate(train_y, test_y, values)?;

        let sweep = self.sweep(train_x, train_y, &builder, values)?;
        let best = sweep.optimal().ok_or_else(|| {
            MlError::training("no candidate produced a finite cross-validation score")
        })?;
        info!(optimal = %best.value, mean_score = best.mean_score, "Selected optimal hyperparameter");

        let mut model = builder(best.value);

        let started = Instant::now();
        model.fit(train_x, train_y)?;
        let training_latency = started.elapsed();

        let started = Instant::now();
        let fraction = model.score(test_x, test_y)?;
        let inference_latency = started.elapsed();

        let accuracy = fraction * 100.0;
        info!(
            optimal = %best.value,
            accuracy,
            training_ms = training_latency.as_secs_f64() * 1000.0,
            inference_ms = inference_latency.as_secs_f64() * 1000.0,
            "Retrained and scored optimal model"
        );

        Ok(TrainedModel {
            model,
            optimal: best.value,
            sweep,
            training_latency,
            inference_latency,
            accuracy,
        })
    }

    fn validate<H>(&self, train_y: &[usize], test_y: &[usize], values: &[H]) -> Result<(), MlError>
    where
        H: PartialEq + Debug,
    {
        if values.is_empty() {
            return Err(MlError::config("hyperparameter sweep has no candidate values"));
        }
        for (i, v) in values.iter().enumerate() {
            if values[..i].contains(v) {
                return Err(MlError::config(format!(
                    "hyperparameter value {v:?} appears more than once"
                )));
            }
        }
        if self.fold_count < 2 {
            return Err(MlError::config(format!(
                "fold count must be at least 2, got {}",
                self.fold_count
            )));
        }
        let smallest = min_class_count(train_y);
        if self.fold_count > smallest {
            return Err(MlError::config(format!(
                "fold count {} exceeds the {} training sample(s) of the smallest class",
                self.fold_count, smallest
            )));
        }
        if test_y.is_empty() {
            return Err(MlError::config("test partition is empty"));
        }
        Ok(())
    }

    fn sweep<M, H, F>(
        &self,
        train_x: &Array2<f64>,
        train_y: &[usize],
        builder: &F,
        values: &[H],
    ) -> Result<SweepRecord<H>, MlError>
    where
        M: Classifier + Clone,
        H: Copy + Display,
        F: Fn(H) -> M,
    {
        let mut record = SweepRecord::new();
        for &value in values {
            let mean = builder(value).cross_validate_mean(train_x, train_y, self.fold_count)?;
            debug!(value = %value, mean_score = mean, folds = self.fold_count, "Cross-validated candidate");
            record.record(value, mean);
        }
        Ok(record)
    }
}
