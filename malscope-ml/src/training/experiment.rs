//! End-to-end experiment: dataset, split, one model selection per family.

use crate::algorithms::{
    Classifier, ClassifierFamily, KNearestNeighbors, LinearSvm, LogisticRegression,
};
use crate::config::MlConfig;
use crate::data::{Dataset, Split, StandardScaler, train_test_split};
use crate::error::MlError;
use crate::eval::curves::{Curve, precision_recall_curve, roc_curve};
use crate::training::metrics::ClassificationMetrics;
use crate::training::sweep::{ModelSelector, SweepEntry, TrainedModel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tracing::{info, warn};

/// Run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    /// Finished with at least one isolated family failure.
    Partial,
    Failed,
}

/// Everything reported for one classifier family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyReport {
    pub family: ClassifierFamily,
    /// Optimal hyperparameter as displayed.
    pub optimal: String,
    pub sweep: Vec<SweepEntry<String>>,
    pub training_latency: Duration,
    pub inference_latency: Duration,
    /// Held-out accuracy in percent.
    pub accuracy: f64,
    pub metrics: ClassificationMetrics,
    /// `None` when the test partition holds a single class.
    pub roc: Option<Curve>,
    pub precision_recall: Option<Curve>,
}

impl FamilyReport {
    pub fn from_trained<M, H>(
        family: ClassifierFamily,
        trained: &TrainedModel<M, H>,
        test_x: &ndarray::Array2<f64>,
        test_y: &[usize],
    ) -> Result<Self, MlError>
    where
        M: Classifier,
        H: Copy + Display,
    {
        let predicted = trained.model.predict(test_x)?;
        let scores = trained.model.decision_scores(test_x)?;
        let metrics = ClassificationMetrics::from_predictions(test_y, &predicted, &scores)?;
        let both_classes = test_y.contains(&0) && test_y.contains(&1);
        let roc = if both_classes {
            Some(roc_curve(test_y, &scores)?)
        } else {
            None
        };
        let precision_recall = if test_y.contains(&1) {
            Some(precision_recall_curve(test_y, &scores)?)
        } else {
            None
        };
        Ok(Self {
            family,
            optimal: trained.optimal.to_string(),
            sweep: trained
                .sweep
                .entries
                .iter()
                .map(|e| SweepEntry {
                    value: e.value.to_string(),
                    mean_score: e.mean_score,
                })
                .collect(),
            training_latency: trained.training_latency,
            inference_latency: trained.inference_latency,
            accuracy: trained.accuracy,
            metrics,
            roc,
            precision_recall,
        })
    }

    pub fn training_ms(&self) -> f64 {
        self.training_latency.as_secs_f64() * 1000.0
    }

    pub fn inference_ms(&self) -> f64 {
        self.inference_latency.as_secs_f64() * 1000.0
    }
}

/// A family that failed under isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyFailure {
    pub family: ClassifierFamily,
    pub error: String,
}

/// Record of one experiment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentRun {
    pub id: String,
    pub status: RunStatus,
    pub reports: Vec<FamilyReport>,
    pub failures: Vec<FamilyFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExperimentRun {
    fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            status: RunStatus::Pending,
            reports: Vec::new(),
            failures: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn report(&self, family: ClassifierFamily) -> Option<&FamilyReport> {
        self.reports.iter().find(|r| r.family == family)
    }
}

/// Sequences the configured families over one prepared split.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: MlConfig,
}

impl Experiment {
    pub fn new(config: MlConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MlConfig {
        &self.config
    }

    /// Load the dataset, split it and standardize both partitions on the
    /// training statistics.
    pub fn prepare(&self) -> Result<(Split, StandardScaler), MlError> {
        let ds = &self.config.dataset;
        let dataset = Dataset::load(ds)?;
        let split = train_test_split(&dataset, ds.test_size, ds.seed)?;
        split.standardize()
    }

    /// Prepare the data and run every family.
    pub fn run(&self, on_report: impl FnMut(&FamilyReport)) -> Result<ExperimentRun, MlError> {
        self.config.validate()?;
        let (split, _) = self.prepare()?;
        self.run_on_split(&split, on_report)
    }

    /// Run every configured family on `split`, handing each finished report to
    /// `on_report` before the next family starts.
    pub fn run_on_split(
        &self,
        split: &Split,
        mut on_report: impl FnMut(&FamilyReport),
    ) -> Result<ExperimentRun, MlError> {
        let mut run = ExperimentRun::new();
        run.status = RunStatus::Running;
        info!(run_id = %run.id, families = self.config.experiment.families.len(), "Starting experiment");

        for &family in &self.config.experiment.families {
            match self.run_family(family, split) {
                Ok(report) => {
                    on_report(&report);
                    run.reports.push(report);
                }
                Err(e) if self.config.experiment.isolate_families => {
                    warn!(family = %family, error = %e, "Family failed, continuing");
                    run.failures.push(FamilyFailure {
                        family,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!(run_id = %run.id, family = %family, error = %e, "Aborting experiment");
                    return Err(e);
                }
            }
        }

        run.status = if run.failures.is_empty() {
            RunStatus::Completed
        } else if run.reports.is_empty() {
            RunStatus::Failed
        } else {
            RunStatus::Partial
        };
        run.finished_at = Some(Utc::now());
        info!(run_id = %run.id, status = ?run.status, "Experiment finished");
        Ok(run)
    }

    /// Sweep, retrain and measure one family.
    pub fn run_family(
        &self,
        family: ClassifierFamily,
        split: &Split,
    ) -> Result<FamilyReport, MlError> {
        let sel = &self.config.selection;
        let selector = ModelSelector::new(sel.fold_count);
        info!(family = %family, "Selecting hyperparameter");
        match family {
            ClassifierFamily::Knn => {
                let trained = selector.select(split, KNearestNeighbors::new, &sel.knn_neighbors)?;
                FamilyReport::from_trained(family, &trained, &split.test_x, &split.test_y)
            }
            ClassifierFamily::Svm => {
                let build = |c: f64| {
                    LinearSvm::new(c)
                        .with_learning_rate(sel.learning_rate)
                        .with_max_iter(sel.max_iter)
                        .with_tolerance(sel.tolerance)
                };
                let trained = selector.select(split, build, &sel.svm_c)?;
                FamilyReport::from_trained(family, &trained, &split.test_x, &split.test_y)
            }
            ClassifierFamily::LogisticRegression => {
                let build = |c: f64| {
                    LogisticRegression::new(c)
                        .with_learning_rate(sel.learning_rate)
                        .with_max_iter(sel.max_iter)
                        .with_tolerance(sel.tolerance)
                };
                let trained = selector.select(split, build, &sel.logreg_c)?;
                FamilyReport::from_trained(family, &trained, &split.test_x, &split.test_y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::test_support::blobs;

    fn split() -> Split {
        let (train_x, train_y) = blobs(60);
        let (test_x, test_y) = blobs(20);
        Split::new(train_x, train_y, test_x, test_y).unwrap()
    }

    fn small_config() -> MlConfig {
        let mut config = MlConfig::default();
        config.selection.knn_neighbors = vec![1, 3];
        config.selection.svm_c = vec![0.1, 1.0];
        config.selection.logreg_c = vec![0.1, 1.0];
        config.selection.max_iter = 50;
        config
    }

    #[test]
    fn test_runs_every_family_in_order() {
        let experiment = Experiment::new(small_config());
        let mut seen = Vec::new();
        let run = experiment
            .run_on_split(&split(), |r| seen.push(r.family))
            .unwrap();
        assert_eq!(seen, ClassifierFamily::ALL.to_vec());
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.finished_at.is_some());

        let knn = run.report(ClassifierFamily::Knn).unwrap();
        assert_eq!(knn.sweep.len(), 2);
        assert_eq!(knn.sweep[0].value, "1");
        assert!(knn.roc.is_some());
        assert!(knn.precision_recall.is_some());
        assert!((0.0..=100.0).contains(&knn.accuracy));
        assert!((knn.metrics.accuracy * 100.0 - knn.accuracy).abs() < 1e-9);
    }

    #[test]
    fn test_failure_aborts_without_isolation() {
        let mut config = small_config();
        config.selection.knn_neighbors = vec![];
        let mut seen = 0;
        let err = Experiment::new(config)
            .run_on_split(&split(), |_| seen += 1)
            .unwrap_err();
        assert!(err.is_config());
        assert_eq!(seen, 0);
    }

    #[test]
    fn test_isolation_skips_failed_family() {
        let mut config = small_config();
        config.selection.svm_c = vec![1.0, 1.0];
        config.experiment.isolate_families = true;
        let run = Experiment::new(config)
            .run_on_split(&split(), |_| {})
            .unwrap();
        assert_eq!(run.status, RunStatus::Partial);
        assert_eq!(run.reports.len(), 2);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].family, ClassifierFamily::Svm);
        assert!(run.report(ClassifierFamily::Svm).is_none());
    }

    #[test]
    fn test_family_subset() {
        let mut config = small_config();
        config.experiment.families = vec![ClassifierFamily::LogisticRegression];
        let run = Experiment::new(config)
            .run_on_split(&split(), |_| {})
            .unwrap();
        assert_eq!(run.reports.len(), 1);
        assert!(run.reports[0].optimal.parse::<f64>().is_ok());
    }
}
