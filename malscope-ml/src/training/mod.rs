//! Model selection, held-out metrics and experiment sequencing.

pub mod experiment;
pub mod metrics;
pub mod sweep;

pub use experiment::{Experiment, ExperimentRun, FamilyFailure, FamilyReport, RunStatus};
pub use metrics::{ClassificationMetrics, ConfusionMatrix};
pub use sweep::{ModelSelector, SweepEntry, SweepRecord, TrainedModel};
