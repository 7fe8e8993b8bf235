//! # malscope-ml: classical classifiers for PE-header malware detection
//!
//! Loads a delimited dataset of portable-executable header features, holds
//! out a test partition, and for each classifier family (k-NN, linear SVM,
//! logistic regression) sweeps one hyperparameter under stratified k-fold
//! cross-validation before retraining the winner and measuring it.
//!
//! ## Flow
//!
//! 1. [`data`]: delimited source, column roles, feature matrix, split, scaling
//! 2. [`algorithms`]: the [`Classifier`](algorithms::Classifier) capability and its families
//! 3. [`training`]: [`ModelSelector`] sweeps and the [`Experiment`] sequencing them
//! 4. [`report`]: console text and PDF plot artifacts

// Foundation
pub mod config;
pub mod error;

// Data
pub mod data;

// Models and selection
pub mod algorithms;
pub mod eval;
pub mod training;

// Output
pub mod report;

// Re-exports
pub use algorithms::{Classifier, ClassifierFamily};
pub use config::{MlConfig, load_config, load_config_with_file};
pub use error::MlError;
pub use training::{Experiment, ExperimentRun, FamilyReport, ModelSelector, TrainedModel};
