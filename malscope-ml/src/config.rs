//! Configuration for malscope runs.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from the user config dir (`config.toml`) and/or
//! `.malscope/config.toml` in the workspace directory.

use crate::algorithms::ClassifierFamily;
use crate::error::MlError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MlConfig {
    /// Dataset loading and splitting.
    #[serde(default)]
    pub dataset: DatasetConfig,
    /// Hyperparameter sweep settings.
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Which families run and how failures propagate.
    #[serde(default)]
    pub experiment: ExperimentConfig,
    /// Plot and console reporting.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Dataset loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the delimited dataset file.
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
    /// Field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Name of the binary label column.
    #[serde(default = "default_label_column")]
    pub label_column: String,
    /// Identifier and metadata columns kept out of the feature matrix.
    #[serde(default = "default_excluded_columns")]
    pub excluded_columns: Vec<String>,
    /// Fraction of samples held out for testing, in (0, 1).
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Seed for the train/test shuffle. `None` draws from the thread RNG.
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            delimiter: default_delimiter(),
            label_column: default_label_column(),
            excluded_columns: default_excluded_columns(),
            test_size: default_test_size(),
            seed: default_seed(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("dataset_malwares.csv")
}

fn default_delimiter() -> char {
    ','
}

fn default_label_column() -> String {
    "Malware".to_string()
}

fn default_excluded_columns() -> Vec<String> {
    ["Name", "TimeDateStamp", "CheckSum", "Machine"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_test_size() -> f64 {
    0.2
}

fn default_seed() -> Option<u64> {
    Some(20)
}

/// Hyperparameter sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Cross-validation fold count (>= 2).
    #[serde(default = "default_fold_count")]
    pub fold_count: usize,
    /// Neighbor counts swept for k-NN.
    #[serde(default = "default_knn_neighbors")]
    pub knn_neighbors: Vec<usize>,
    /// Regularization strengths swept for the linear SVM.
    #[serde(default = "default_c_values")]
    pub svm_c: Vec<f64>,
    /// Inverse regularization strengths swept for logistic regression.
    #[serde(default = "default_c_values")]
    pub logreg_c: Vec<f64>,
    /// Epoch cap for the iterative optimizers.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Step size for the iterative optimizers.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Convergence tolerance for the iterative optimizers.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            fold_count: default_fold_count(),
            knn_neighbors: default_knn_neighbors(),
            svm_c: default_c_values(),
            logreg_c: default_c_values(),
            max_iter: default_max_iter(),
            learning_rate: default_learning_rate(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_fold_count() -> usize {
    5
}

fn default_knn_neighbors() -> Vec<usize> {
    vec![1, 3, 5, 7, 9]
}

fn default_c_values() -> Vec<f64> {
    vec![0.01, 0.1, 1.0, 10.0]
}

fn default_max_iter() -> usize {
    200
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_tolerance() -> f64 {
    1e-4
}

/// Experiment sequencing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Families evaluated, in order.
    #[serde(default = "default_families")]
    pub families: Vec<ClassifierFamily>,
    /// Keep going after a family fails instead of aborting the run.
    #[serde(default)]
    pub isolate_families: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            families: default_families(),
            isolate_families: false,
        }
    }
}

fn default_families() -> Vec<ClassifierFamily> {
    vec![
        ClassifierFamily::Knn,
        ClassifierFamily::Svm,
        ClassifierFamily::LogisticRegression,
    ]
}

/// Reporting configuration passed to the plot renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving plot artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Render PDF plot artifacts after the run.
    #[serde(default)]
    pub plots_enabled: bool,
    /// Resolution used to convert pixel line widths to millimetres.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Figure width in inches.
    #[serde(default = "default_figure_width")]
    pub figure_width_in: f64,
    /// Figure height in inches.
    #[serde(default = "default_figure_height")]
    pub figure_height_in: f64,
    /// Directory holding the TrueType font family used in PDFs.
    #[serde(default = "default_font_dir")]
    pub font_dir: PathBuf,
    /// Font family name (files `<name>-Regular.ttf`, `<name>-Bold.ttf`, ...).
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            plots_enabled: false,
            dpi: default_dpi(),
            figure_width_in: default_figure_width(),
            figure_height_in: default_figure_height(),
            font_dir: default_font_dir(),
            font_family: default_font_family(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("plots")
}

fn default_dpi() -> u32 {
    300
}

fn default_figure_width() -> f64 {
    6.4
}

fn default_figure_height() -> f64 {
    4.8
}

fn default_font_dir() -> PathBuf {
    PathBuf::from("/usr/share/fonts/truetype/liberation")
}

fn default_font_family() -> String {
    "LiberationSans".to_string()
}

impl MlConfig {
    /// Check the cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), MlError> {
        if !(self.dataset.test_size > 0.0 && self.dataset.test_size < 1.0) {
            return Err(MlError::config(format!(
                "dataset.test_size must be in (0, 1), got {}",
                self.dataset.test_size
            )));
        }
        if self.selection.fold_count < 2 {
            return Err(MlError::config(format!(
                "selection.fold_count must be at least 2, got {}",
                self.selection.fold_count
            )));
        }
        if self.experiment.families.is_empty() {
            return Err(MlError::config("experiment.families is empty"));
        }
        if self.report.dpi == 0 {
            return Err(MlError::config("report.dpi must be positive"));
        }
        Ok(())
    }

    /// Render as the TOML accepted by the config files.
    pub fn to_toml_string(&self) -> Result<String, MlError> {
        toml::to_string_pretty(self)
            .map_err(|e| MlError::config(format!("cannot serialize config: {e}")))
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "malscope", "malscope")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".malscope").join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `MALSCOPE_`)
/// 3. Workspace-local config (`.malscope/config.toml`)
/// 4. User config (`~/.config/malscope/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&MlConfig>,
) -> Result<MlConfig, MlError> {
    let mut figment = Figment::from(Serialized::defaults(MlConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // MALSCOPE_SELECTION__FOLD_COUNT, MALSCOPE_DATASET__PATH, etc.
    figment = figment.merge(Env::prefixed("MALSCOPE_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: MlConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration with an additional explicit TOML file layered above the
/// workspace file and below the environment.
pub fn load_config_with_file(workspace: Option<&Path>, file: &Path) -> Result<MlConfig, MlError> {
    if !file.exists() {
        return Err(MlError::not_found(format!(
            "config file {}",
            file.display()
        )));
    }
    let mut figment = Figment::from(Serialized::defaults(MlConfig::default()));
    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }
    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }
    figment = figment
        .merge(Toml::file(file))
        .merge(Env::prefixed("MALSCOPE_").split("__"));

    let config: MlConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}

/// Check whether any malscope configuration file exists (user-level or workspace-level).
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            return true;
        }
    }

    if let Some(ws) = workspace {
        if workspace_config_path(ws).exists() {
            return true;
        }
    }

    false
}
