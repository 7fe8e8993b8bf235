//! CLI subcommand handlers and the default experiment run.

use crate::Commands;
use crate::ConfigAction;
use anyhow::Context;
use malscope_ml::report::{self, PdfRenderer};
use malscope_ml::{ClassifierFamily, Experiment, MlConfig};
use std::path::{Path, PathBuf};

/// Handle a CLI subcommand.
pub fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace),
    }
}

fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(".malscope");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let toml_str = MlConfig::default().to_toml_string()?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = malscope_ml::load_config(Some(workspace), None)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            println!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

/// Command-line values layered over the loaded configuration.
#[derive(Debug, Default)]
pub struct Overrides {
    pub dataset: Option<PathBuf>,
    pub families: Vec<String>,
    pub folds: Option<usize>,
    pub seed: Option<u64>,
    pub plots: bool,
    pub output: Option<PathBuf>,
    pub isolate: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut MlConfig) -> anyhow::Result<()> {
        if let Some(path) = &self.dataset {
            config.dataset.path = path.clone();
        }
        if !self.families.is_empty() {
            config.experiment.families = self
                .families
                .iter()
                .map(|f| f.parse::<ClassifierFamily>())
                .collect::<Result<_, _>>()?;
        }
        if let Some(folds) = self.folds {
            config.selection.fold_count = folds;
        }
        if let Some(seed) = self.seed {
            config.dataset.seed = Some(seed);
        }
        if self.plots {
            config.report.plots_enabled = true;
        }
        if let Some(output) = &self.output {
            config.report.output_dir = output.clone();
        }
        if self.isolate {
            config.experiment.isolate_families = true;
        }
        Ok(())
    }
}

/// Load layered configuration, then apply command-line overrides.
pub fn resolve_config(
    workspace: &Path,
    file: Option<&Path>,
    overrides: &Overrides,
) -> anyhow::Result<MlConfig> {
    let mut config = match file {
        Some(file) => malscope_ml::load_config_with_file(Some(workspace), file),
        None => malscope_ml::load_config(Some(workspace), None),
    }
    .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    overrides.apply(&mut config)?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    Ok(config)
}

/// Run every configured family, printing each block as it finishes.
pub fn run_experiment(config: MlConfig, json: bool) -> anyhow::Result<()> {
    let folds = config.selection.fold_count;
    let experiment = Experiment::new(config.clone());
    let run = experiment
        .run(|family| print!("{}", report::render_console(family, folds)))
        .with_context(|| format!("experiment on {} failed", config.dataset.path.display()))?;

    for failure in &run.failures {
        eprintln!("  {} failed: {}", failure.family, failure.error);
    }
    if run.reports.len() > 1 {
        println!("\n{}", report::render_summary(&run.reports));
    }

    if config.report.plots_enabled {
        let renderer = PdfRenderer::new(config.report.clone());
        let written = report::render_all(&renderer, &run.reports)
            .context("failed to write plot artifacts")?;
        println!(
            "Wrote {} plot(s) to {}",
            written.len(),
            renderer.output_dir().display()
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    }

    if run.reports.is_empty() {
        anyhow::bail!("every classifier family failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_config_init_creates_file() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();

        handle_command(
            Commands::Config {
                action: ConfigAction::Init,
            },
            workspace,
        )
        .unwrap();

        let config_path = workspace.join(".malscope").join("config.toml");
        let content = std::fs::read_to_string(&config_path).unwrap();
        let parsed: MlConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.dataset.label_column, "Malware");
        assert_eq!(parsed.selection.fold_count, 5);
    }

    #[test]
    fn test_config_init_idempotent() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();
        let config_dir = workspace.join(".malscope");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "# custom").unwrap();

        handle_command(
            Commands::Config {
                action: ConfigAction::Init,
            },
            workspace,
        )
        .unwrap();

        let content = std::fs::read_to_string(config_dir.join("config.toml")).unwrap();
        assert_eq!(content, "# custom");
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = MlConfig::default();
        let overrides = Overrides {
            dataset: Some(PathBuf::from("other.csv")),
            families: vec!["lr".into(), "knn".into()],
            folds: Some(3),
            seed: Some(7),
            plots: true,
            output: Some(PathBuf::from("out")),
            isolate: true,
        };
        overrides.apply(&mut config).unwrap();
        assert_eq!(config.dataset.path, PathBuf::from("other.csv"));
        assert_eq!(
            config.experiment.families,
            vec![ClassifierFamily::LogisticRegression, ClassifierFamily::Knn]
        );
        assert_eq!(config.selection.fold_count, 3);
        assert_eq!(config.dataset.seed, Some(7));
        assert!(config.report.plots_enabled);
        assert_eq!(config.report.output_dir, PathBuf::from("out"));
        assert!(config.experiment.isolate_families);
    }

    #[test]
    fn test_unknown_family_rejected() {
        let mut config = MlConfig::default();
        let overrides = Overrides {
            families: vec!["forest".into()],
            ..Default::default()
        };
        assert!(overrides.apply(&mut config).is_err());
    }

    #[test]
    fn test_resolve_config_validates_overrides() {
        let dir = TempDir::new().unwrap();
        let overrides = Overrides {
            folds: Some(1),
            ..Default::default()
        };
        assert!(resolve_config(dir.path(), None, &overrides).is_err());

        let missing = dir.path().join("missing.toml");
        assert!(resolve_config(dir.path(), Some(&missing), &Overrides::default()).is_err());
    }
}
