//! Plot artifact naming and the figures derived from finished families.

use crate::eval::curves::Curve;
use crate::error::MlError;
use crate::training::experiment::FamilyReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Method name used for charts spanning every family.
pub const COMPARISON_METHOD: &str = "all";

/// Suffix appended to the kind of a normalized artifact.
pub const NORM_SUFFIX: &str = "_norm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    ConfusionMatrix,
    PrecisionRecall,
    Roc,
    AccuracyComparison,
    TrainingTimeComparison,
    InferenceTimeComparison,
}

impl PlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfusionMatrix => "confusion_matrix",
            Self::PrecisionRecall => "precision_recall",
            Self::Roc => "roc",
            Self::AccuracyComparison => "accuracy_comparison",
            Self::TrainingTimeComparison => "training_time_comparison",
            Self::InferenceTimeComparison => "inference_time_comparison",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<kind><normSuffix>_<methodName>.pdf`
pub fn artifact_file_name(kind: PlotKind, normalized: bool, method: &str) -> String {
    let suffix = if normalized { NORM_SUFFIX } else { "" };
    format!("{kind}{suffix}_{method}.pdf")
}

/// Identity of one rendered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotArtifact {
    pub kind: PlotKind,
    pub normalized: bool,
    pub method: String,
}

impl PlotArtifact {
    pub fn new(kind: PlotKind, normalized: bool, method: impl Into<String>) -> Self {
        Self {
            kind,
            normalized,
            method: method.into(),
        }
    }

    pub fn file_name(&self) -> String {
        artifact_file_name(self.kind, self.normalized, &self.method)
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    pub fn title(&self) -> String {
        let what = match self.kind {
            PlotKind::ConfusionMatrix if self.normalized => "Normalized confusion matrix",
            PlotKind::ConfusionMatrix => "Confusion matrix",
            PlotKind::PrecisionRecall => "Precision-recall curve",
            PlotKind::Roc => "ROC curve",
            PlotKind::AccuracyComparison => "Held-out accuracy (%)",
            PlotKind::TrainingTimeComparison => "Training time (ms)",
            PlotKind::InferenceTimeComparison => "Testing time (ms)",
        };
        format!("{what} - {}", self.method)
    }
}

/// Renderer-independent content of a plot.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    /// Rows = actual class, columns = predicted class.
    Matrix {
        cells: [[f64; 2]; 2],
        normalized: bool,
    },
    Curve {
        curve: Curve,
        x_label: &'static str,
        y_label: &'static str,
        /// Area summary printed under the chart.
        area_label: String,
    },
    Bars {
        labels: Vec<String>,
        values: Vec<f64>,
        unit: &'static str,
    },
}

/// Sink for figures. The PDF renderer is the production implementation.
pub trait ArtifactRenderer {
    fn render(&self, artifact: &PlotArtifact, figure: &Figure) -> Result<PathBuf, MlError>;
}

/// Confusion matrices (raw and normalized), precision-recall and ROC for one family.
pub fn family_figures(report: &FamilyReport) -> Vec<(PlotArtifact, Figure)> {
    let method = report.family.method_name();
    let cm = &report.metrics.confusion_matrix;
    let raw = cm.counts.map(|row| row.map(|c| c as f64));

    let mut figures = vec![
        (
            PlotArtifact::new(PlotKind::ConfusionMatrix, false, method),
            Figure::Matrix {
                cells: raw,
                normalized: false,
            },
        ),
        (
            PlotArtifact::new(PlotKind::ConfusionMatrix, true, method),
            Figure::Matrix {
                cells: cm.normalized(),
                normalized: true,
            },
        ),
    ];
    if let Some(pr) = &report.precision_recall {
        figures.push((
            PlotArtifact::new(PlotKind::PrecisionRecall, false, method),
            Figure::Curve {
                area_label: format!(
                    "Average precision = {:.4}",
                    crate::eval::curves::average_precision(pr)
                ),
                curve: pr.clone(),
                x_label: "Recall",
                y_label: "Precision",
            },
        ));
    }
    if let Some(roc) = &report.roc {
        figures.push((
            PlotArtifact::new(PlotKind::Roc, false, method),
            Figure::Curve {
                area_label: format!("AUC = {:.4}", crate::eval::curves::roc_auc(roc)),
                curve: roc.clone(),
                x_label: "False positive rate",
                y_label: "True positive rate",
            },
        ));
    }
    figures
}

/// Bar charts comparing accuracy and latencies across families.
pub fn comparison_figures(reports: &[FamilyReport]) -> Vec<(PlotArtifact, Figure)> {
    if reports.is_empty() {
        return Vec::new();
    }
    let labels: Vec<String> = reports
        .iter()
        .map(|r| r.family.label().to_string())
        .collect();
    let bars = |kind, values: Vec<f64>, unit| {
        (
            PlotArtifact::new(kind, false, COMPARISON_METHOD),
            Figure::Bars {
                labels: labels.clone(),
                values,
                unit,
            },
        )
    };
    vec![
        bars(
            PlotKind::AccuracyComparison,
            reports.iter().map(|r| r.accuracy).collect(),
            "%",
        ),
        bars(
            PlotKind::TrainingTimeComparison,
            reports.iter().map(|r| r.training_ms()).collect(),
            "ms",
        ),
        bars(
            PlotKind::InferenceTimeComparison,
            reports.iter().map(|r| r.inference_ms()).collect(),
            "ms",
        ),
    ]
}

/// Render every family figure and, when more than one family finished, the comparisons.
pub fn render_all(
    renderer: &dyn ArtifactRenderer,
    reports: &[FamilyReport],
) -> Result<Vec<PathBuf>, MlError> {
    let mut written = Vec::new();
    for report in reports {
        for (artifact, figure) in family_figures(report) {
            written.push(renderer.render(&artifact, &figure)?);
        }
    }
    if reports.len() > 1 {
        for (artifact, figure) in comparison_figures(reports) {
            written.push(renderer.render(&artifact, &figure)?);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ClassifierFamily;
    use crate::eval::curves::{precision_recall_curve, roc_curve};
    use crate::training::metrics::ClassificationMetrics;
    use crate::training::sweep::SweepEntry;
    use std::cell::RefCell;
    use std::time::Duration;

    struct Recording {
        names: RefCell<Vec<String>>,
    }

    impl ArtifactRenderer for Recording {
        fn render(&self, artifact: &PlotArtifact, _figure: &Figure) -> Result<PathBuf, MlError> {
            self.names.borrow_mut().push(artifact.file_name());
            Ok(PathBuf::from(artifact.file_name()))
        }
    }

    fn report(family: ClassifierFamily) -> FamilyReport {
        let actual = [0, 1, 0, 1];
        let scores = [0.2, 0.8, 0.4, 0.6];
        FamilyReport {
            family,
            optimal: "3".into(),
            sweep: vec![SweepEntry {
                value: "3".into(),
                mean_score: 0.9,
            }],
            training_latency: Duration::from_millis(5),
            inference_latency: Duration::from_millis(1),
            accuracy: 100.0,
            metrics: ClassificationMetrics::from_predictions(&actual, &[0, 1, 0, 1], &scores)
                .unwrap(),
            roc: Some(roc_curve(&actual, &scores).unwrap()),
            precision_recall: Some(precision_recall_curve(&actual, &scores).unwrap()),
        }
    }

    #[test]
    fn test_artifact_file_name_convention() {
        assert_eq!(
            artifact_file_name(PlotKind::ConfusionMatrix, true, "knn"),
            "confusion_matrix_norm_knn.pdf"
        );
        assert_eq!(artifact_file_name(PlotKind::Roc, false, "svm"), "roc_svm.pdf");
        assert_eq!(
            PlotArtifact::new(PlotKind::PrecisionRecall, false, "logistic_regression")
                .path_in(Path::new("/tmp/plots")),
            PathBuf::from("/tmp/plots/precision_recall_logistic_regression.pdf")
        );
    }

    #[test]
    fn test_family_figures() {
        let figures = family_figures(&report(ClassifierFamily::Knn));
        let names: Vec<String> = figures.iter().map(|(a, _)| a.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "confusion_matrix_knn.pdf",
                "confusion_matrix_norm_knn.pdf",
                "precision_recall_knn.pdf",
                "roc_knn.pdf",
            ]
        );
        match &figures[1].1 {
            Figure::Matrix { cells, normalized } => {
                assert!(normalized);
                assert_eq!(cells[0], [1.0, 0.0]);
            }
            other => panic!("unexpected figure {other:?}"),
        }
    }

    #[test]
    fn test_render_all_adds_comparisons_for_multiple_families() {
        let renderer = Recording {
            names: RefCell::new(Vec::new()),
        };
        let reports = vec![report(ClassifierFamily::Knn), report(ClassifierFamily::Svm)];
        let written = render_all(&renderer, &reports).unwrap();
        assert_eq!(written.len(), 4 + 4 + 3);
        let names = renderer.names.borrow();
        assert!(names.contains(&"accuracy_comparison_all.pdf".to_string()));
        assert!(names.contains(&"training_time_comparison_all.pdf".to_string()));
        assert!(names.contains(&"inference_time_comparison_all.pdf".to_string()));
    }

    #[test]
    fn test_single_family_skips_comparisons() {
        let renderer = Recording {
            names: RefCell::new(Vec::new()),
        };
        let written = render_all(&renderer, &[report(ClassifierFamily::Knn)]).unwrap();
        assert_eq!(written.len(), 4);
        assert!(comparison_figures(&[]).is_empty());
    }
}
