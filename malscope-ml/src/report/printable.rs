//! Console text for each classifier family.

use crate::algorithms::ClassifierFamily;
use crate::training::experiment::FamilyReport;
use std::fmt::Write as _;

const KNN_BANNER: &str = r"
 _        _        _
| \    /\( (    /|( (    /|
|  \  / /|  \  ( ||  \  ( |
|  (_/ / |   \ | ||   \ | |
|   _ (  | (\ \) || (\ \) |
|  ( \ \ | | \   || | \   |
|  /  \ \| )  \  || )  \  |
|_/    \/|/    )_)|/    )_)
";

const SVM_BANNER: &str = r"
  _______           _______
 (  ____ \|\     /|(       )
 | (    \/| )   ( || () () |
 | (_____ | |   | || || || |
 (_____  )( (   ) )| |(_)| |
       ) | \ \_/ / | |   | |
 /\____) |  \   /  | )   ( |
 \_______)   \_/   |/     \|
";

const LR_BANNER: &str = r"
 _        _______
( \      (  ____ )
| (      | (    )|
| |      | (____)|
| |      |     __)
| |      | (\ (
| (____/\| ) \ \__
(_______/|/   \__/
";

/// Fixed labels used when printing one family's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Printable {
    pub banner: &'static str,
    /// Prefix after `#`, e.g. `KNN`.
    pub label: &'static str,
    /// Swept hyperparameter, e.g. `K`.
    pub hyperparameter: &'static str,
    /// Suffix after a candidate value in the per-candidate line, e.g. `NN`.
    pub candidate_suffix: &'static str,
    pub method_name: &'static str,
}

impl Printable {
    pub fn for_family(family: ClassifierFamily) -> Self {
        let (banner, candidate_suffix) = match family {
            ClassifierFamily::Knn => (KNN_BANNER, "NN"),
            ClassifierFamily::Svm => (SVM_BANNER, ""),
            ClassifierFamily::LogisticRegression => (LR_BANNER, ""),
        };
        Self {
            banner,
            label: family.label(),
            hyperparameter: family.hyperparameter(),
            candidate_suffix,
            method_name: family.method_name(),
        }
    }

    pub fn cv_header(&self, folds: usize) -> String {
        format!("# {} - {folds}-fold cross validation", self.label)
    }

    pub fn candidate_line(&self, value: &str, mean_score: f64) -> String {
        let using = if self.candidate_suffix.is_empty() {
            format!("{}={value}", self.hyperparameter)
        } else {
            format!("{value} {}", self.candidate_suffix)
        };
        format!(
            "# {} - Cross validation accuracy using {using}: {mean_score:.4}",
            self.label
        )
    }

    pub fn optimal_line(&self, value: &str) -> String {
        format!("# {} - Optimal {}: {value}", self.label, self.hyperparameter)
    }

    pub fn training_line(&self, ms: f64) -> String {
        format!("# {} - training time: {ms:.3} ms", self.label)
    }

    pub fn testing_line(&self, ms: f64) -> String {
        format!("# {} - testing time: {ms:.3} ms", self.label)
    }

    pub fn accuracy_line(&self, percent: f64) -> String {
        format!("# {} - prediction accuracy: {percent:.2} %", self.label)
    }
}

/// Full console block for a finished family.
pub fn render_console(report: &FamilyReport, folds: usize) -> String {
    let printable = Printable::for_family(report.family);
    let mut out = String::new();
    let _ = writeln!(out, "{}", printable.banner);
    let _ = writeln!(out, "{}\n", printable.cv_header(folds));
    for entry in &report.sweep {
        let _ = writeln!(out, "{}", printable.candidate_line(&entry.value, entry.mean_score));
    }
    let _ = writeln!(out, "{}\n", printable.optimal_line(&report.optimal));
    let _ = writeln!(out, "{}", printable.training_line(report.training_ms()));
    let _ = writeln!(out, "{}", printable.testing_line(report.inference_ms()));
    let _ = writeln!(out, "{}", printable.accuracy_line(report.accuracy));
    out
}

/// One-line-per-family comparison table.
pub fn render_summary(reports: &[FamilyReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<22} {:>10} {:>10} {:>14} {:>14} {:>8}",
        "method", "optimal", "accuracy", "training (ms)", "testing (ms)", "AUC"
    );
    for r in reports {
        let auc = r
            .metrics
            .auc_roc
            .map(|a| format!("{a:.4}"))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<22} {:>10} {:>9.2}% {:>14.3} {:>14.3} {:>8}",
            r.family.method_name(),
            r.optimal,
            r.accuracy,
            r.training_ms(),
            r.inference_ms(),
            auc
        );
    }
    out
}
