//! Classifier families known to the experiment runner.

use crate::error::MlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classical classifier families swept over one hyperparameter each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierFamily {
    /// k-nearest-neighbors, swept over the neighbor count.
    Knn,
    /// Linear support-vector machine, swept over `C`.
    Svm,
    /// L2-regularized logistic regression, swept over `C`.
    LogisticRegression,
}

impl ClassifierFamily {
    pub const ALL: [ClassifierFamily; 3] = [Self::Knn, Self::Svm, Self::LogisticRegression];

    /// Identifier used in artifact file names and config.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Knn => "knn",
            Self::Svm => "svm",
            Self::LogisticRegression => "logistic_regression",
        }
    }

    /// Short label prefixed to console lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Knn => "KNN",
            Self::Svm => "SVM",
            Self::LogisticRegression => "LR",
        }
    }

    /// Name of the swept hyperparameter.
    pub fn hyperparameter(&self) -> &'static str {
        match self {
            Self::Knn => "K",
            Self::Svm | Self::LogisticRegression => "C",
        }
    }
}

impl fmt::Display for ClassifierFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

impl FromStr for ClassifierFamily {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "knn" => Ok(Self::Knn),
            "svm" => Ok(Self::Svm),
            "logistic_regression" | "logreg" | "lr" => Ok(Self::LogisticRegression),
            other => Err(MlError::config(format!(
                "unknown classifier family '{other}' (expected knn, svm, logistic_regression)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_names() {
        assert_eq!(ClassifierFamily::Knn.method_name(), "knn");
        assert_eq!(ClassifierFamily::LogisticRegression.label(), "LR");
        assert_eq!(ClassifierFamily::Svm.hyperparameter(), "C");
        assert_eq!(ClassifierFamily::Knn.to_string(), "knn");
    }

    #[test]
    fn test_family_from_str() {
        assert_eq!("SVM".parse::<ClassifierFamily>().unwrap(), ClassifierFamily::Svm);
        assert_eq!(
            "logreg".parse::<ClassifierFamily>().unwrap(),
            ClassifierFamily::LogisticRegression
        );
        assert!("forest".parse::<ClassifierFamily>().unwrap_err().is_config());
    }

    #[test]
    fn test_family_serde() {
        let json = serde_json::to_string(&ClassifierFamily::LogisticRegression).unwrap();
        assert_eq!(json, "\"logistic_regression\"");
        let parsed: ClassifierFamily = serde_json::from_str("\"knn\"").unwrap();
        assert_eq!(parsed, ClassifierFamily::Knn);
    }
}
