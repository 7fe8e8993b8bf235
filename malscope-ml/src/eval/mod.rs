//! Threshold curves and area summaries.

pub mod curves;

pub use curves::{Curve, auc, average_precision, precision_recall_curve, roc_auc, roc_curve};
