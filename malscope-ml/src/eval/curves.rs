//! Threshold curves over continuous decision scores.

use crate::error::MlError;
use serde::{Deserialize, Serialize};

/// A curve as parallel point vectors plus the thresholds producing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Horizontal coordinates (false-positive rate for ROC, recall for PR).
    pub x: Vec<f64>,
    /// Vertical coordinates (true-positive rate for ROC, precision for PR).
    pub y: Vec<f64>,
    /// Score threshold of each point after the anchor point.
    pub thresholds: Vec<f64>,
}

impl Curve {
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Cumulative false/true positive counts at each distinct score, high to low.
struct Cumulative {
    thresholds: Vec<f64>,
    fps: Vec<usize>,
    tps: Vec<usize>,
    positives: usize,
    negatives: usize,
}

fn cumulative_counts(actual: &[usize], scores: &[f64]) -> Result<Cumulative, MlError> {
    if actual.len() != scores.len() {
        return Err(MlError::evaluation(format!(
            "{} labels but {} scores",
            actual.len(),
            scores.len()
        )));
    }
    if scores.iter().any(|s| s.is_nan()) {
        return Err(MlError::evaluation("decision scores contain NaN"));
    }
    let positives = actual.iter().filter(|&&l| l == 1).count();
    let negatives = actual.len() - positives;

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut thresholds = Vec::new();
    let mut fps = Vec::new();
    let mut tps = Vec::new();
    let (mut fp, mut tp) = (0usize, 0usize);
    for (pos, &i) in order.iter().enumerate() {
        if actual[i] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_run = order
            .get(pos + 1)
            .is_none_or(|&next| scores[next] != scores[i]);
        if last_of_run {
            thresholds.push(scores[i]);
            fps.push(fp);
            tps.push(tp);
        }
    }
    Ok(Cumulative {
        thresholds,
        fps,
        tps,
        positives,
        negatives,
    })
}

/// Receiver operating characteristic: (false-positive rate, true-positive rate)
/// starting at (0, 0).
pub fn roc_curve(actual: &[usize], scores: &[f64]) -> Result<Curve, MlError> {
    let Cumulative {
        thresholds,
        fps,
        tps,
        positives,
        negatives,
    } = cumulative_counts(actual, scores)?;
    if positives == 0 || negatives == 0 {
        return Err(MlError::evaluation("ROC needs both classes in the labels"));
    }
    let mut x = vec![0.0];
    let mut y = vec![0.0];
    x.extend(fps.iter().map(|&f| f as f64 / negatives as f64));
    y.extend(tps.iter().map(|&t| t as f64 / positives as f64));
    Ok(Curve { x, y, thresholds })
}

/// Precision-recall curve starting at recall 0 / precision 1.
pub fn precision_recall_curve(actual: &[usize], scores: &[f64]) -> Result<Curve, MlError> {
    let Cumulative {
        thresholds,
        fps,
        tps,
        positives,
        ..
    } = cumulative_counts(actual, scores)?;
    if positives == 0 {
        return Err(MlError::evaluation(
            "precision-recall needs at least one positive label",
        ));
    }
    let mut x = vec![0.0];
    let mut y = vec![1.0];
    for (&fp, &tp) in fps.iter().zip(&tps) {
        x.push(tp as f64 / positives as f64);
        y.push(tp as f64 / (tp + fp) as f64);
    }
    Ok(Curve { x, y, thresholds })
}

/// Trapezoidal area under a curve with non-decreasing `x`.
pub fn auc(curve: &Curve) -> f64 {
    curve
        .x
        .windows(2)
        .zip(curve.y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

pub fn roc_auc(curve: &Curve) -> f64 {
    auc(curve)
}

/// Step-wise average precision: sum over thresholds of (recall gain) x precision.
pub fn average_precision(curve: &Curve) -> f64 {
    curve
        .x
        .windows(2)
        .zip(curve.y.iter().skip(1))
        .map(|(rs, &p)| (rs[1] - rs[0]) * p)
        .sum()
}
