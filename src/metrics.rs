//! Evaluation metrics recorded in the training report.

use serde::{Deserialize, Serialize};

/// Binary classification scores at a 0.5 threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// `[[tn, fp], [fn, tp]]`, rows are actual classes.
    pub confusion_matrix: [[usize; 2]; 2],
}

impl ClassificationMetrics {
    /// Precision, recall and F1 are 0 when their denominator is 0.
    pub fn compute(actual: &[bool], predicted: &[bool]) -> Self {
        let mut cm = [[0usize; 2]; 2];
        for (&a, &p) in actual.iter().zip(predicted) {
            cm[usize::from(a)][usize::from(p)] += 1;
        }
        let [[tn, fp], [fn_, tp]] = cm;
        let total = tn + fp + fn_ + tp;

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy: ratio(tp + tn, total),
            precision,
            recall,
            f1,
            confusion_matrix: cm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    /// Coefficient of determination; 0 when the targets are constant.
    pub r2: f64,
}

impl RegressionMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Self {
        let n = y_true.len().min(y_pred.len());
        if n == 0 {
            return Self {
                rmse: 0.0,
                mae: 0.0,
                r2: 0.0,
            };
        }
        let pairs = || y_true.iter().zip(y_pred).take(n);

        let ss_res: f64 = pairs().map(|(t, p)| (t - p).powi(2)).sum();
        let abs: f64 = pairs().map(|(t, p)| (t - p).abs()).sum();
        let mean = y_true[..n].iter().sum::<f64>() / n as f64;
        let ss_tot: f64 = y_true[..n].iter().map(|t| (t - mean).powi(2)).sum();

        Self {
            rmse: (ss_res / n as f64).sqrt(),
            mae: abs / n as f64,
            r2: if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot },
        }
    }
}
