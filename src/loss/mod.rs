//! Differentiable losses for the trainer loop.

use crate::model::sigmoid;
use ndarray::{Array1, Zip};

/// A differentiable loss.
///
/// `loss` is the scalar value for logging; `grad_wrt_prediction` is what the
/// trainer hands to `model.backward()`.
pub trait Loss {
    type Prediction;
    type Target;

    fn loss(&self, prediction: &Self::Prediction, target: &Self::Target) -> f64;

    /// `dL/dprediction`
    fn grad_wrt_prediction(
        &self,
        prediction: &Self::Prediction,
        target: &Self::Target,
    ) -> Self::Prediction;
}

/// Mean squared error: `L = (1/n) Σ (pred - target)²`.
///
/// Gradient: `(pred - target) / n`. The factor 2 is left to the learning rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MSELoss;

impl Loss for MSELoss {
    type Prediction = Array1<f64>;
    type Target = Array1<f64>;

    fn loss(&self, pred: &Self::Prediction, target: &Self::Target) -> f64 {
        let diff = pred - target;
        diff.dot(&diff) / diff.len().max(1) as f64
    }

    fn grad_wrt_prediction(&self, pred: &Self::Prediction, target: &Self::Target) -> Array1<f64> {
        (pred - target) / pred.len().max(1) as f64
    }
}

/// Binary cross-entropy on logits.
///
/// Uses `max(z, 0) - z·t + ln(1 + e^-|z|)`; gradient `(σ(z) - t) / n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BCEWithLogitsLoss;

impl Loss for BCEWithLogitsLoss {
    type Prediction = Array1<f64>;
    type Target = Array1<f64>;

    fn loss(&self, logits: &Self::Prediction, targets: &Self::Target) -> f64 {
        let n = logits.len().max(1) as f64;
        Zip::from(logits)
            .and(targets)
            .fold(0.0, |acc, &z, &t| {
                acc + z.max(0.0) - z * t + (-z.abs()).exp().ln_1p()
            })
            / n
    }

    fn grad_wrt_prediction(
        &self,
        logits: &Self::Prediction,
        targets: &Self::Target,
    ) -> Array1<f64> {
        let n = logits.len().max(1) as f64;
        Zip::from(logits)
            .and(targets)
            .map_collect(|&z, &t| (sigmoid(z) - t) / n)
    }
}
