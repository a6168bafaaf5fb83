//! Weight penalties added to the training loss.

use crate::model::{LinearParams, TrainableModel};

/// Penalty value and its gradient for the model's current parameters.
pub trait Regularizer<M: TrainableModel> {
    fn regularizer_penalty_grad(&self, model: &M) -> (f64, M::Gradients);
}

/// Ridge penalty `λ‖w‖²`; the bias is not penalized.
#[derive(Debug, Clone, Copy)]
pub struct L2 {
    lambda: f64,
}

impl L2 {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl<M> Regularizer<M> for L2
where
    M: TrainableModel<Params = LinearParams, Gradients = LinearParams>,
{
    fn regularizer_penalty_grad(&self, model: &M) -> (f64, LinearParams) {
        let w = &model.params().weights;
        let penalty = self.lambda * w.dot(w);
        let grad = LinearParams {
            weights: w * (2.0 * self.lambda),
            bias: 0.0,
        };
        (penalty, grad)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegularizer;

impl<M> Regularizer<M> for NoRegularizer
where
    M: TrainableModel<Params = LinearParams, Gradients = LinearParams>,
{
    fn regularizer_penalty_grad(&self, model: &M) -> (f64, LinearParams) {
        (0.0, LinearParams::zeros(model.params().n_features()))
    }
}
