//! Gradient-based parameter updates.

use crate::model::ParamOps;

/// Updates parameters from gradients, returning new values.
///
/// Training logic ([`Trainer`](crate::trainer::Trainer)) stays independent of
/// the update rule, so any model can be paired with any optimizer.
pub trait Optimizer<P> {
    fn step(&self, params: &P, gradients: &P) -> P;
}

/// Plain stochastic gradient descent: `θ ← θ - η · ∇L(θ)`.
///
/// Stateless: no momentum, no adaptive rates.
#[derive(Debug, Clone, Copy)]
pub struct SGD {
    lr: f64,
}

impl SGD {
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }

    pub fn learning_rate(&self) -> f64 {
        self.lr
    }
}

impl<P: ParamOps> Optimizer<P> for SGD {
    fn step(&self, params: &P, grads: &P) -> P {
        params.add(&grads.scale(-self.lr))
    }
}
