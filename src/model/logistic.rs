//! Logistic regression.
//!
//! Training works on logits (pair it with
//! [`BCEWithLogitsLoss`](crate::loss::BCEWithLogitsLoss)); the fitted model
//! returns probabilities.

use crate::model::linear::{LinearParams, SerializableLinearParams};
use crate::model::{Fitted, InferenceModel, TrainableModel, Unfitted};
use ndarray::{Array1, Array2};
use std::marker::PhantomData;

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone)]
pub struct LogisticModel<S> {
    params: LinearParams,
    _state: PhantomData<S>,
}

pub type LogisticRegression = LogisticModel<Unfitted>;

impl LogisticRegression {
    pub fn new(n_features: usize) -> Self {
        Self::from_params(LinearParams::zeros(n_features))
    }

    pub fn from_params(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }
}

impl LogisticModel<Fitted> {
    pub fn new(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    /// Raw logits `X @ w + b`.
    pub fn decision_function(&self, x: &Array2<f64>) -> Array1<f64> {
        self.params.affine(x)
    }
}

/// Outputs the probability of the positive class.
impl InferenceModel for LogisticModel<Fitted> {
    type InputSingle = Array1<f64>;
    type OutputSingle = f64;
    type InputBatch = Array2<f64>;
    type OutputBatch = Array1<f64>;
    type ParamsRepr = SerializableLinearParams;

    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle {
        sigmoid(self.params.weights.dot(input) + self.params.bias)
    }

    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch {
        self.decision_function(input).mapv(sigmoid)
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        (&self.params).into()
    }

    fn from_params(params: Self::ParamsRepr) -> Self {
        Self::new(params.into())
    }
}

impl TrainableModel for LogisticModel<Unfitted> {
    type Input = Array2<f64>;
    type Prediction = Array1<f64>;
    type Params = LinearParams;
    type Gradients = LinearParams;
    type Output = LogisticModel<Fitted>;

    fn forward(&self, x: &Self::Input) -> Self::Prediction {
        self.params.affine(x)
    }

    fn backward(&self, x: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients {
        LinearParams {
            weights: x.t().dot(grad_output),
            bias: grad_output.sum(),
        }
    }

    fn params(&self) -> &Self::Params {
        &self.params
    }

    fn update_params(&mut self, params: &Self::Params) {
        self.params = params.clone();
    }

    fn into_fitted(self) -> LogisticModel<Fitted> {
        LogisticModel::<Fitted>::new(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sigmoid_values() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(1000.0) <= 1.0);
    }

    #[test]
    fn test_forward_returns_logits_and_fitted_returns_probabilities() {
        let params = LinearParams {
            weights: array![1.0, -1.0],
            bias: 0.0,
        };
        let x = array![[2.0, 0.0], [0.0, 2.0], [1.0, 1.0]];
        let model = LogisticRegression::from_params(params);
        assert_eq!(model.forward(&x), array![2.0, -2.0, 0.0]);

        let fitted = model.into_fitted();
        let probs = fitted.predict_batch(&x);
        assert!(probs[0] > 0.5);
        assert!(probs[1] < 0.5);
        assert_eq!(probs[2], 0.5);
        assert_eq!(fitted.predict(&array![1.0, 1.0]), 0.5);
    }

    #[test]
    fn test_params_round_trip() {
        let fitted = LogisticModel::<Fitted>::new(LinearParams {
            weights: array![0.3],
            bias: -0.1,
        });
        let restored = LogisticModel::<Fitted>::from_params(fitted.extract_params());
        assert_eq!(restored.params(), fitted.params());
    }
}
