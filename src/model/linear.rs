//! Linear regression with compile-time state tracking.
//!
//! - [`LinearRegression`] = `LinearModel<Unfitted>`, used during training.
//! - `LinearModel<Fitted>`: inference-only, serializable predictor.
//!
//! The fitted model carries no training hyperparameters; regularization
//! lives in [`crate::regularizers`] and the step size in [`crate::optimizer`].

use crate::model::{Fitted, InferenceModel, ParamOps, TrainableModel, Unfitted};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Trainable parameters: weights and bias.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearParams {
    pub weights: Array1<f64>,
    pub bias: f64,
}

impl LinearParams {
    pub fn zeros(n_features: usize) -> Self {
        Self {
            weights: Array1::zeros(n_features),
            bias: 0.0,
        }
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// `X @ w + b`
    pub fn affine(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.weights) + self.bias
    }

    pub fn is_finite(&self) -> bool {
        self.bias.is_finite() && self.weights.iter().all(|w| w.is_finite())
    }
}

impl ParamOps for LinearParams {
    fn add(&self, other: &Self) -> Self {
        Self {
            weights: &self.weights + &other.weights,
            bias: self.bias + other.bias,
        }
    }

    fn scale(&self, factor: f64) -> Self {
        Self {
            weights: &self.weights * factor,
            bias: self.bias * factor,
        }
    }
}

/// Plain-data form of [`LinearParams`] stored inside artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableLinearParams {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl From<&LinearParams> for SerializableLinearParams {
    fn from(params: &LinearParams) -> Self {
        Self {
            weights: params.weights.to_vec(),
            bias: params.bias,
        }
    }
}

impl From<SerializableLinearParams> for LinearParams {
    fn from(value: SerializableLinearParams) -> Self {
        Self {
            weights: Array1::from(value.weights),
            bias: value.bias,
        }
    }
}

/// A linear model with its training state encoded in `S`.
#[derive(Debug, Clone)]
pub struct LinearModel<S> {
    params: LinearParams,
    _state: PhantomData<S>,
}

/// An unfitted linear regression model.
pub type LinearRegression = LinearModel<Unfitted>;

impl LinearRegression {
    /// Zero-initialized model over `n_features` inputs.
    pub fn new(n_features: usize) -> Self {
        Self::from_params(LinearParams::zeros(n_features))
    }

    /// Warm start from explicit parameters.
    pub fn from_params(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }
}

impl LinearModel<Fitted> {
    pub fn new(params: LinearParams) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }
}

/// `y = w·x + b`
impl InferenceModel for LinearModel<Fitted> {
    type InputSingle = Array1<f64>;
    type OutputSingle = f64;
    type InputBatch = Array2<f64>;
    type OutputBatch = Array1<f64>;
    type ParamsRepr = SerializableLinearParams;

    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle {
        self.params.weights.dot(input) + self.params.bias
    }

    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch {
        self.params.affine(input)
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        (&self.params).into()
    }

    fn from_params(params: Self::ParamsRepr) -> Self {
        Self::new(params.into())
    }
}

/// Forward: `X @ w + b`. Backward: `dw = Xᵀ · g`, `db = Σ g`.
impl TrainableModel for LinearModel<Unfitted> {
    type Input = Array2<f64>;
    type Prediction = Array1<f64>;
    type Params = LinearParams;
    type Gradients = LinearParams;
    type Output = LinearModel<Fitted>;

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

    fn into_fitted(self) -> LinearModel<Fitted> {
        LinearModel::<Fitted>::new(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params(weights: Array1<f64>, bias: f64) -> LinearParams {
        LinearParams { weights, bias }
    }

    #[test]
    fn test_param_ops_add() {
        let result = params(array![1.0, 2.0], 0.5).add(&params(array![0.5, 1.0], 0.5));
        assert_eq!(result.weights, array![1.5, 3.0]);
        assert_eq!(result.bias, 1.0);
    }

    #[test]
    fn test_param_ops_scale_negative() {
        let result = params(array![2.0], 1.0).scale(-1.0);
        assert_eq!(result.weights, array![-2.0]);
        assert_eq!(result.bias, -1.0);
    }

    #[test]
    fn test_forward_and_backward() {
        let model = LinearRegression::from_params(params(array![2.0, -1.0], 0.5));
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

        assert_eq!(model.forward(&x), array![2.5, -0.5, 1.5]);

        let grads = model.backward(&x, &array![1.0, 2.0, 3.0]);
        assert_eq!(grads.weights, array![4.0, 5.0]);
        assert_eq!(grads.bias, 6.0);
    }

    #[test]
    fn test_fitted_predict_matches_forward() {
        let model = LinearRegression::from_params(params(array![1.0, 3.0], -2.0));
        let x = array![[1.0, 1.0], [2.0, 0.0]];
        let expected = model.forward(&x);
        let fitted = model.into_fitted();

        assert_eq!(fitted.predict_batch(&x), expected);
        assert_eq!(fitted.predict(&array![1.0, 1.0]), 2.0);
    }

    #[test]
    fn test_serializable_params_round_trip() {
        let fitted = LinearModel::<Fitted>::new(params(array![0.25, -4.0], 1.5));
        let restored = LinearModel::<Fitted>::from_params(fitted.extract_params());
        assert_eq!(restored.params(), fitted.params());
    }

    #[test]
    fn test_is_finite() {
        assert!(LinearParams::zeros(3).is_finite());
        assert!(!params(array![f64::NAN], 0.0).is_finite());
    }
}
