//! Estimator models with compile-time training state.
//!
//! A model starts as `Model<Unfitted>` and is driven by the
//! [`Trainer`](crate::trainer::Trainer) through [`TrainableModel`]. Once
//! trained it becomes `Model<Fitted>`, which only implements
//! [`InferenceModel`].

pub mod linear;
pub mod logistic;
pub mod state;

pub use linear::{LinearModel, LinearParams, LinearRegression, SerializableLinearParams};
pub use logistic::{sigmoid, LogisticModel, LogisticRegression};
pub use state::{Fitted, Unfitted};

/// Training-side interface used by the trainer loop.
pub trait TrainableModel {
    type Input;
    type Prediction;
    type Params;
    type Gradients;
    type Output;

    fn forward(&self, input: &Self::Input) -> Self::Prediction;

    /// Gradients of the loss w.r.t. parameters, given `dL/dprediction`.
    fn backward(&self, input: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients;

    fn params(&self) -> &Self::Params;

    fn update_params(&mut self, new_params: &Self::Params);

    fn into_fitted(self) -> Self::Output;
}

/// Arithmetic an optimizer needs on a parameter set.
pub trait ParamOps: Clone {
    fn add(&self, other: &Self) -> Self;
    fn scale(&self, factor: f64) -> Self;
}

/// Prediction-side interface of a trained model.
pub trait InferenceModel {
    type InputSingle: ?Sized;
    type OutputSingle;
    type InputBatch;
    type OutputBatch;
    type ParamsRepr;

    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle;

    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch;

    fn extract_params(&self) -> Self::ParamsRepr;

    fn from_params(params: Self::ParamsRepr) -> Self
    where
        Self: Sized;
}
