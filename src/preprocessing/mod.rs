//! Model-input preprocessing.
//!
//! Transformers follow a fit/transform split:
//!
//! - [`Transformer`]: unfitted, holds hyperparameters
//! - [`FittedTransformer`]: learned state, serializable through its params
//!
//! The model input is built by [`ColumnTransformer`], which imputes and
//! standardizes the numeric block and one-hot encodes the categorical block.
//! It is fitted on the training split only and stored inside the artifact.

pub mod column_transformer;
pub mod encoding;
pub mod error;
pub mod imputation;
pub mod pipeline;
pub mod scaling;
pub mod traits;

pub use column_transformer::{ColumnTransformer, ColumnTransformerParams, FittedColumnTransformer};
pub use encoding::{
    CategoricalData, FittedOneHotEncoder, HandleUnknown, OneHotEncoder, OneHotEncoderParams,
};
pub use error::PreprocessingError;
pub use imputation::{FittedSimpleImputer, SimpleImputer, SimpleImputerParams};
pub use pipeline::{FittedPipeline, Pipeline, PipelineParams, PipelineStep, StepParams};
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
pub use traits::{FittedTransformer, Transformer};
