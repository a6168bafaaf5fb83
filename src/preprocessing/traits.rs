//! Core traits for preprocessing transformers.
//!
//! - [`Transformer`]: unfitted, holds hyperparameters and learns from data.
//! - [`FittedTransformer`]: holds learned state and transforms; its params
//!   are embedded in trained artifacts.

use crate::preprocessing::error::PreprocessingError;
use crate::serialization::SerializableParams;

/// Trait for unfitted transformers with hyperparameters.
///
/// # Example
/// ```ignore
/// use realty_advisor::preprocessing::{StandardScaler, Transformer};
///
/// let fitted = StandardScaler::new().fit(&train)?;
/// let scaled = fitted.transform(&test)?;
/// ```
pub trait Transformer: Clone {
    type Input;
    type Output;
    type Params: SerializableParams;
    type Fitted: FittedTransformer<Params = Self::Params, Input = Self::Input, Output = Self::Output>;

    /// Learn parameters from training data.
    ///
    /// # Errors
    /// [`PreprocessingError::EmptyData`] when there are no rows.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError>;

    fn fit_transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        self.fit(data)?.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// `extract_params()` followed by `from_params()` is a round trip.
pub trait FittedTransformer: Clone {
    type Input;
    type Output;
    type Params: SerializableParams;

    /// Transform data using learned parameters.
    ///
    /// # Errors
    /// [`PreprocessingError::FeatureMismatch`] if the column count differs from fit.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError>;

    fn extract_params(&self) -> Self::Params;

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError>
    where
        Self: Sized;

    /// Number of input columns seen during fit.
    fn n_features_in(&self) -> usize;

    /// Number of output columns.
    fn n_features_out(&self) -> usize {
        self.n_features_in()
    }
}
