//! Categorical feature encoding.

mod one_hot;

pub use one_hot::{CategoricalData, FittedOneHotEncoder, OneHotEncoder, OneHotEncoderParams};

/// Strategy for handling unknown categories during transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum HandleUnknown {
    /// Raise an error when unknown categories are encountered.
    Error,
    /// Encode unknown categories as all zeros.
    #[default]
    Ignore,
}
