//! Errors raised while fitting or applying transformers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// Rows or columns disagree with what the operation needs.
    #[error("Invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Only raised when the encoder is built with `HandleUnknown::Error`.
    #[error("Unknown category {value:?} in column {column}")]
    UnknownCategory { column: usize, value: String },

    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Column count differs from the one seen during fit.
    #[error("Feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category_names_value_and_column() {
        let err = PreprocessingError::UnknownCategory {
            column: 1,
            value: "Nagpur".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown category \"Nagpur\" in column 1");
    }

    #[test]
    fn test_feature_mismatch_message() {
        let err = PreprocessingError::FeatureMismatch {
            expected_features: 18,
            got_features: 17,
        };
        assert!(err.to_string().contains("expected 18 features, got 17"));
    }

    #[test]
    fn test_wraps_into_advisor_error() {
        let err: crate::error::AdvisorError = PreprocessingError::EmptyData("no rows".into()).into();
        assert_eq!(err.to_string(), "Empty data: no rows");
    }
}
