//! Crate-level error type.
//!
//! Batch callers decide per variant whether to skip a row or abort: only
//! [`AdvisorError::InvalidRecord`] is row-local.

use crate::preprocessing::error::PreprocessingError;
use thiserror::Error;

/// Errors raised by the dataset, training and serving paths.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Input file lacks one or more required columns.
    #[error("schema error: missing required columns {missing:?}")]
    Schema { missing: Vec<String> },

    /// A single record is malformed; carries the offending field.
    #[error("invalid record{}: field `{field}` {reason}", row_suffix(.row))]
    InvalidRecord {
        row: Option<usize>,
        field: String,
        reason: String,
    },

    /// Labeling saw a city that has no aggregate statistics.
    #[error("no city aggregates for `{city}`")]
    MissingAggregate { city: String },

    /// Training/serving feature layout or derivation drifted.
    #[error("feature contract violation: {0}")]
    ContractViolation(String),

    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Optimization could not produce a usable model.
    #[error("training failed: {0}")]
    Training(String),

    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl AdvisorError {
    /// Shorthand for a field-level record error.
    pub fn invalid(row: Option<usize>, field: &str, reason: impl Into<String>) -> Self {
        AdvisorError::InvalidRecord {
            row,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach a row index to a record error that was raised without one.
    pub fn at_row(self, index: usize) -> Self {
        match self {
            AdvisorError::InvalidRecord {
                row: None,
                field,
                reason,
            } => AdvisorError::InvalidRecord {
                row: Some(index),
                field,
                reason,
            },
            other => other,
        }
    }

    /// True for errors that only affect one record of a batch.
    pub fn is_row_local(&self) -> bool {
        matches!(self, AdvisorError::InvalidRecord { .. })
    }
}

fn row_suffix(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {r}")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
