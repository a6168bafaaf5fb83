//! One-hot encoding for string categorical features.

use crate::preprocessing::encoding::HandleUnknown;
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Row-major categorical input: `data[row][column]`.
pub type CategoricalData = Vec<Vec<String>>;

/// One-hot encoder for string categories.
///
/// Each input column contributes one output column per distinct value seen
/// during fit, in sorted order.
///
/// # Example
/// ```ignore
/// let encoder = OneHotEncoder::new(); // HandleUnknown::Ignore
/// let fitted = encoder.fit(&vec![vec!["Pune".into()], vec!["Mumbai".into()]])?;
/// // categories: ["Mumbai", "Pune"]; an unseen city encodes as [0, 0]
/// ```
#[derive(Clone, Debug, Default)]
pub struct OneHotEncoder {
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }
}

/// Serializable parameters for a fitted OneHotEncoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoderParams {
    /// Sorted categories for each input column.
    pub categories: Vec<Vec<String>>,
    pub handle_unknown: HandleUnknown,
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug)]
pub struct FittedOneHotEncoder {
    categories: Vec<Vec<String>>,
    offsets: Vec<usize>,
    n_features_out: usize,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    fn build(categories: Vec<Vec<String>>, handle_unknown: HandleUnknown) -> Self {
        let mut offsets = Vec::with_capacity(categories.len());
        let mut total = 0;
        for cats in &categories {
            offsets.push(total);
            total += cats.len();
        }
        Self {
            categories,
            offsets,
            n_features_out: total,
            handle_unknown,
        }
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }
}

fn check_width(row: &[String], expected: usize) -> Result<(), PreprocessingError> {
    if row.len() != expected {
        return Err(PreprocessingError::FeatureMismatch {
            expected_features: expected,
            got_features: row.len(),
        });
    }
    Ok(())
}

impl Transformer for OneHotEncoder {
    type Input = CategoricalData;
    type Output = Array2<f64>;
    type Params = OneHotEncoderParams;
    type Fitted = FittedOneHotEncoder;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        let first = data.first().ok_or_else(|| {
            PreprocessingError::EmptyData("Cannot fit OneHotEncoder on empty data".to_string())
        })?;
        let cols = first.len();

        let mut seen: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); cols];
        for row in data {
            check_width(row, cols)?;
            for (set, value) in seen.iter_mut().zip(row) {
                set.insert(value.as_str());
            }
        }

        let categories = seen
            .into_iter()
            .map(|set| set.into_iter().map(str::to_string).collect())
            .collect();
        Ok(FittedOneHotEncoder::build(categories, self.handle_unknown))
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    type Input = CategoricalData;
    type Output = Array2<f64>;
    type Params = OneHotEncoderParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let mut out = Array2::<f64>::zeros((data.len(), self.n_features_out));
        for (r, row) in data.iter().enumerate() {
            check_width(row, self.categories.len())?;
            for (c, value) in row.iter().enumerate() {
                match self.categories[c].binary_search(value) {
                    Ok(idx) => out[[r, self.offsets[c] + idx]] = 1.0,
                    Err(_) if self.handle_unknown == HandleUnknown::Ignore => {}
                    Err(_) => {
                        return Err(PreprocessingError::UnknownCategory {
                            column: c,
                            value: value.clone(),
                        })
                    }
                }
            }
        }
        Ok(out)
    }

    fn extract_params(&self) -> Self::Params {
        OneHotEncoderParams {
            categories: self.categories.clone(),
            handle_unknown: self.handle_unknown,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.categories.iter().any(|c| !c.windows(2).all(|w| w[0] < w[1])) {
            return Err(PreprocessingError::InvalidParameter(
                "OneHotEncoder categories must be sorted and unique".to_string(),
            ));
        }
        Ok(Self::build(params.categories, params.handle_unknown))
    }

    fn n_features_in(&self) -> usize {
        self.categories.len()
    }

    fn n_features_out(&self) -> usize {
        self.n_features_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&[&str]]) -> CategoricalData {
        values
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_sorted_categories_and_layout() {
        let data = rows(&[&["Pune", "Low"], &["Mumbai", "High"], &["Pune", "High"]]);
        let fitted = OneHotEncoder::new().fit(&data).unwrap();

        assert_eq!(fitted.categories()[0], vec!["Mumbai", "Pune"]);
        assert_eq!(fitted.categories()[1], vec!["High", "Low"]);
        assert_eq!(fitted.n_features_in(), 2);
        assert_eq!(fitted.n_features_out(), 4);

        let out = fitted.transform(&data).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
        assert_eq!(out.row(1).to_vec(), vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_error() {
        let fitted = OneHotEncoder::new()
            .with_handle_unknown(HandleUnknown::Error)
            .fit(&rows(&[&["Pune"]]))
            .unwrap();
        let err = fitted.transform(&rows(&[&["Nagpur"]])).unwrap_err();
        assert!(matches!(err, PreprocessingError::UnknownCategory { column: 0, .. }));
    }

    #[test]
    fn test_unknown_category_ignored_by_default() {
        let fitted = OneHotEncoder::new()
            .fit(&rows(&[&["Pune", "A"], &["Mumbai", "B"]]))
            .unwrap();
        let out = fitted.transform(&rows(&[&["Nagpur", "B"]])).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let data = rows(&[&["a", "b"], &["c"]]);
        assert!(matches!(
            OneHotEncoder::new().fit(&data),
            Err(PreprocessingError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_fit_rejected() {
        assert!(OneHotEncoder::new().fit(&Vec::new()).is_err());
    }

    #[test]
    fn test_params_round_trip_and_validation() {
        let fitted = OneHotEncoder::new()
            .fit(&rows(&[&["b"], &["a"]]))
            .unwrap();
        let params = fitted.extract_params();
        let restored = FittedOneHotEncoder::from_params(params.clone()).unwrap();
        assert_eq!(restored.categories(), fitted.categories());

        let mut unsorted = params;
        unsorted.categories[0].reverse();
        assert!(FittedOneHotEncoder::from_params(unsorted).is_err());
    }
}
