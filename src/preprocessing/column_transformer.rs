//! ColumnTransformer over a [`FeatureFrame`].
//!
//! The numeric block runs through a [`Pipeline`], the categorical block
//! through a [`OneHotEncoder`]. Outputs are concatenated column-wise,
//! numeric first.

use crate::features::FeatureFrame;
use crate::preprocessing::encoding::{
    FittedOneHotEncoder, HandleUnknown, OneHotEncoder, OneHotEncoderParams,
};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::imputation::SimpleImputer;
use crate::preprocessing::pipeline::{FittedPipeline, Pipeline, PipelineParams};
use crate::preprocessing::scaling::StandardScaler;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};

/// # Example
/// ```ignore
/// let ct = ColumnTransformer::standard();
/// let fitted = ct.fit(&train_frame)?;
/// let x = fitted.transform(&test_frame)?;
/// ```
#[derive(Clone, Debug)]
pub struct ColumnTransformer {
    numeric: Pipeline,
    categorical: OneHotEncoder,
}

impl ColumnTransformer {
    pub fn new(numeric: Pipeline, categorical: OneHotEncoder) -> Self {
        Self {
            numeric,
            categorical,
        }
    }

    /// Median imputation and standardization for numerics; one-hot with
    /// unseen categories encoded as all zeros.
    pub fn standard() -> Self {
        Self::new(
            Pipeline::new()
                .add_imputer(SimpleImputer::new())
                .add_standard_scaler(StandardScaler::new()),
            OneHotEncoder::new().with_handle_unknown(HandleUnknown::Ignore),
        )
    }
}

impl Default for ColumnTransformer {
    fn default() -> Self {
        Self::standard()
    }
}

/// Serializable parameters for a fitted ColumnTransformer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformerParams {
    pub numeric: PipelineParams,
    pub categorical: OneHotEncoderParams,
}

/// Fitted ColumnTransformer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedColumnTransformer {
    numeric: FittedPipeline,
    categorical: FittedOneHotEncoder,
}

impl FittedColumnTransformer {
    pub fn numeric(&self) -> &FittedPipeline {
        &self.numeric
    }

    pub fn categorical(&self) -> &FittedOneHotEncoder {
        &self.categorical
    }
}

impl Transformer for ColumnTransformer {
    type Input = FeatureFrame;
    type Output = Array2<f64>;
    type Params = ColumnTransformerParams;
    type Fitted = FittedColumnTransformer;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.is_empty() {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit ColumnTransformer on empty data".to_string(),
            ));
        }
        let categorical = data.categorical().to_vec();
        Ok(FittedColumnTransformer {
            numeric: self.numeric.fit(data.numeric())?,
            categorical: self.categorical.fit(&categorical)?,
        })
    }
}

impl FittedTransformer for FittedColumnTransformer {
    type Input = FeatureFrame;
    type Output = Array2<f64>;
    type Params = ColumnTransformerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        let numeric = self.numeric.transform(data.numeric())?;
        let categorical = self.categorical.transform(&data.categorical().to_vec())?;
        concatenate(Axis(1), &[numeric.view(), categorical.view()]).map_err(|e| {
            PreprocessingError::InvalidShape {
                expected: format!("{} rows in both blocks", numeric.nrows()),
                got: e.to_string(),
            }
        })
    }

    fn extract_params(&self) -> Self::Params {
        ColumnTransformerParams {
            numeric: self.numeric.extract_params(),
            categorical: self.categorical.extract_params(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        Ok(Self {
            numeric: FittedPipeline::from_params(params.numeric)?,
            categorical: FittedOneHotEncoder::from_params(params.categorical)?,
        })
    }

    /// Numeric plus categorical input columns.
    fn n_features_in(&self) -> usize {
        self.numeric.n_features_in() + self.categorical.n_features_in()
    }

    fn n_features_out(&self) -> usize {
        self.numeric.n_features_out() + self.categorical.n_features_out()
    }
}
