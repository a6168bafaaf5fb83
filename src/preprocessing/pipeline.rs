//! Pipeline for chaining numeric transformers.
//!
//! The output of each step feeds the next.
//!
//! # Example
//! ```ignore
//! let pipeline = Pipeline::new()
//!     .add_imputer(SimpleImputer::new())
//!     .add_standard_scaler(StandardScaler::new());
//! let fitted = pipeline.fit(&data)?;
//! ```

use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::imputation::{FittedSimpleImputer, SimpleImputer, SimpleImputerParams};
use crate::preprocessing::scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// An unfitted pipeline step.
#[derive(Clone, Debug)]
pub enum PipelineStep {
    SimpleImputer(SimpleImputer),
    StandardScaler(StandardScaler),
}

/// A fitted pipeline step.
#[derive(Clone, Debug)]
pub enum FittedPipelineStep {
    SimpleImputer(FittedSimpleImputer),
    StandardScaler(FittedStandardScaler),
}

/// Serialized form of a fitted step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StepParams {
    SimpleImputer(SimpleImputerParams),
    StandardScaler(StandardScalerParams),
}

impl PipelineStep {
    fn fit(&self, data: &Array2<f64>) -> Result<FittedPipelineStep, PreprocessingError> {
        match self {
            PipelineStep::SimpleImputer(t) => t.fit(data).map(FittedPipelineStep::SimpleImputer),
            PipelineStep::StandardScaler(t) => t.fit(data).map(FittedPipelineStep::StandardScaler),
        }
    }
}

impl FittedPipelineStep {
    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, PreprocessingError> {
        match self {
            FittedPipelineStep::SimpleImputer(t) => t.transform(data),
            FittedPipelineStep::StandardScaler(t) => t.transform(data),
        }
    }

    pub fn step_name(&self) -> &'static str {
        match self {
            FittedPipelineStep::SimpleImputer(_) => "SimpleImputer",
            FittedPipelineStep::StandardScaler(_) => "StandardScaler",
        }
    }

    fn n_features_in(&self) -> usize {
        match self {
            FittedPipelineStep::SimpleImputer(t) => t.n_features_in(),
            FittedPipelineStep::StandardScaler(t) => t.n_features_in(),
        }
    }

    fn params(&self) -> StepParams {
        match self {
            FittedPipelineStep::SimpleImputer(t) => StepParams::SimpleImputer(t.extract_params()),
            FittedPipelineStep::StandardScaler(t) => StepParams::StandardScaler(t.extract_params()),
        }
    }

    fn from_step_params(params: StepParams) -> Result<Self, PreprocessingError> {
        Ok(match params {
            StepParams::SimpleImputer(p) => {
                FittedPipelineStep::SimpleImputer(FittedSimpleImputer::from_params(p)?)
            }
            StepParams::StandardScaler(p) => {
                FittedPipelineStep::StandardScaler(FittedStandardScaler::from_params(p)?)
            }
        })
    }
}

/// Serializable representation of a fitted pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub steps: Vec<StepParams>,
    pub n_features: usize,
}

/// Pipeline transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_imputer(mut self, imputer: SimpleImputer) -> Self {
        self.steps.push(PipelineStep::SimpleImputer(imputer));
        self
    }

    pub fn add_standard_scaler(mut self, scaler: StandardScaler) -> Self {
        self.steps.push(PipelineStep::StandardScaler(scaler));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Transformer for Pipeline {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = PipelineParams;
    type Fitted = FittedPipeline;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        if data.nrows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit Pipeline on empty data".to_string(),
            ));
        }

        let mut fitted_steps = Vec::with_capacity(self.steps.len());
        let mut current = data.clone();
        for step in &self.steps {
            let fitted = step.fit(&current)?;
            current = fitted.transform(&current)?;
            fitted_steps.push(fitted);
        }

        Ok(FittedPipeline {
            steps: fitted_steps,
            n_features: data.ncols(),
        })
    }
}

/// Fitted pipeline ready for inference.
#[derive(Clone, Debug)]
pub struct FittedPipeline {
    steps: Vec<FittedPipelineStep>,
    n_features: usize,
}

impl FittedPipeline {
    pub fn steps(&self) -> &[FittedPipelineStep] {
        &self.steps
    }
}

impl FittedTransformer for FittedPipeline {
    type Input = Array2<f64>;
    type Output = Array2<f64>;
    type Params = PipelineParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        if data.ncols() != self.n_features {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.n_features,
                got_features: data.ncols(),
            });
        }
        self.steps
            .iter()
            .try_fold(data.clone(), |current, step| step.transform(&current))
    }

    fn extract_params(&self) -> Self::Params {
        PipelineParams {
            steps: self.steps.iter().map(FittedPipelineStep::params).collect(),
            n_features: self.n_features,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        let steps = params
            .steps
            .into_iter()
            .map(FittedPipelineStep::from_step_params)
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(bad) = steps.iter().find(|s| s.n_features_in() != params.n_features) {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: params.n_features,
                got_features: bad.n_features_in(),
            });
        }
        Ok(Self {
            steps,
            n_features: params.n_features,
        })
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }
}
