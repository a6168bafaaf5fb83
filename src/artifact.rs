//! Persisted prediction pipelines.
//!
//! A [`TrainedArtifact`] bundles the fitted column transformer, the fitted
//! estimator and everything needed to rebuild identical model input at
//! serving time: the feature-contract snapshot and the reference year used
//! to derive `Age_of_Property`. Artifacts are written once with bincode and
//! never mutated.

use crate::error::{AdvisorError, Result};
use crate::features::{FeatureContract, FeatureFrame};
use crate::model::{Fitted, InferenceModel, LinearModel, LogisticModel, SerializableLinearParams};
use crate::preprocessing::{ColumnTransformerParams, FittedColumnTransformer, FittedTransformer};
use crate::serialization::SerializableParams;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

pub const CLASSIFIER_FILE: &str = "good_investment_classifier.bin";
pub const REGRESSOR_FILE: &str = "future_price_regressor.bin";
pub const REPORT_FILE: &str = "training_report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    Classification,
    Regression,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Task::Classification => "classification",
            Task::Regression => "regression",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimatorKind {
    SgdLogisticRegression,
    SgdLinearRegression,
}

impl EstimatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            EstimatorKind::SgdLogisticRegression => "sgd_logistic_regression",
            EstimatorKind::SgdLinearRegression => "sgd_linear_regression",
        }
    }

    pub fn task(&self) -> Task {
        match self {
            EstimatorKind::SgdLogisticRegression => Task::Classification,
            EstimatorKind::SgdLinearRegression => Task::Regression,
        }
    }
}

/// A trained estimator of any supported kind.
#[derive(Debug, Clone)]
pub enum FittedEstimator {
    Logistic(LogisticModel<Fitted>),
    Linear(LinearModel<Fitted>),
}

impl FittedEstimator {
    pub fn kind(&self) -> EstimatorKind {
        match self {
            FittedEstimator::Logistic(_) => EstimatorKind::SgdLogisticRegression,
            FittedEstimator::Linear(_) => EstimatorKind::SgdLinearRegression,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            FittedEstimator::Logistic(m) => m.params().n_features(),
            FittedEstimator::Linear(m) => m.params().n_features(),
        }
    }

    /// Probabilities for classifiers, values for regressors.
    pub fn predict_batch(&self, x: &Array2<f64>) -> Array1<f64> {
        match self {
            FittedEstimator::Logistic(m) => m.predict_batch(x),
            FittedEstimator::Linear(m) => m.predict_batch(x),
        }
    }

    fn extract_params(&self) -> SerializableLinearParams {
        match self {
            FittedEstimator::Logistic(m) => m.extract_params(),
            FittedEstimator::Linear(m) => m.extract_params(),
        }
    }

    fn from_params(kind: EstimatorKind, params: SerializableLinearParams) -> Self {
        match kind {
            EstimatorKind::SgdLogisticRegression => {
                FittedEstimator::Logistic(LogisticModel::<Fitted>::from_params(params))
            }
            EstimatorKind::SgdLinearRegression => {
                FittedEstimator::Linear(LinearModel::<Fitted>::from_params(params))
            }
        }
    }
}

/// Fitted preprocessing followed by a fitted estimator.
#[derive(Debug, Clone)]
pub struct PredictivePipeline {
    preprocessor: FittedColumnTransformer,
    model: FittedEstimator,
}

impl PredictivePipeline {
    /// Fails when the estimator width differs from the preprocessor output.
    pub fn new(preprocessor: FittedColumnTransformer, model: FittedEstimator) -> Result<Self> {
        if preprocessor.n_features_out() != model.n_features() {
            return Err(AdvisorError::ContractViolation(format!(
                "estimator expects {} inputs but preprocessing yields {}",
                model.n_features(),
                preprocessor.n_features_out()
            )));
        }
        Ok(Self {
            preprocessor,
            model,
        })
    }

    pub fn preprocessor(&self) -> &FittedColumnTransformer {
        &self.preprocessor
    }

    pub fn model(&self) -> &FittedEstimator {
        &self.model
    }

    pub fn predict(&self, frame: &FeatureFrame) -> Result<Array1<f64>> {
        let x = self.preprocessor.transform(frame)?;
        Ok(self.model.predict_batch(&x))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedArtifact {
    pub format_version: u32,
    pub task: Task,
    pub estimator: EstimatorKind,
    pub contract: FeatureContract,
    pub reference_year: i32,
    pub preprocessor: ColumnTransformerParams,
    pub model: SerializableLinearParams,
}

impl TrainedArtifact {
    pub fn new(pipeline: &PredictivePipeline, reference_year: i32) -> Self {
        let estimator = pipeline.model.kind();
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            task: estimator.task(),
            estimator,
            contract: FeatureContract::current(),
            reference_year,
            preprocessor: pipeline.preprocessor.extract_params(),
            model: pipeline.model.extract_params(),
        }
    }

    /// Rebuild the executable pipeline.
    pub fn to_pipeline(&self) -> Result<PredictivePipeline> {
        if self.estimator.task() != self.task {
            return Err(AdvisorError::ContractViolation(format!(
                "estimator {} cannot serve a {} task",
                self.estimator.name(),
                self.task
            )));
        }
        let preprocessor = FittedColumnTransformer::from_params(self.preprocessor.clone())?;
        let model = FittedEstimator::from_params(self.estimator, self.model.clone());
        PredictivePipeline::new(preprocessor, model)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let artifact = Self::from_bytes(&bytes)?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(AdvisorError::ContractViolation(format!(
                "artifact format version {} is not supported (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        Ok(artifact)
    }
}
