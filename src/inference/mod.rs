//! Serving-side prediction.
//!
//! [`InferenceAdapter`] owns the two loaded artifacts and the
//! [`FeatureEngineer`] rebuilt from their reference year. A listing goes
//! through exactly the derivation used when the dataset was built, becomes a
//! one-row [`FeatureFrame`], and is scored by both pipelines.

pub mod report;

pub use report::InvestmentReport;

use crate::artifact::{PredictivePipeline, Task, TrainedArtifact, CLASSIFIER_FILE, REGRESSOR_FILE};
use crate::error::{AdvisorError, Result};
use crate::features::{FeatureEngineer, FeatureFrame};
use crate::schema::{RawListing, RawRecord};
use crate::training::DECISION_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const GOOD_LABEL: &str = "GOOD INVESTMENT";
pub const NOT_GOOD_LABEL: &str = "NOT A GOOD INVESTMENT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureValue {
    pub name: String,
    pub value: String,
}

/// Result of scoring one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub good_investment: bool,
    pub label: String,
    /// Probability of the good-investment class.
    pub probability: f64,
    /// Estimated price in lakhs five years from now.
    pub future_price: f64,
    /// The engineered feature vector in contract order.
    pub features: Vec<FeatureValue>,
}

impl Prediction {
    pub fn label_for(good_investment: bool) -> &'static str {
        if good_investment {
            GOOD_LABEL
        } else {
            NOT_GOOD_LABEL
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceAdapter {
    engineer: FeatureEngineer,
    classifier: PredictivePipeline,
    regressor: PredictivePipeline,
}

fn check_artifact(artifact: &TrainedArtifact, expected: Task) -> Result<PredictivePipeline> {
    artifact.contract.verify()?;
    if artifact.task != expected {
        return Err(AdvisorError::ContractViolation(format!(
            "expected a {expected} artifact, found {}",
            artifact.task
        )));
    }
    artifact.to_pipeline()
}

impl InferenceAdapter {
    /// Verify both artifacts against the compiled contract and each other.
    pub fn new(classifier: TrainedArtifact, regressor: TrainedArtifact) -> Result<Self> {
        if classifier.reference_year != regressor.reference_year {
            return Err(AdvisorError::ContractViolation(format!(
                "artifacts disagree on the reference year: {} vs {}",
                classifier.reference_year, regressor.reference_year
            )));
        }
        Ok(Self {
            engineer: FeatureEngineer::new(classifier.reference_year),
            classifier: check_artifact(&classifier, Task::Classification)?,
            regressor: check_artifact(&regressor, Task::Regression)?,
        })
    }

    /// Load both artifacts from a directory written by training.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        Self::new(
            TrainedArtifact::load(dir.join(CLASSIFIER_FILE))?,
            TrainedArtifact::load(dir.join(REGRESSOR_FILE))?,
        )
    }

    pub fn reference_year(&self) -> i32 {
        self.engineer.reference_year()
    }

    pub fn predict(&self, listing: &RawListing) -> Result<Prediction> {
        let features = self.engineer.engineer(listing)?;
        let frame = FeatureFrame::from_features(std::slice::from_ref(&features));

        let probability = first(self.classifier.predict(&frame)?.to_vec(), Task::Classification)?;
        let future_price = first(self.regressor.predict(&frame)?.to_vec(), Task::Regression)?;
        let good_investment = probability >= DECISION_THRESHOLD;
        debug!(city = %listing.city, probability, future_price, "scored listing");

        Ok(Prediction {
            good_investment,
            label: Prediction::label_for(good_investment).to_string(),
            probability,
            future_price,
            features: features
                .named_values()
                .into_iter()
                .map(|(name, value)| FeatureValue {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        })
    }

    pub fn predict_record(&self, record: &RawRecord) -> Result<Prediction> {
        self.predict(&RawListing::try_from_record(record, None)?)
    }

    /// Score a JSON object keyed by raw column names.
    pub fn predict_json(&self, request: &serde_json::Value) -> Result<Prediction> {
        self.predict_record(&RawRecord::from_json(request)?)
    }
}

fn first(values: Vec<f64>, task: Task) -> Result<f64> {
    values.into_iter().next().ok_or_else(|| {
        AdvisorError::ContractViolation(format!("{task} pipeline returned no prediction"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdvisorConfig;
    use crate::dataset::labeled::fixtures::labeled;
    use crate::schema::fixtures::{pune_listing, pune_record};
    use crate::schema::{CITY, SECURITY, SIZE_IN_SQFT};
    use crate::training::{TrainingOutcome, TrainingPipeline};
    use serde_json::json;

    fn trained(reference_year: i32) -> TrainingOutcome {
        let mut config = AdvisorConfig {
            reference_year,
            ..AdvisorConfig::default()
        };
        config.classifier.epochs = 30;
        config.regressor.epochs = 30;
        TrainingPipeline::new(config)
            .train(&labeled(80, reference_year))
            .unwrap()
    }

    fn adapter() -> InferenceAdapter {
        let outcome = trained(2025);
        InferenceAdapter::new(outcome.classifier, outcome.regressor).unwrap()
    }

    #[test]
    fn test_predict_known_listing() {
        let prediction = adapter().predict(&pune_listing()).unwrap();
        assert!((0.0..=1.0).contains(&prediction.probability));
        assert_eq!(prediction.good_investment, prediction.probability >= 0.5);
        assert_eq!(prediction.label, Prediction::label_for(prediction.good_investment));
        assert!(prediction.future_price.is_finite());
        assert_eq!(prediction.features.len(), 29);
        assert_eq!(prediction.features[3].name, "Price_per_SqFt");
        assert_eq!(prediction.features[3].value, "8000");
    }

    #[test]
    fn test_unknown_city_is_tolerated() {
        let mut listing = pune_listing();
        listing.city = "Atlantis".into();
        listing.facing = "Up".into();
        listing.security = None;
        let prediction = adapter().predict(&listing).unwrap();
        assert!(prediction.probability.is_finite());
        assert!(prediction.future_price.is_finite());
    }

    #[test]
    fn test_predict_json_accepts_numeric_strings_and_numbers() {
        let adapter = adapter();
        let mut request = json!({});
        for (column, value) in pune_record().iter() {
            request[column] = json!(value);
        }
        request[SIZE_IN_SQFT] = json!(1000);
        request[SECURITY] = serde_json::Value::Null;

        let from_json = adapter.predict_json(&request).unwrap();
        let mut listing = pune_listing();
        listing.security = None;
        assert_eq!(from_json, adapter.predict(&listing).unwrap());
    }

    #[test]
    fn test_invalid_request_reports_field() {
        let adapter = adapter();
        let record = pune_record().with(SIZE_IN_SQFT, "big");
        match adapter.predict_record(&record) {
            Err(AdvisorError::InvalidRecord { field, .. }) => assert_eq!(field, SIZE_IN_SQFT),
            other => panic!("expected InvalidRecord, got {other:?}"),
        }

        let mut record = pune_record();
        record.set(CITY, "");
        assert!(matches!(
            adapter.predict_record(&record),
            Err(AdvisorError::InvalidRecord { .. })
        ));
        assert!(adapter.predict_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_reference_year_mismatch_rejected() {
        let a = trained(2025);
        let b = trained(2030);
        assert!(matches!(
            InferenceAdapter::new(a.classifier, b.regressor.clone()),
            Err(AdvisorError::ContractViolation(_))
        ));
        let adapter = InferenceAdapter::new(b.classifier, b.regressor).unwrap();
        assert_eq!(adapter.reference_year(), 2030);
    }

    #[test]
    fn test_swapped_or_foreign_artifacts_rejected() {
        let outcome = trained(2025);
        assert!(InferenceAdapter::new(outcome.regressor.clone(), outcome.classifier.clone()).is_err());

        let mut foreign = outcome.classifier.clone();
        foreign.contract.fingerprint ^= 1;
        assert!(matches!(
            InferenceAdapter::new(foreign, outcome.regressor),
            Err(AdvisorError::ContractViolation(_))
        ));
    }

    #[test]
    fn test_from_dir() {
        let outcome = trained(2025);
        let dir = tempfile::tempdir().unwrap();
        outcome.save(dir.path()).unwrap();
        let adapter = InferenceAdapter::from_dir(dir.path()).unwrap();
        assert_eq!(adapter.reference_year(), 2025);
        assert!(adapter.predict(&pune_listing()).is_ok());
    }

    #[test]
    fn test_adapter_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InferenceAdapter>();
    }
}
