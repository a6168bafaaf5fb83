//! # realty_advisor
//!
//! Real-estate investment scoring on a small, explicit ML stack.
//!
//! The crate covers the whole path from a raw listings CSV to served
//! predictions:
//!
//! - [`dataset::DatasetPipeline`] deduplicates and cleans raw rows, derives
//!   features with [`FeatureEngineer`], labels every row with
//!   [`TargetGenerator`] and persists the result.
//! - [`TrainingPipeline`] fits a column transformer plus an SGD logistic
//!   classifier ("good investment") and an SGD linear regressor (5-year
//!   price), evaluates both and emits [`TrainedArtifact`]s.
//! - [`InferenceAdapter`] reloads the artifacts and scores single listings
//!   with the exact feature derivation used at training time.
//!
//! The learning pieces follow a type-state design: models are either
//! [`model::Unfitted`] or [`model::Fitted`], and only fitted models expose
//! inference.
//!
//! ```no_run
//! use realty_advisor::{AdvisorConfig, InferenceAdapter, LabeledDataset, TrainingPipeline};
//!
//! # fn main() -> realty_advisor::Result<()> {
//! let dataset = LabeledDataset::load("labeled_listings.csv")?;
//! let outcome = TrainingPipeline::new(AdvisorConfig::default()).train(&dataset)?;
//! outcome.save("models")?;
//!
//! let adapter = InferenceAdapter::from_dir("models")?;
//! let request = serde_json::json!({"City": "Pune", "BHK": 3});
//! match adapter.predict_json(&request) {
//!     Ok(prediction) => println!("{}", prediction.label),
//!     Err(err) => eprintln!("{err}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod inference;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod optimizer;
pub mod preprocessing;
pub mod regularizers;
pub mod schema;
pub mod serialization;
pub mod targets;
pub mod trainer;
pub mod training;

pub use artifact::{PredictivePipeline, TrainedArtifact};
pub use config::{AdvisorConfig, SgdConfig};
pub use dataset::{DatasetPipeline, DatasetSummary, LabeledDataset};
pub use error::{AdvisorError, Result};
pub use features::{EngineeredFeatures, FeatureContract, FeatureEngineer, FeatureFrame};
pub use inference::{InferenceAdapter, InvestmentReport, Prediction};
pub use metrics::{ClassificationMetrics, RegressionMetrics};
pub use schema::{RawListing, RawRecord};
pub use targets::{CityAggregates, Labels, TargetGenerator};
pub use trainer::{Trainer, TrainerBuilder};
pub use training::{Estimator, TrainingOutcome, TrainingPipeline, TrainingReport};
