//! Training of the good-investment classifier and the future-price regressor.
//!
//! [`TrainingPipeline::train`] re-verifies feature parity on the labeled
//! dataset, optionally subsamples it, splits it, fits preprocessing on the
//! training rows only, trains both estimators and evaluates them on the
//! held-out rows.

pub mod report;
pub mod split;

pub use report::{TaskReport, TrainingReport};
pub use split::{stratified_split, subsample, train_test_split, Split};

use crate::artifact::{
    EstimatorKind, FittedEstimator, PredictivePipeline, Task, TrainedArtifact, CLASSIFIER_FILE,
    REGRESSOR_FILE, REPORT_FILE,
};
use crate::config::{AdvisorConfig, SgdConfig};
use crate::dataset::{InMemoryDataset, LabeledDataset};
use crate::error::{AdvisorError, Result};
use crate::features::{contract_fingerprint, FeatureEngineer, FeatureFrame};
use crate::loss::{BCEWithLogitsLoss, Loss, MSELoss};
use crate::metrics::{ClassificationMetrics, RegressionMetrics};
use crate::model::{LinearParams, LinearRegression, LogisticRegression, TrainableModel};
use crate::optimizer::SGD;
use crate::preprocessing::{ColumnTransformer, FittedTransformer, Transformer};
use crate::regularizers::{NoRegularizer, Regularizer, L2};
use crate::trainer::Trainer;
use ndarray::{Array1, Array2};
use std::path::Path;
use tracing::info;

/// Probability at or above which a listing is predicted a good investment.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// A model family that can be fitted on preprocessed input.
pub trait Estimator {
    fn kind(&self) -> EstimatorKind;

    /// Fit on `x`/`y`, returning the model and the per-epoch training loss.
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(FittedEstimator, Vec<f64>)>;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn task(&self) -> Task {
        self.kind().task()
    }
}

fn run_sgd<L, M, R>(
    config: &SgdConfig,
    loss: L,
    regularizer: R,
    model: M,
    dataset: &InMemoryDataset,
) -> Result<(M::Output, Vec<f64>)>
where
    L: Loss<Prediction = Array1<f64>, Target = Array1<f64>>,
    M: TrainableModel<
        Input = Array2<f64>,
        Prediction = Array1<f64>,
        Params = LinearParams,
        Gradients = LinearParams,
    >,
    R: Regularizer<M>,
{
    Trainer::builder(loss, SGD::new(config.learning_rate), regularizer)
        .batch_size(config.batch_size)
        .max_epochs(config.epochs)
        .build()
        .fit_with_history(model, dataset)
}

/// Logistic regression trained with BCE-with-logits and SGD.
#[derive(Debug, Clone)]
pub struct SgdLogisticClassifier {
    config: SgdConfig,
}

impl SgdLogisticClassifier {
    pub fn new(config: SgdConfig) -> Self {
        Self { config }
    }
}

impl Estimator for SgdLogisticClassifier {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::SgdLogisticRegression
    }

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(FittedEstimator, Vec<f64>)> {
        let dataset = InMemoryDataset::new(x.clone(), y.clone())?;
        let model = LogisticRegression::new(x.ncols());
        let (fitted, history) = if self.config.l2 > 0.0 {
            let l2 = L2::new(self.config.l2);
            run_sgd(&self.config, BCEWithLogitsLoss, l2, model, &dataset)?
        } else {
            run_sgd(&self.config, BCEWithLogitsLoss, NoRegularizer, model, &dataset)?
        };
        Ok((FittedEstimator::Logistic(fitted), history))
    }
}

/// Linear regression trained with MSE and SGD.
#[derive(Debug, Clone)]
pub struct SgdLinearRegressor {
    config: SgdConfig,
}

impl SgdLinearRegressor {
    pub fn new(config: SgdConfig) -> Self {
        Self { config }
    }
}

impl Estimator for SgdLinearRegressor {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::SgdLinearRegression
    }

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(FittedEstimator, Vec<f64>)> {
        let dataset = InMemoryDataset::new(x.clone(), y.clone())?;
        let model = LinearRegression::new(x.ncols());
        let (fitted, history) = if self.config.l2 > 0.0 {
            let l2 = L2::new(self.config.l2);
            run_sgd(&self.config, MSELoss, l2, model, &dataset)?
        } else {
            run_sgd(&self.config, MSELoss, NoRegularizer, model, &dataset)?
        };
        Ok((FittedEstimator::Linear(fitted), history))
    }
}

/// Artifacts and report of one training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub classifier: TrainedArtifact,
    pub regressor: TrainedArtifact,
    pub report: TrainingReport,
}

impl TrainingOutcome {
    /// Write both artifacts and the JSON report into `dir`.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        self.classifier.save(dir.join(CLASSIFIER_FILE))?;
        self.regressor.save(dir.join(REGRESSOR_FILE))?;
        self.report.save(dir.join(REPORT_FILE))?;
        info!(dir = %dir.display(), "artifacts written");
        Ok(())
    }
}

struct FittedTask {
    pipeline: PredictivePipeline,
    test_predictions: Array1<f64>,
    final_loss: f64,
}

pub struct TrainingPipeline {
    config: AdvisorConfig,
    classifier: Box<dyn Estimator>,
    regressor: Box<dyn Estimator>,
}

impl TrainingPipeline {
    /// SGD logistic classifier and SGD linear regressor from `config`.
    pub fn new(config: AdvisorConfig) -> Self {
        let classifier = Box::new(SgdLogisticClassifier::new(config.classifier.clone()));
        let regressor = Box::new(SgdLinearRegressor::new(config.regressor.clone()));
        Self {
            config,
            classifier,
            regressor,
        }
    }

    /// Swap in other estimators; each must match its task.
    pub fn with_estimators(
        config: AdvisorConfig,
        classifier: Box<dyn Estimator>,
        regressor: Box<dyn Estimator>,
    ) -> Result<Self> {
        if classifier.task() != Task::Classification || regressor.task() != Task::Regression {
            return Err(AdvisorError::Config(format!(
                "estimators {} / {} do not match classification / regression",
                classifier.name(),
                regressor.name()
            )));
        }
        Ok(Self {
            config,
            classifier,
            regressor,
        })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn train(&self, dataset: &LabeledDataset) -> Result<TrainingOutcome> {
        let config = &self.config;
        config.validate()?;
        if dataset.is_empty() {
            return Err(AdvisorError::EmptyDataset("labeled dataset has no rows".into()));
        }

        let engineer = FeatureEngineer::new(config.reference_year);
        dataset.verify_parity(&engineer)?;
        info!(rows = dataset.len(), "feature parity verified");

        let sampled;
        let data = match config.max_rows {
            Some(max) if max < dataset.len() => {
                sampled = dataset.subset(&subsample(dataset.len(), max, config.seed));
                info!(rows = sampled.len(), of = dataset.len(), "subsampled");
                &sampled
            }
            _ => dataset,
        };

        let frame = FeatureFrame::from_features(&data.features());
        let labels: Vec<bool> = data.rows().iter().map(|r| r.labels.good_investment).collect();
        let prices: Vec<f64> = data.rows().iter().map(|r| r.labels.future_price).collect();

        let class_split = stratified_split(&labels, config.test_size, config.seed)?;
        let targets: Vec<f64> = labels.iter().map(|&g| if g { 1.0 } else { 0.0 }).collect();
        let classifier = fit_task(self.classifier.as_ref(), &frame, &targets, &class_split)?;
        let actual: Vec<bool> = class_split.test.iter().map(|&i| labels[i]).collect();
        let predicted: Vec<bool> = classifier
            .test_predictions
            .iter()
            .map(|&p| p >= DECISION_THRESHOLD)
            .collect();
        let class_metrics = ClassificationMetrics::compute(&actual, &predicted);
        info!(
            accuracy = class_metrics.accuracy,
            f1 = class_metrics.f1,
            "classifier evaluated"
        );

        let reg_split = train_test_split(data.len(), config.test_size, config.seed)?;
        let regressor = fit_task(self.regressor.as_ref(), &frame, &prices, &reg_split)?;
        let actual_prices: Vec<f64> = reg_split.test.iter().map(|&i| prices[i]).collect();
        let reg_metrics =
            RegressionMetrics::compute(&actual_prices, &regressor.test_predictions.to_vec());
        info!(rmse = reg_metrics.rmse, r2 = reg_metrics.r2, "regressor evaluated");

        let report = TrainingReport {
            dataset_rows: dataset.len(),
            rows_used: data.len(),
            reference_year: config.reference_year,
            seed: config.seed,
            test_size: config.test_size,
            contract_fingerprint: format!("{:016x}", contract_fingerprint()),
            trained_at: None,
            classifier: TaskReport {
                estimator: self.classifier.name().to_string(),
                train_rows: class_split.train.len(),
                test_rows: class_split.test.len(),
                final_loss: classifier.final_loss,
                metrics: class_metrics,
            },
            regressor: TaskReport {
                estimator: self.regressor.name().to_string(),
                train_rows: reg_split.train.len(),
                test_rows: reg_split.test.len(),
                final_loss: regressor.final_loss,
                metrics: reg_metrics,
            },
        };

        Ok(TrainingOutcome {
            classifier: TrainedArtifact::new(&classifier.pipeline, config.reference_year),
            regressor: TrainedArtifact::new(&regressor.pipeline, config.reference_year),
            report,
        })
    }
}

/// Fit preprocessing and `estimator` on the train rows, predict the test rows.
fn fit_task(
    estimator: &dyn Estimator,
    frame: &FeatureFrame,
    targets: &[f64],
    split: &Split,
) -> Result<FittedTask> {
    let train = frame.select(&split.train);
    let preprocessor = ColumnTransformer::standard().fit(&train)?;
    let x_train = preprocessor.transform(&train)?;
    let y_train: Array1<f64> = split.train.iter().map(|&i| targets[i]).collect();

    info!(
        estimator = estimator.name(),
        rows = x_train.nrows(),
        inputs = x_train.ncols(),
        "fitting"
    );
    let (model, history) = estimator.fit(&x_train, &y_train)?;
    let pipeline = PredictivePipeline::new(preprocessor, model)?;
    let test_predictions = pipeline.predict(&frame.select(&split.test))?;

    Ok(FittedTask {
        pipeline,
        test_predictions,
        final_loss: history.last().copied().unwrap_or(f64::NAN),
    })
}
