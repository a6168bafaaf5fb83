//! Mini-batch training loop.

use crate::dataset::Dataset;
use crate::error::{AdvisorError, Result};
use crate::loss::Loss;
use crate::model::{ParamOps, TrainableModel};
use crate::optimizer::Optimizer;
use crate::regularizers::Regularizer;
use ndarray::{Array1, Array2};
use std::marker::PhantomData;
use tracing::{debug, info};

/// Drives a [`TrainableModel`] with a loss, an optimizer and a regularizer.
///
/// Immutable once built; the same trainer can fit several models of the
/// same type.
pub struct Trainer<L, O, M, R> {
    pub(crate) batch_size: usize,
    pub(crate) max_epochs: usize,
    pub(crate) verbose: bool,
    pub(crate) loss_fn: L,
    pub(crate) optimizer: O,
    pub(crate) regularizer: R,
    _model: PhantomData<fn() -> M>,
}

/// Builder for [`Trainer`].
///
/// Defaults: `batch_size` 32, `max_epochs` 1000, `verbose` true.
pub struct TrainerBuilder<L, O, M, R> {
    batch_size: usize,
    max_epochs: usize,
    verbose: bool,
    loss_fn: L,
    optimizer: O,
    regularizer: R,
    _model: PhantomData<fn() -> M>,
}

impl<L, O, M, R> TrainerBuilder<L, O, M, R> {
    pub fn new(loss_fn: L, optimizer: O, regularizer: R) -> Self {
        Self {
            batch_size: 32,
            max_epochs: 1000,
            verbose: true,
            loss_fn,
            optimizer,
            regularizer,
            _model: PhantomData,
        }
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    /// When false, per-epoch losses are not logged.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> Trainer<L, O, M, R> {
        Trainer {
            batch_size: self.batch_size,
            max_epochs: self.max_epochs,
            verbose: self.verbose,
            loss_fn: self.loss_fn,
            optimizer: self.optimizer,
            regularizer: self.regularizer,
            _model: PhantomData,
        }
    }
}

impl<L, O, M, R> Trainer<L, O, M, R> {
    pub fn builder(loss_fn: L, optimizer: O, regularizer: R) -> TrainerBuilder<L, O, M, R> {
        TrainerBuilder::new(loss_fn, optimizer, regularizer)
    }
}

impl<L, O, M, P, R> Trainer<L, O, M, R>
where
    L: Loss<Prediction = Array1<f64>, Target = Array1<f64>>,
    M: TrainableModel<Input = Array2<f64>, Prediction = Array1<f64>, Params = P, Gradients = P>,
    O: Optimizer<P>,
    R: Regularizer<M>,
    P: ParamOps,
{
    /// Train for `max_epochs` and return the fitted model.
    pub fn fit<D: Dataset>(&self, model: M, dataset: &D) -> Result<M::Output> {
        self.fit_with_history(model, dataset)
            .map(|(fitted, _)| fitted)
    }

    /// Like [`fit`](Self::fit), also returning the mean loss of every epoch.
    ///
    /// # Errors
    /// [`AdvisorError::EmptyDataset`] for an empty or unsized dataset and
    /// [`AdvisorError::Training`] when a batch fails to load or the loss
    /// stops being finite.
    pub fn fit_with_history<D: Dataset>(
        &self,
        mut model: M,
        dataset: &D,
    ) -> Result<(M::Output, Vec<f64>)> {
        let n_total = dataset
            .len()
            .ok_or_else(|| AdvisorError::EmptyDataset("dataset length unknown".into()))?;
        if n_total == 0 {
            return Err(AdvisorError::EmptyDataset("no training rows".into()));
        }
        if self.batch_size == 0 {
            return Err(AdvisorError::Config("batch_size must be positive".into()));
        }

        let mut history = Vec::with_capacity(self.max_epochs);
        for epoch in 0..self.max_epochs {
            let mut total_loss = 0.0;
            for batch in dataset.batches(self.batch_size) {
                let (batch_x, batch_y) = batch
                    .map_err(|e| AdvisorError::Training(format!("data error: {e:?}")))?;
                let weight = batch_y.len() as f64;

                let preds = model.forward(&batch_x);
                let (reg_penalty, reg_grad) = self.regularizer.regularizer_penalty_grad(&model);
                total_loss += (self.loss_fn.loss(&preds, &batch_y) + reg_penalty) * weight;

                let grad_preds = self.loss_fn.grad_wrt_prediction(&preds, &batch_y);
                let grads = model.backward(&batch_x, &grad_preds).add(&reg_grad);
                let new_params = self.optimizer.step(model.params(), &grads);
                model.update_params(&new_params);
            }

            let avg_loss = total_loss / n_total as f64;
            if !avg_loss.is_finite() {
                return Err(AdvisorError::Training(format!(
                    "loss diverged at epoch {epoch}"
                )));
            }
            if self.verbose {
                debug!(epoch, loss = avg_loss, "epoch finished");
            }
            history.push(avg_loss);
        }

        if let Some(last) = history.last() {
            info!(epochs = self.max_epochs, final_loss = *last, "training finished");
        }
        Ok((model.into_fitted(), history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InMemoryDataset;
    use crate::loss::{BCEWithLogitsLoss, MSELoss};
    use crate::model::{InferenceModel, LinearRegression, LogisticRegression};
    use crate::optimizer::SGD;
    use crate::regularizers::{NoRegularizer, L2};
    use ndarray::{array, Array1, Array2};
    use std::ops::Range;

    type LinearTrainer<R> = TrainerBuilder<MSELoss, SGD, LinearRegression, R>;

    #[test]
    fn test_trainer_builder_default_values() {
        let builder: LinearTrainer<_> = TrainerBuilder::new(MSELoss, SGD::new(0.01), NoRegularizer);
        assert_eq!(builder.batch_size, 32);
        assert_eq!(builder.max_epochs, 1000);
        assert!(builder.verbose);
    }

    #[test]
    fn test_trainer_builder_chaining() {
        let trainer = LinearTrainer::<NoRegularizer>::new(MSELoss, SGD::new(0.01), NoRegularizer)
            .batch_size(128)
            .max_epochs(250)
            .verbose(false)
            .build();
        assert_eq!(trainer.batch_size, 128);
        assert_eq!(trainer.max_epochs, 250);
        assert!(!trainer.verbose);
    }

    #[test]
    fn test_trainer_fit_linear_regression() {
        // y = 2*x1 + 3*x2 + 1
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 3.0]];
        let y = array![3.0, 4.0, 6.0, 14.0];
        let dataset = InMemoryDataset::new(x, y).unwrap();

        let trainer = Trainer::builder(MSELoss, SGD::new(0.1), NoRegularizer)
            .batch_size(4)
            .max_epochs(2000)
            .verbose(false)
            .build();
        let (fitted, history) = trainer
            .fit_with_history(LinearRegression::new(2), &dataset)
            .unwrap();

        let preds = fitted.predict_batch(&array![[1.0, 0.0], [0.0, 1.0]]);
        assert!((preds[0] - 3.0).abs() < 0.1);
        assert!((preds[1] - 4.0).abs() < 0.1);
        assert_eq!(history.len(), 2000);
        assert!(history[1999] < history[0]);
    }

    #[test]
    fn test_trainer_with_l2_regularization() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];
        let dataset = InMemoryDataset::new(x, y).unwrap();

        let trainer = Trainer::builder(MSELoss, SGD::new(0.01), L2::new(1.0))
            .batch_size(3)
            .max_epochs(500)
            .verbose(false)
            .build();
        let fitted = trainer.fit(LinearRegression::new(1), &dataset).unwrap();
        let weights = fitted.extract_params().weights;

        // unregularized optimum is 2.0
        assert!(weights[0] < 2.0);
        assert!(weights[0] > 0.0);
    }

    #[test]
    fn test_trainer_fit_logistic_regression() {
        let x = array![[-2.0], [-1.0], [-0.5], [0.5], [1.0], [2.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let dataset = InMemoryDataset::new(x, y).unwrap();

        let trainer = Trainer::builder(BCEWithLogitsLoss, SGD::new(0.5), NoRegularizer)
            .batch_size(2)
            .max_epochs(300)
            .verbose(false)
            .build();
        let fitted = trainer.fit(LogisticRegression::new(1), &dataset).unwrap();

        let probs = fitted.predict_batch(&array![[-2.0], [2.0]]);
        assert!(probs[0] < 0.2);
        assert!(probs[1] > 0.8);
    }

    #[test]
    fn test_trainer_divergence_is_an_error() {
        let x = array![[100.0], [200.0]];
        let y = array![1.0, 2.0];
        let dataset = InMemoryDataset::new(x, y).unwrap();

        let trainer = Trainer::builder(MSELoss, SGD::new(10.0), NoRegularizer)
            .batch_size(2)
            .max_epochs(200)
            .verbose(false)
            .build();
        let err = trainer.fit(LinearRegression::new(1), &dataset).unwrap_err();
        assert!(matches!(err, AdvisorError::Training(_)));
    }

    #[test]
    fn test_trainer_zero_batch_size_rejected() {
        let dataset = InMemoryDataset::new(array![[1.0]], array![1.0]).unwrap();
        let trainer = Trainer::builder(MSELoss, SGD::new(0.1), NoRegularizer)
            .batch_size(0)
            .build();
        assert!(matches!(
            trainer.fit(LinearRegression::new(1), &dataset),
            Err(AdvisorError::Config(_))
        ));
    }

    #[test]
    fn test_trainer_unknown_dataset_length() {
        struct Unsized;

        impl Dataset for Unsized {
            type Error = String;

            fn len(&self) -> Option<usize> {
                None
            }

            fn get_batch(
                &self,
                _range: Range<usize>,
            ) -> std::result::Result<(Array2<f64>, Array1<f64>), Self::Error> {
                Err("unreachable".into())
            }
        }

        let trainer = Trainer::builder(MSELoss, SGD::new(0.1), NoRegularizer)
            .max_epochs(1)
            .build();
        let result = trainer.fit(LinearRegression::new(1), &Unsized);
        assert!(matches!(result, Err(AdvisorError::EmptyDataset(_))));
    }
}
