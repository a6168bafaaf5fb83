//! JSON record of a training run.

use crate::error::Result;
use crate::metrics::{ClassificationMetrics, RegressionMetrics};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport<M> {
    pub estimator: String,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Mean training loss of the last epoch.
    pub final_loss: f64,
    pub metrics: M,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Rows in the labeled dataset before subsampling.
    pub dataset_rows: usize,
    pub rows_used: usize,
    pub reference_year: i32,
    pub seed: u64,
    pub test_size: f64,
    pub contract_fingerprint: String,
    /// Set by the caller; the library never reads the clock.
    pub trained_at: Option<String>,
    pub classifier: TaskReport<ClassificationMetrics>,
    pub regressor: TaskReport<RegressionMetrics>,
}

impl TrainingReport {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}
