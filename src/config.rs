//! Run configuration.
//!
//! Loaded from a JSON file; every field has a default so a partial file (or
//! no file at all) is valid.

use crate::error::{AdvisorError, Result};
use crate::features::DEFAULT_REFERENCE_YEAR;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hyperparameters of one SGD-fitted estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SgdConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
    /// L2 penalty strength; 0 disables regularization.
    pub l2: f64,
}

impl SgdConfig {
    pub fn classifier() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 200,
            batch_size: 64,
            l2: 1e-4,
        }
    }

    pub fn regressor() -> Self {
        Self {
            learning_rate: 0.05,
            epochs: 300,
            batch_size: 64,
            l2: 0.0,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(AdvisorError::Config(format!(
                "{name}.learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(AdvisorError::Config(format!("{name}.epochs must be positive")));
        }
        if self.batch_size == 0 {
            return Err(AdvisorError::Config(format!(
                "{name}.batch_size must be positive"
            )));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(AdvisorError::Config(format!(
                "{name}.l2 must be non-negative, got {}",
                self.l2
            )));
        }
        Ok(())
    }
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self::classifier()
    }
}

fn default_classifier() -> SgdConfig {
    SgdConfig::classifier()
}

fn default_regressor() -> SgdConfig {
    SgdConfig::regressor()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Year against which `Age_of_Property` is computed.
    pub reference_year: i32,
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    pub seed: u64,
    /// Train on a seeded random subset of at most this many rows.
    pub max_rows: Option<usize>,
    #[serde(default = "default_classifier")]
    pub classifier: SgdConfig,
    #[serde(default = "default_regressor")]
    pub regressor: SgdConfig,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            test_size: 0.2,
            seed: 42,
            max_rows: None,
            classifier: SgdConfig::classifier(),
            regressor: SgdConfig::regressor(),
        }
    }
}

impl AdvisorConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(AdvisorError::Config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.max_rows == Some(0) {
            return Err(AdvisorError::Config("max_rows must be positive".into()));
        }
        self.classifier.validate("classifier")?;
        self.regressor.validate("regressor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AdvisorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reference_year, 2025);
        assert_eq!(config.seed, 42);
        assert_eq!(config.test_size, 0.2);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AdvisorConfig =
            serde_json::from_str(r#"{"seed": 7, "regressor": {"epochs": 10}}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.reference_year, 2025);
        assert_eq!(config.regressor.epochs, 10);
        // nested defaults come from SgdConfig::default
        assert_eq!(config.regressor.batch_size, 64);
        assert_eq!(config.classifier, SgdConfig::classifier());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AdvisorConfig {
            test_size: 1.0,
            ..AdvisorConfig::default()
        };
        assert!(matches!(config.validate(), Err(AdvisorError::Config(_))));

        config.test_size = 0.2;
        config.classifier.learning_rate = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("classifier.learning_rate"));

        config.classifier = SgdConfig::classifier();
        config.max_rows = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = AdvisorConfig {
            max_rows: Some(500),
            ..AdvisorConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(AdvisorConfig::from_path(&path).unwrap(), config);
    }
}
