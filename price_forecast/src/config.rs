//! Forecast pipeline configuration

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForestConfig, RandomForest};
use crate::utils::DateStep;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest supported forecast horizon in days
pub const MAX_PREDICT_DAYS: usize = 90;
/// Largest supported ensemble
pub const MAX_ESTIMATORS: usize = 1000;
/// Deepest supported tree
pub const MAX_TREE_DEPTH: usize = 64;

/// Settings for one forecast request; missing JSON fields take defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Trailing days per feature window
    pub lookback_days: usize,
    /// Days to forecast
    pub predict_days: usize,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split; a third of the total when unset
    pub max_features: Option<usize>,
    /// Seed for the holdout split, bootstrap samples and feature subsets
    pub seed: u64,
    /// Fraction of windows held out for diagnostics
    pub holdout_ratio: f64,
    /// Fewest windows accepted for training
    pub min_training_samples: usize,
    /// Training wall-clock budget in seconds
    pub training_deadline_secs: Option<f64>,
    pub date_step: DateStep,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            predict_days: 5,
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
            holdout_ratio: 0.2,
            min_training_samples: 30,
            training_deadline_secs: None,
            date_step: DateStep::CalendarDay,
        }
    }
}

impl ForecastConfig {
    /// Load from a JSON file and validate
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse from JSON and validate
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is within its supported range
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ForecastError::InvalidParameter(msg));

        if self.lookback_days == 0 {
            return invalid("lookback_days must be at least 1".to_string());
        }
        if !(1..=MAX_PREDICT_DAYS).contains(&self.predict_days) {
            return invalid(format!(
                "predict_days must be between 1 and {}, got {}",
                MAX_PREDICT_DAYS, self.predict_days
            ));
        }
        if !(1..=MAX_ESTIMATORS).contains(&self.n_estimators) {
            return invalid(format!(
                "n_estimators must be between 1 and {}, got {}",
                MAX_ESTIMATORS, self.n_estimators
            ));
        }
        if !(1..=MAX_TREE_DEPTH).contains(&self.max_depth) {
            return invalid(format!(
                "max_depth must be between 1 and {}, got {}",
                MAX_TREE_DEPTH, self.max_depth
            ));
        }
        if self.max_features == Some(0) {
            return invalid("max_features must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.holdout_ratio) {
            return invalid(format!(
                "holdout_ratio must be in [0, 1), got {}",
                self.holdout_ratio
            ));
        }
        if self.min_training_samples == 0 {
            return invalid("min_training_samples must be at least 1".to_string());
        }
        if let Some(secs) = self.training_deadline_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return invalid(format!("training_deadline_secs must be positive, got {}", secs));
            }
            if Duration::try_from_secs_f64(secs).is_err() {
                return invalid(format!("training_deadline_secs is too large, got {}", secs));
            }
        }
        Ok(())
    }

    /// Training deadline as a duration; `None` when unset or not representable
    pub fn training_deadline(&self) -> Option<Duration> {
        self.training_deadline_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Forest settings derived from this configuration
    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            bootstrap: true,
            deadline: self.training_deadline(),
        }
    }

    /// An untrained random forest model with this configuration's training settings
    pub fn build_model(&self) -> Result<ForecastModel<RandomForest>> {
        self.validate()?;
        ForecastModel::random_forest(self.forest_config())
            .with_holdout_ratio(self.holdout_ratio)?
            .with_min_training_samples(self.min_training_samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ForecastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.n_estimators, 100);
        assert_eq!(config.training_deadline(), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            ForecastConfig::from_json_str(r#"{"predict_days": 10, "date_step": "trading_day"}"#)
                .unwrap();
        assert_eq!(config.predict_days, 10);
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.date_step, DateStep::TradingDay);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(ForecastConfig::from_json_str(r#"{"predict_days": 91}"#).is_err());
        assert!(ForecastConfig::from_json_str(r#"{"lookback_days": 0}"#).is_err());
        assert!(ForecastConfig::from_json_str(r#"{"holdout_ratio": 1.0}"#).is_err());
        assert!(matches!(
            ForecastConfig::from_json_str("{not json"),
            Err(ForecastError::JsonError(_))
        ));
    }
}
