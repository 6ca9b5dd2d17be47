//! Ensemble regressors and the trained forecast model

pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{RegressionTree, TreeConfig};
pub use random_forest::{ForestConfig, RandomForest};

use crate::error::{ForecastError, Result};
use crate::features::{FeatureAccess, TrainingSet};
use crate::metrics::TrainingDiagnostics;
use crate::utils::train_holdout_split;
use std::fmt::Debug;
use tracing::info;

/// An ensemble whose members each produce a prediction
///
/// Object safe, so a [`ForecastModel`] can also wrap `Box<dyn EnsembleRegressor>`.
pub trait EnsembleRegressor: Debug + Send + Sync {
    /// Name of the regressor
    fn name(&self) -> &str;

    /// Fit the ensemble; equal seeds on equal data give equal members
    fn fit(&mut self, data: &TrainingSet, seed: u64) -> Result<()>;

    /// Whether `fit` has completed
    fn is_fitted(&self) -> bool;

    /// Number of fitted members
    fn member_count(&self) -> usize;

    /// One prediction per member
    fn predict_members(&self, features: &dyn FeatureAccess) -> Result<Vec<f64>>;

    /// Aggregate prediction, the mean over members
    fn predict_point(&self, features: &dyn FeatureAccess) -> Result<f64> {
        let members = self.predict_members(features)?;
        if members.is_empty() {
            return Err(ForecastError::ModelNotTrained);
        }
        Ok(members.iter().sum::<f64>() / members.len() as f64)
    }
}

impl<R: EnsembleRegressor + ?Sized> EnsembleRegressor for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fit(&mut self, data: &TrainingSet, seed: u64) -> Result<()> {
        (**self).fit(data, seed)
    }

    fn is_fitted(&self) -> bool {
        (**self).is_fitted()
    }

    fn member_count(&self) -> usize {
        (**self).member_count()
    }

    fn predict_members(&self, features: &dyn FeatureAccess) -> Result<Vec<f64>> {
        (**self).predict_members(features)
    }

    fn predict_point(&self, features: &dyn FeatureAccess) -> Result<f64> {
        (**self).predict_point(features)
    }
}

/// Aggregate and per-member predictions for one feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub point: f64,
    pub members: Vec<f64>,
}

/// Default fraction of samples held out for diagnostics
pub const DEFAULT_HOLDOUT_RATIO: f64 = 0.2;
/// Default minimum number of training samples
pub const DEFAULT_MIN_TRAINING_SAMPLES: usize = 30;

/// A regressor plus its training protocol
#[derive(Debug, Clone)]
pub struct ForecastModel<R = RandomForest> {
    regressor: R,
    holdout_ratio: f64,
    min_training_samples: usize,
    diagnostics: Option<TrainingDiagnostics>,
}

impl ForecastModel<RandomForest> {
    /// Random forest model from a forest configuration
    pub fn random_forest(config: ForestConfig) -> Self {
        Self::new(RandomForest::new(config))
    }
}

impl<R: EnsembleRegressor> ForecastModel<R> {
    /// Wrap an unfitted regressor with default training settings
    pub fn new(regressor: R) -> Self {
        Self {
            regressor,
            holdout_ratio: DEFAULT_HOLDOUT_RATIO,
            min_training_samples: DEFAULT_MIN_TRAINING_SAMPLES,
            diagnostics: None,
        }
    }

    /// Fraction of samples held out for diagnostics, in `[0, 1)`
    pub fn with_holdout_ratio(mut self, ratio: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&ratio) {
            return Err(ForecastError::InvalidParameter(format!(
                "holdout_ratio must be in [0, 1), got {}",
                ratio
            )));
        }
        self.holdout_ratio = ratio;
        Ok(self)
    }

    /// Smallest training set accepted by [`ForecastModel::train`]
    pub fn with_min_training_samples(mut self, min: usize) -> Result<Self> {
        if min == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_training_samples must be positive".to_string(),
            ));
        }
        self.min_training_samples = min;
        Ok(self)
    }

    pub fn regressor(&self) -> &R {
        &self.regressor
    }

    pub fn min_training_samples(&self) -> usize {
        self.min_training_samples
    }

    pub fn is_trained(&self) -> bool {
        self.regressor.is_fitted()
    }

    /// Diagnostics of the last successful training
    pub fn diagnostics(&self) -> Option<&TrainingDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Fit on a seeded shuffled split and score the held-out part
    ///
    /// With no held-out samples the diagnostics are in-sample. A failed
    /// training keeps the previous fit and its diagnostics.
    pub fn train(&mut self, data: &TrainingSet, seed: u64) -> Result<TrainingDiagnostics> {
        if data.len() < self.min_training_samples {
            return Err(ForecastError::InsufficientData {
                required: self.min_training_samples,
                available: data.len(),
            });
        }

        let (train_idx, holdout_idx) = train_holdout_split(data.len(), self.holdout_ratio, seed);
        let train_set = data.subset(&train_idx);
        self.regressor.fit(&train_set, seed)?;

        let eval_set = if holdout_idx.is_empty() {
            train_set
        } else {
            data.subset(&holdout_idx)
        };
        let predicted = eval_set
            .features()
            .iter()
            .map(|features| self.regressor.predict_point(features))
            .collect::<Result<Vec<_>>>()?;
        let diagnostics = TrainingDiagnostics::evaluate(&predicted, eval_set.targets(), train_idx.len())?;

        info!(
            model = self.regressor.name(),
            members = self.regressor.member_count(),
            train_samples = diagnostics.train_samples,
            holdout_samples = diagnostics.holdout_samples,
            mse = diagnostics.mse,
            mae = diagnostics.mae,
            mape = ?diagnostics.mape,
            "trained forecast model"
        );

        self.diagnostics = Some(diagnostics);
        Ok(diagnostics)
    }

    /// Point estimate and member estimates for one feature vector
    pub fn predict_one(&self, features: &dyn FeatureAccess) -> Result<Prediction> {
        if !self.regressor.is_fitted() {
            return Err(ForecastError::ModelNotTrained);
        }
        let members = self.regressor.predict_members(features)?;
        if members.is_empty() {
            return Err(ForecastError::ModelNotTrained);
        }
        let point = members.iter().sum::<f64>() / members.len() as f64;
        Ok(Prediction { point, members })
    }
}
