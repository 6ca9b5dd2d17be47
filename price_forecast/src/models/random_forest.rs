//! Bagged ensemble of regression trees

use super::decision_tree::{RegressionTree, TreeConfig};
use crate::error::{ForecastError, Result};
use crate::features::{FeatureAccess, TrainingSet};
use crate::models::EnsembleRegressor;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features tried per split (a third of the total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Wall-clock budget for fitting every tree
    pub deadline: Option<Duration>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            deadline: None,
        }
    }
}

/// Random forest regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    feature_importances: Vec<f64>,
    fitted_seed: Option<u64>,
}

impl RandomForest {
    /// Create a new random forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_importances: Vec::new(),
            fitted_seed: None,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Seed passed to the last successful fit
    pub fn fitted_seed(&self) -> Option<u64> {
        self.fitted_seed
    }

    /// Fitted trees in seed order
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Normalized importances averaged over trees
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// `(feature name, importance)` pairs, most important first
    pub fn ranked_importances(&self, data: &TrainingSet) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = data
            .feature_names()
            .into_iter()
            .zip(self.feature_importances.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    fn validate(&self) -> Result<()> {
        if self.config.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_estimators must be positive".to_string(),
            ));
        }
        if self.config.max_features == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "max_features must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn fit_tree(
        &self,
        data: &TrainingSet,
        tree_seed: u64,
        max_features: usize,
        started: Instant,
    ) -> Result<RegressionTree> {
        if let Some(deadline) = self.config.deadline {
            if started.elapsed() >= deadline {
                return Err(ForecastError::TrainingDeadline(deadline));
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
        let n = data.len();
        let indices: Vec<usize> = if self.config.bootstrap {
            (0..n).map(|_| rng.gen_range(0..n)).collect()
        } else {
            (0..n).collect()
        };

        let mut tree = RegressionTree::new(TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: Some(max_features),
            seed: rng.gen(),
        });
        tree.fit_sample(data, &indices)?;
        Ok(tree)
    }
}

impl EnsembleRegressor for RandomForest {
    fn name(&self) -> &str {
        "RandomForest"
    }

    /// Fit `n_estimators` trees in parallel; tree `i` draws from `seed + i`
    fn fit(&mut self, data: &TrainingSet, seed: u64) -> Result<()> {
        self.validate()?;
        if data.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: 1,
                available: 0,
            });
        }

        let n_features = data.n_features();
        let max_features = self
            .config
            .max_features
            .unwrap_or((n_features / 3).max(1))
            .min(n_features);
        let started = Instant::now();

        let trees = (0..self.config.n_estimators)
            .into_par_iter()
            .map(|i| self.fit_tree(data, seed.wrapping_add(i as u64), max_features, started))
            .collect::<Result<Vec<_>>>()?;

        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (total, &imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *total += imp;
            }
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut importances {
                *imp /= sum;
            }
        }

        debug!(
            trees = trees.len(),
            samples = data.len(),
            max_features,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fitted random forest"
        );

        self.trees = trees;
        self.feature_importances = importances;
        self.fitted_seed = Some(seed);
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn member_count(&self) -> usize {
        self.trees.len()
    }

    fn predict_members(&self, features: &dyn FeatureAccess) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(ForecastError::ModelNotTrained);
        }
        self.trees.iter().map(|tree| tree.predict(features)).collect()
    }
}
