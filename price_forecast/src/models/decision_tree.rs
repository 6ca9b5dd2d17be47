//! CART regression tree
//!
//! Nodes live in a flat arena; children are referenced by index. Splits are
//! found with a sorted sweep over each candidate feature using running sums,
//! so a node costs `O(k · n log n)` for `k` candidate features.

use crate::error::{ForecastError, Result};
use crate::features::{FeatureAccess, TrainingSet};
use crate::models::EnsembleRegressor;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Node impurity below which a node is not split further
const MIN_IMPURITY: f64 = 1e-12;

/// Regression tree configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree; the root is at depth 0
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Regression tree minimizing squared error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    config: TreeConfig,
    nodes: Vec<Node>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl RegressionTree {
    /// Create an unfitted tree
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Fit on the samples at `indices`; duplicates count with multiplicity
    pub fn fit_sample(&mut self, data: &TrainingSet, indices: &[usize]) -> Result<()> {
        if indices.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: 1,
                available: 0,
            });
        }
        if self.config.max_features == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "max_features must be positive".to_string(),
            ));
        }

        let mut builder = TreeBuilder {
            config: &self.config,
            data,
            rng: ChaCha8Rng::seed_from_u64(self.config.seed),
            nodes: Vec::new(),
            importances: vec![0.0; data.n_features()],
        };
        let mut samples = indices.to_vec();
        builder.build(&mut samples, 0);

        let TreeBuilder {
            nodes,
            mut importances,
            ..
        } = builder;

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        self.nodes = nodes;
        self.n_features = data.n_features();
        self.feature_importances = importances;
        Ok(())
    }

    /// Predict the target for one feature vector
    pub fn predict(&self, features: &dyn FeatureAccess) -> Result<f64> {
        if self.nodes.is_empty() {
            return Err(ForecastError::ModelNotTrained);
        }
        if features.feature_len() != self.n_features {
            return Err(ForecastError::InvalidParameter(format!(
                "Expected {} features, got {}",
                self.n_features,
                features.feature_len()
            )));
        }

        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { value } => return Ok(value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features.feature(feature) <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Number of leaves
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf, 0 for a single-leaf tree
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            match self.nodes[index] {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        deepest
    }

    /// Normalized squared-error reduction per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

/// Working state for one fit
struct TreeBuilder<'a> {
    config: &'a TreeConfig,
    data: &'a TrainingSet,
    rng: ChaCha8Rng,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl TreeBuilder<'_> {
    fn target(&self, sample: usize) -> f64 {
        self.data.targets()[sample]
    }

    fn value(&self, sample: usize, feature: usize) -> f64 {
        self.data.features()[sample].feature(feature)
    }

    /// Build the subtree for `samples` and return its arena index
    fn build(&mut self, samples: &mut [usize], depth: usize) -> usize {
        let n = samples.len();
        let sum: f64 = samples.iter().map(|&s| self.target(s)).sum();
        let sum_sq: f64 = samples.iter().map(|&s| self.target(s).powi(2)).sum();
        let mean = sum / n as f64;
        let sse = (sum_sq - sum * sum / n as f64).max(0.0);

        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || sse / (n as f64) < MIN_IMPURITY
        {
            return index;
        }

        let Some(split) = self.best_split(samples, sse) else {
            return index;
        };

        // Partition in place: samples at or below the threshold first
        let mut boundary = 0;
        for i in 0..n {
            if self.value(samples[i], split.feature) <= split.threshold {
                samples.swap(i, boundary);
                boundary += 1;
            }
        }

        self.importances[split.feature] += split.gain;
        let (left_samples, right_samples) = samples.split_at_mut(boundary);
        let left = self.build(left_samples, depth + 1);
        let right = self.build(right_samples, depth + 1);

        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let n_features = self.data.n_features();
        let max_features = self
            .config
            .max_features
            .unwrap_or(n_features)
            .min(n_features);

        let mut features: Vec<usize> = (0..n_features).collect();
        if max_features < n_features {
            features.shuffle(&mut self.rng);
            features.truncate(max_features);
        }
        features
    }

    fn best_split(&mut self, samples: &[usize], parent_sse: f64) -> Option<Split> {
        let n = samples.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        if n < 2 * min_leaf {
            return None;
        }

        let total_sum: f64 = samples.iter().map(|&s| self.target(s)).sum();
        let total_sq: f64 = samples.iter().map(|&s| self.target(s).powi(2)).sum();

        let mut best: Option<Split> = None;
        let mut column: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in self.candidate_features() {
            column.clear();
            column.extend(
                samples
                    .iter()
                    .map(|&s| (self.value(s, feature), self.target(s))),
            );
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let (_, y) = column[k - 1];
                left_sum += y;
                left_sq += y * y;

                if k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let (lo, hi) = (column[k - 1].0, column[k].0);
                if lo >= hi {
                    continue;
                }

                let n_left = k as f64;
                let n_right = (n - k) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left)
                    + (right_sq - right_sum * right_sum / n_right);
                let gain = parent_sse - sse;

                if gain > MIN_IMPURITY && best.map_or(true, |b| gain > b.gain) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

impl EnsembleRegressor for RegressionTree {
    fn name(&self) -> &str {
        "RegressionTree"
    }

    fn fit(&mut self, data: &TrainingSet, seed: u64) -> Result<()> {
        self.config.seed = seed;
        let indices: Vec<usize> = (0..data.len()).collect();
        self.fit_sample(data, &indices)
    }

    fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    fn member_count(&self) -> usize {
        usize::from(self.is_fitted())
    }

    fn predict_members(&self, features: &dyn FeatureAccess) -> Result<Vec<f64>> {
        Ok(vec![self.predict(features)?])
    }
}
