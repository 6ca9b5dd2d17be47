//! Confidence scores from ensemble agreement

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

/// Highest confidence a forecast step can carry
pub const CONFIDENCE_CEILING: f64 = 0.95;

/// Maps member dispersion to a bounded score
///
/// `confidence = clamp(1 − σ / |point|, 0, ceiling)` where `σ` is the population
/// standard deviation of the member estimates. A zero point estimate scores 0.
/// The score is a heuristic, not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceEstimator {
    ceiling: f64,
}

impl Default for ConfidenceEstimator {
    fn default() -> Self {
        Self {
            ceiling: CONFIDENCE_CEILING,
        }
    }
}

impl ConfidenceEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    /// Score in `[0, ceiling]`
    pub fn estimate(&self, point: f64, members: &[f64]) -> f64 {
        if point == 0.0 || !point.is_finite() || members.is_empty() {
            return 0.0;
        }

        let dispersion = members.population_std_dev();
        if !dispersion.is_finite() {
            return 0.0;
        }

        (1.0 - dispersion / point.abs()).clamp(0.0, self.ceiling)
    }
}

/// Coarse bucket of a confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Above 0.7 is high, above 0.5 medium
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            ConfidenceLevel::High
        } else if score > 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        };
        f.pad(label)
    }
}
