//! Metrics for evaluating forecast accuracy

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Error metrics of predictions against actual values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
}

fn check_lengths(predicted: &[f64], actual: &[f64]) -> Result<()> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "Predicted and actual values must have the same non-zero length".to_string(),
        ));
    }
    Ok(())
}

/// Calculate MAE, MSE and RMSE
pub fn forecast_accuracy(predicted: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    check_lengths(predicted, actual)?;
    let n = predicted.len() as f64;

    let errors: Vec<f64> = predicted
        .iter()
        .zip(actual)
        .map(|(&p, &a)| a - p)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse: mse.sqrt(),
    })
}

/// Mean absolute percentage error, in percent
///
/// Fails with [`ForecastError::DegenerateTarget`] if any actual value is zero.
pub fn mean_absolute_percentage_error(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(predicted, actual)?;
    if let Some(index) = actual.iter().position(|&a| a == 0.0) {
        return Err(ForecastError::DegenerateTarget(format!(
            "actual value at index {} is zero",
            index
        )));
    }

    let total: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(&p, &a)| ((a - p) / a).abs())
        .sum();
    Ok(total / predicted.len() as f64 * 100.0)
}

/// Held-out error of a trained model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingDiagnostics {
    pub mse: f64,
    pub mae: f64,
    pub rmse: f64,
    /// Undefined when a held-out target is zero
    pub mape: Option<f64>,
    /// Samples the ensemble was fit on
    pub train_samples: usize,
    /// Samples the metrics were computed on
    pub holdout_samples: usize,
}

impl TrainingDiagnostics {
    /// Score `predicted` against `actual` held-out targets
    pub fn evaluate(predicted: &[f64], actual: &[f64], train_samples: usize) -> Result<Self> {
        let accuracy = forecast_accuracy(predicted, actual)?;
        let mape = match mean_absolute_percentage_error(predicted, actual) {
            Ok(mape) => Some(mape),
            Err(ForecastError::DegenerateTarget(reason)) => {
                warn!(%reason, "MAPE undefined for held-out targets");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            mse: accuracy.mse,
            mae: accuracy.mae,
            rmse: accuracy.rmse,
            mape,
            train_samples,
            holdout_samples: actual.len(),
        })
    }
}
