//! Recursive multi-step forecasting
//!
//! Each predicted close is turned into a synthetic bar, its indicator row is
//! approximated from the previous row, and the row is slid into the feature
//! window for the next prediction. Only the moving averages and the price
//! change follow the synthetic close; RSI, MACD, Bollinger bands, volume change
//! and volatility are carried forward unchanged.

use crate::confidence::ConfidenceEstimator;
use crate::data::Bar;
use crate::error::{ForecastError, Result};
use crate::features::{FeatureVector, FeatureWindow};
use crate::indicators::{fractional_change, IndicatorRow, MA_WINDOWS};
use crate::models::{EnsembleRegressor, ForecastModel};
use crate::utils::DateStep;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Synthetic high as a multiple of the predicted close
pub const SYNTHETIC_HIGH_FACTOR: f64 = 1.01;
/// Synthetic low as a multiple of the predicted close
pub const SYNTHETIC_LOW_FACTOR: f64 = 0.99;

/// One forecast day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastStep {
    pub date: NaiveDate,
    pub predicted_close: f64,
    /// In `[0, 0.95]`
    pub confidence: f64,
}

/// Forecast steps plus the synthetic rows fed back between them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub steps: Vec<ForecastStep>,
    /// Row synthesized after step `i` is `synthetic_rows[i]`; the last step has none
    pub synthetic_rows: Vec<IndicatorRow>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Predicted closes in date order
    pub fn predicted_closes(&self) -> Vec<f64> {
        self.steps.iter().map(|step| step.predicted_close).collect()
    }
}

/// Incremental moving average update toward `close`
fn roll_average(previous: Option<f64>, window: usize, close: f64) -> Option<f64> {
    let k = window as f64;
    previous.map(|ma| (ma * (k - 1.0) + close) / k)
}

/// Indicator row for a synthetic bar closing at `prediction` on `date`
///
/// Open and close are the prediction, high and low sit 1% around it, and the
/// volume is carried from `last_row`.
pub fn synthesize_next_row(last_row: &IndicatorRow, prediction: f64, date: NaiveDate) -> IndicatorRow {
    let bar = Bar::new(
        date,
        prediction,
        prediction * SYNTHETIC_HIGH_FACTOR,
        prediction * SYNTHETIC_LOW_FACTOR,
        prediction,
        last_row.bar.volume,
    );

    let [w5, w10, w20, w30] = MA_WINDOWS;
    IndicatorRow {
        bar,
        ma5: roll_average(last_row.ma5, w5, prediction),
        ma10: roll_average(last_row.ma10, w10, prediction),
        ma20: roll_average(last_row.ma20, w20, prediction),
        ma30: roll_average(last_row.ma30, w30, prediction),
        price_change: fractional_change(prediction, last_row.bar.close),
        ..*last_row
    }
}

/// Rolls a trained model forward one day at a time
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveForecaster {
    confidence: ConfidenceEstimator,
    date_step: DateStep,
}

impl RecursiveForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `date_step` to advance forecast dates
    pub fn with_date_step(mut self, date_step: DateStep) -> Self {
        self.date_step = date_step;
        self
    }

    pub fn with_confidence_estimator(mut self, confidence: ConfidenceEstimator) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn date_step(&self) -> DateStep {
        self.date_step
    }

    /// Forecast `predict_days` steps after `last_row`
    ///
    /// `last_features` is the starting window and `last_row` the most recent
    /// observed indicator row. Either every step is produced or an error is
    /// returned; `predict_days == 0` yields an empty forecast.
    pub fn forecast<R: EnsembleRegressor>(
        &self,
        model: &ForecastModel<R>,
        last_features: &FeatureVector,
        last_row: &IndicatorRow,
        predict_days: usize,
    ) -> Result<Forecast> {
        let mut forecast = Forecast {
            steps: Vec::with_capacity(predict_days),
            synthetic_rows: Vec::with_capacity(predict_days.saturating_sub(1)),
        };
        if predict_days == 0 {
            return Ok(forecast);
        }

        if !last_row.is_complete() {
            return Err(ForecastError::DataError(format!(
                "Indicator row for {} has undefined fields",
                last_row.bar.date
            )));
        }

        let mut window = FeatureWindow::from_vector(last_features)?;
        let mut last_row = *last_row;
        let mut date = last_row.bar.date;

        for step in 0..predict_days {
            let prediction = model.predict_one(&window)?;
            let confidence = self.confidence.estimate(prediction.point, &prediction.members);
            date = self.date_step.next(date)?;

            debug!(
                step,
                %date,
                predicted_close = prediction.point,
                confidence,
                "forecast step"
            );
            forecast.steps.push(ForecastStep {
                date,
                predicted_close: prediction.point,
                confidence,
            });

            if step + 1 < predict_days {
                let row = synthesize_next_row(&last_row, prediction.point, date);
                let day = row.day_features().ok_or_else(|| {
                    ForecastError::DataError(format!(
                        "Synthetic row for {} has undefined fields",
                        date
                    ))
                })?;
                window.push_day(&day);
                forecast.synthetic_rows.push(row);
                last_row = row;
            }
        }

        Ok(forecast)
    }
}
