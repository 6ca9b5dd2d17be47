//! End-to-end forecast for one price series
//!
//! Each run owns its indicator rows, training set and model; nothing is shared
//! between runs.

use crate::config::ForecastConfig;
use crate::data::{HistoryPeriod, PriceSeries, PriceSource};
use crate::error::{ForecastError, Result};
use crate::features::FeatureWindower;
use crate::forecaster::{Forecast, RecursiveForecaster};
use crate::indicators::IndicatorEngine;
use crate::metrics::TrainingDiagnostics;
use crate::report::ForecastSummary;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, info_span};

/// Everything produced by one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub symbol: String,
    pub last_date: NaiveDate,
    pub last_close: f64,
    pub training_samples: usize,
    pub diagnostics: TrainingDiagnostics,
    pub forecast: Forecast,
    pub summary: ForecastSummary,
}

/// Indicators, windows, training and recursive forecasting in one call
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: ForecastConfig,
    engine: IndicatorEngine,
    forecaster: RecursiveForecaster,
}

impl ForecastPipeline {
    /// Create a pipeline; fails if the configuration is out of range
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        let forecaster = RecursiveForecaster::new().with_date_step(config.date_step);
        Ok(Self {
            config,
            engine: IndicatorEngine::new(),
            forecaster,
        })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fewest bars that can yield a single complete training window
    pub fn min_bars(&self) -> usize {
        self.engine
            .warm_up()
            .saturating_add(self.config.lookback_days)
            .saturating_add(2)
    }

    /// Fetch `symbol` from `source` and forecast it
    pub fn run_symbol<S: PriceSource + ?Sized>(
        &self,
        source: &S,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<ForecastReport> {
        let series = source.fetch(symbol, period)?;
        self.run(&series)
    }

    /// Forecast `predict_days` closes after the last bar of `series`
    pub fn run(&self, series: &PriceSeries) -> Result<ForecastReport> {
        let span = info_span!("forecast", symbol = series.symbol());
        let _guard = span.enter();

        if series.is_empty() {
            return Err(ForecastError::EmptySeries);
        }

        let windower = FeatureWindower::new(self.config.lookback_days)?;
        if series.len() < windower.min_history() {
            return Err(ForecastError::InsufficientHistory {
                required: windower.min_history(),
                available: series.len(),
            });
        }

        let rows = self.engine.compute(series)?;
        let training = windower.build(&rows)?;
        let last_features = training
            .last_features()
            .ok_or(ForecastError::InsufficientHistory {
                required: self.min_bars(),
                available: series.len(),
            })?
            .clone();
        info!(
            bars = series.len(),
            samples = training.len(),
            lookback_days = self.config.lookback_days,
            "prepared training windows"
        );

        let mut model = self.config.build_model()?;
        let diagnostics = model.train(&training, self.config.seed)?;

        let last_row = rows.last().ok_or(ForecastError::EmptySeries)?;
        let forecast = self.forecaster.forecast(
            &model,
            &last_features,
            last_row,
            self.config.predict_days,
        )?;

        let last_bar = series.last();
        let summary =
            ForecastSummary::new(series.symbol(), last_bar.date, last_bar.close, &forecast.steps);
        info!(
            steps = forecast.len(),
            final_close = ?summary.final_close,
            trend = %summary.trend,
            "forecast complete"
        );

        Ok(ForecastReport {
            symbol: series.symbol().to_string(),
            last_date: last_bar.date,
            last_close: last_bar.close,
            training_samples: training.len(),
            diagnostics,
            forecast,
            summary,
        })
    }
}
