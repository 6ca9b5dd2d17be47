//! # Price Forecast Workspace
//!
//! Facade over the workspace crates: `trade_math` for streaming indicators and
//! `price_forecast` for the forecasting pipeline.
//!
//! ## Example
//!
//! ```
//! use price_forecast_workspace::indicators::SimpleMovingAverage;
//!
//! let mut ma = SimpleMovingAverage::new(3).unwrap();
//! for close in [10.0, 11.0, 12.0] {
//!     ma.update(close).unwrap();
//! }
//! assert_eq!(ma.value().unwrap(), 11.0);
//! ```

pub use price_forecast;
pub use trade_math;

/// Streaming indicator primitives
pub mod indicators {
    pub use trade_math::{
        BollingerBands, ExponentialMovingAverage, Macd, RelativeStrengthIndex,
        SimpleMovingAverage, StandardDeviation,
    };
}

pub use price_forecast::{ForecastConfig, ForecastError, ForecastPipeline, ForecastReport};

/// Forecast a series with `config` in one call.
///
/// # Examples
///
/// ```
/// use price_forecast_workspace::{forecast, ForecastConfig};
/// use price_forecast_workspace::price_forecast::data::synthetic;
///
/// let series = synthetic::linear("UP", 60, 100.0, 0.5).unwrap();
/// let config = ForecastConfig {
///     lookback_days: 5,
///     predict_days: 3,
///     n_estimators: 10,
///     min_training_samples: 10,
///     ..ForecastConfig::default()
/// };
/// let report = forecast(&series, config).unwrap();
/// assert_eq!(report.forecast.len(), 3);
/// ```
pub fn forecast(
    series: &price_forecast::PriceSeries,
    config: ForecastConfig,
) -> price_forecast::Result<ForecastReport> {
    ForecastPipeline::new(config)?.run(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use price_forecast::data::synthetic;

    #[test]
    fn test_forecast_rejects_invalid_config() {
        let series = synthetic::constant("FLAT", 40, 100.0, 1000).unwrap();
        let config = ForecastConfig {
            predict_days: 0,
            ..ForecastConfig::default()
        };
        assert!(matches!(
            forecast(&series, config),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_indicator_reexports() {
        let mut macd = indicators::Macd::standard().unwrap();
        macd.update(10.0).unwrap();
        assert_eq!(macd.macd_value().unwrap(), 0.0);
    }
}
