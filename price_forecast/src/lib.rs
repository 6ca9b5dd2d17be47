//! # Price Forecast
//!
//! Recursive multi-step forecasting of daily closing prices with a random
//! forest over windows of technical indicators.
//!
//! ## Features
//!
//! - Daily OHLCV series with CSV loading and history periods
//! - Indicator rows (moving averages, RSI, MACD, Bollinger bands, volatility)
//! - Flattened lookback windows paired with next-day closes
//! - Bagged regression trees with per-member predictions and holdout diagnostics
//! - Recursive forecasting with an O(F) sliding feature window
//! - Confidence scores from ensemble agreement and a printable summary
//!
//! ## Quick Start
//!
//! ```rust
//! use price_forecast::config::ForecastConfig;
//! use price_forecast::data::synthetic;
//! use price_forecast::pipeline::ForecastPipeline;
//!
//! let series = synthetic::random_walk("DEMO", 120, 100.0, 0.01, 7)?;
//!
//! let config = ForecastConfig {
//!     lookback_days: 10,
//!     predict_days: 5,
//!     n_estimators: 20,
//!     ..ForecastConfig::default()
//! };
//! let report = ForecastPipeline::new(config)?.run(&series)?;
//!
//! assert_eq!(report.forecast.len(), 5);
//! println!("{}", report.summary);
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod confidence;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod indicators;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use crate::confidence::ConfidenceEstimator;
pub use crate::config::ForecastConfig;
pub use crate::data::{Bar, CsvPriceSource, DataLoader, HistoryPeriod, PriceSeries, PriceSource};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{FeatureVector, FeatureWindower, TrainingSet};
pub use crate::forecaster::{Forecast, ForecastStep, RecursiveForecaster};
pub use crate::indicators::{IndicatorEngine, IndicatorRow};
pub use crate::metrics::TrainingDiagnostics;
pub use crate::models::{EnsembleRegressor, ForecastModel, Prediction, RandomForest};
pub use crate::pipeline::{ForecastPipeline, ForecastReport};
pub use crate::report::{ForecastSummary, Trend};
pub use crate::utils::DateStep;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
