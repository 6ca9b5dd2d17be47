//! Error types for the price_forecast crate

use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The price history contains no bars at all
    #[error("Empty series: no price bars available")]
    EmptySeries,

    /// Too few bars to warm up indicators and build a single window
    #[error("Insufficient history: need at least {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// Too few training samples to fit the ensemble
    #[error("Insufficient data: need at least {required} training samples, have {available}")]
    InsufficientData { required: usize, available: usize },

    /// Prediction requested from a model that has not been trained
    #[error("Model not trained: call train before predicting")]
    ModelNotTrained,

    /// A percentage error was requested against a zero target
    #[error("Degenerate target: {0}")]
    DegenerateTarget(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Training ran past its configured deadline
    #[error("Training deadline of {0:?} exceeded")]
    TrainingDeadline(std::time::Duration),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading CSV price data
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error parsing configuration
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from indicator calculations
    #[error("Math error: {0}")]
    MathError(#[from] trade_math::MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
