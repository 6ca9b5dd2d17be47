//! # Trade Math
//!
//! Streaming technical indicators used to derive features from daily price bars.
//! Every indicator follows the same shape: build it with `new`, feed it one
//! value at a time with `update`, and read the current value back, which fails
//! with [`MathError::InsufficientData`] until the warm-up window is filled.

use thiserror::Error;

// Indicator modules
pub mod moving_averages;
pub mod oscillators;
pub mod volatility;

pub use moving_averages::{ExponentialMovingAverage, SimpleMovingAverage};
pub use oscillators::{Macd, RelativeStrengthIndex};
pub use volatility::{BollingerBands, StandardDeviation};

/// Errors that can occur in indicator calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
