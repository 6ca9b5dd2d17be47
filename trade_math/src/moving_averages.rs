//! Moving average calculation implementations
//!
//! Contains implementations of the moving averages used by the indicator engine:
//! - Simple Moving Average (SMA)
//! - Exponential Moving Average (EMA)

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period + 1),
            sum: 0.0,
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "SMA input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }

        Ok(())
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Whether a full window has been observed
    pub fn is_ready(&self) -> bool {
        self.values.len() >= self.period
    }

    /// The values currently inside the window, oldest first
    pub fn window(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the SMA, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// Exponential Moving Average (EMA) implementation
///
/// Until `period` values have been seen the EMA reports the expanding mean of
/// the values so far. At the `period`-th value that mean is exactly the SMA
/// seed, after which the recursive update `ema += α (x - ema)` with
/// `α = 2 / (period + 1)` takes over.
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    period: usize,
    multiplier: f64,
    current_ema: Option<f64>,
    seed_sum: f64,
    values_seen: usize,
}

impl ExponentialMovingAverage {
    /// Create a new Exponential Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        let multiplier = 2.0 / (period as f64 + 1.0);

        Ok(Self {
            period,
            multiplier,
            current_ema: None,
            seed_sum: 0.0,
            values_seen: 0,
        })
    }

    /// Update the EMA with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "EMA input must be finite, got {}",
                value
            )));
        }

        self.values_seen += 1;

        if self.values_seen <= self.period {
            // Seeding phase: expanding mean, equal to the SMA seed at `period`
            self.seed_sum += value;
            self.current_ema = Some(self.seed_sum / self.values_seen as f64);
        } else if let Some(current) = self.current_ema {
            self.current_ema = Some(current + (value - current) * self.multiplier);
        }

        Ok(())
    }

    /// Get the current EMA value
    pub fn value(&self) -> Result<f64> {
        self.current_ema.ok_or_else(|| {
            MathError::InsufficientData("EMA has not received any values".to_string())
        })
    }

    /// Whether the SMA seed has been established
    pub fn is_seeded(&self) -> bool {
        self.values_seen >= self.period
    }

    /// Smoothing factor `2 / (period + 1)`
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the EMA, clearing all values
    pub fn reset(&mut self) {
        self.current_ema = None;
        self.seed_sum = 0.0;
        self.values_seen = 0;
    }
}
