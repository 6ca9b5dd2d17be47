//! Volatility indicator implementations
//!
//! Contains implementations of volatility-based indicators:
//! - Bollinger Bands
//! - Rolling Standard Deviation

use crate::moving_averages::SimpleMovingAverage;
use crate::{MathError, Result};
use std::collections::VecDeque;

/// Population standard deviation of a window around a known mean
fn population_std_dev(values: &VecDeque<f64>, mean: f64) -> f64 {
    let variance = values
        .iter()
        .map(|&value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;

    variance.sqrt()
}

/// Bollinger Bands implementation
#[derive(Debug, Clone)]
pub struct BollingerBands {
    std_dev_multiplier: f64,
    sma: SimpleMovingAverage,
    prices: VecDeque<f64>,
}

impl BollingerBands {
    /// Create a new Bollinger Bands with the specified parameters
    pub fn new(period: usize, std_dev_multiplier: f64) -> Result<Self> {
        if std_dev_multiplier <= 0.0 {
            return Err(MathError::InvalidInput(
                "Standard deviation multiplier must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            std_dev_multiplier,
            sma: SimpleMovingAverage::new(period)?,
            prices: VecDeque::with_capacity(period + 1),
        })
    }

    /// Update the Bollinger Bands with a new price value
    pub fn update(&mut self, price: f64) -> Result<()> {
        self.sma.update(price)?;
        self.prices.push_back(price);

        if self.prices.len() > self.sma.period() {
            self.prices.pop_front();
        }

        Ok(())
    }

    /// Get the current middle band (SMA)
    pub fn middle_band(&self) -> Result<f64> {
        self.sma.value()
    }

    /// Population standard deviation of the current window
    pub fn std_dev(&self) -> Result<f64> {
        let mean = self.sma.value()?;
        Ok(population_std_dev(&self.prices, mean))
    }

    /// Get the current upper band (SMA + multiplier * std_dev)
    pub fn upper_band(&self) -> Result<f64> {
        Ok(self.middle_band()? + self.std_dev()? * self.std_dev_multiplier)
    }

    /// Get the current lower band (SMA - multiplier * std_dev)
    pub fn lower_band(&self) -> Result<f64> {
        Ok(self.middle_band()? - self.std_dev()? * self.std_dev_multiplier)
    }

    /// Band width as a ratio of the middle band: (upper - lower) / middle
    pub fn band_width(&self) -> Result<f64> {
        let middle = self.middle_band()?;
        if middle == 0.0 {
            return Err(MathError::CalculationError(
                "Middle band is zero, cannot calculate band width".to_string(),
            ));
        }

        Ok((self.upper_band()? - self.lower_band()?) / middle)
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.sma.period()
    }

    /// Get the standard deviation multiplier
    pub fn std_dev_multiplier(&self) -> f64 {
        self.std_dev_multiplier
    }

    /// Reset the Bollinger Bands, clearing all values
    pub fn reset(&mut self) {
        self.prices.clear();
        self.sma.reset();
    }
}

/// Rolling population standard deviation
#[derive(Debug, Clone)]
pub struct StandardDeviation {
    period: usize,
    values: VecDeque<f64>,
}

impl StandardDeviation {
    /// Create a new StandardDeviation with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period + 1),
        })
    }

    /// Update the StandardDeviation with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Standard deviation input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);
        if self.values.len() > self.period {
            self.values.pop_front();
        }

        Ok(())
    }

    /// Get the current standard deviation
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data to calculate standard deviation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        let mean = self.values.iter().sum::<f64>() / self.values.len() as f64;
        Ok(population_std_dev(&self.values, mean))
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the StandardDeviation, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
    }
}
