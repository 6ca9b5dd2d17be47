//! Seeded synthetic price series for demos and tests

use crate::data::{Bar, PriceSeries};
use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Calendar date `offset` days after `start`
fn day(start: NaiveDate, offset: usize) -> Result<NaiveDate> {
    start
        .checked_add_days(Days::new(offset as u64))
        .ok_or_else(|| ForecastError::DataError(format!("Date overflow at offset {}", offset)))
}

/// Default first date used by the generators
pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default()
}

/// Bars whose open, high, low and close all equal `price`
pub fn constant(symbol: &str, num_points: usize, price: f64, volume: u64) -> Result<PriceSeries> {
    let start = default_start();
    let bars = (0..num_points)
        .map(|i| Ok(Bar::new(day(start, i)?, price, price, price, price, volume)))
        .collect::<Result<Vec<_>>>()?;

    PriceSeries::new(symbol, bars)
}

/// Close rises by `step` every day starting at `start_price`
///
/// Open equals the previous close, high and low sit half a step around the bar.
pub fn linear(symbol: &str, num_points: usize, start_price: f64, step: f64) -> Result<PriceSeries> {
    let start = default_start();
    let bars = (0..num_points)
        .map(|i| {
            let close = start_price + step * i as f64;
            let open = if i == 0 { close } else { close - step };
            let high = open.max(close) + step.abs() / 2.0;
            let low = open.min(close) - step.abs() / 2.0;
            Ok(Bar::new(day(start, i)?, open, high, low, close, 10_000 + i as u64))
        })
        .collect::<Result<Vec<_>>>()?;

    PriceSeries::new(symbol, bars)
}

/// Geometric random walk with normally distributed daily returns
///
/// # Arguments
/// * `num_points` - Number of bars to generate
/// * `starting_price` - Close of the first bar
/// * `volatility` - Standard deviation of the daily return
/// * `seed` - RNG seed; equal seeds give equal series
pub fn random_walk(
    symbol: &str,
    num_points: usize,
    starting_price: f64,
    volatility: f64,
    seed: u64,
) -> Result<PriceSeries> {
    if !(starting_price.is_finite() && starting_price > 0.0) {
        return Err(ForecastError::InvalidParameter(
            "Starting price must be positive".to_string(),
        ));
    }
    if !(volatility.is_finite() && volatility >= 0.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Volatility must be non-negative, got {}",
            volatility
        )));
    }

    let returns = Normal::new(0.0, volatility).map_err(|e| {
        ForecastError::InvalidParameter(format!("Invalid volatility {}: {}", volatility, e))
    })?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let start = default_start();

    let mut bars = Vec::with_capacity(num_points);
    let mut current_price = starting_price;

    for i in 0..num_points {
        let open = current_price;
        let close = (open * (1.0 + returns.sample(&mut rng))).max(0.01);

        let high = open.max(close) * (1.0 + rng.gen::<f64>() * volatility * 0.5);
        let low = open.min(close) * (1.0 - rng.gen::<f64>() * volatility * 0.5);
        let volume = rng.gen_range(1_000..10_000);

        bars.push(Bar::new(day(start, i)?, open, high, low.max(0.01), close, volume));
        current_price = close;
    }

    PriceSeries::new(symbol, bars)
}
