//! Utility functions for the price_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded shuffled split of `0..n` into `(train, holdout)` index sets
///
/// The holdout gets `round(n × ratio)` indices, at least one when `ratio > 0`
/// and `n ≥ 2`, and never all of them.
pub fn train_holdout_split(n: usize, holdout_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    if n < 2 || holdout_ratio <= 0.0 {
        return (indices, Vec::new());
    }

    let holdout = ((n as f64 * holdout_ratio).round() as usize).clamp(1, n - 1);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let held_out = indices.split_off(n - holdout);
    (indices, held_out)
}

/// How forecast dates advance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStep {
    /// Every calendar day
    #[default]
    CalendarDay,
    /// Monday to Friday only
    TradingDay,
}

impl DateStep {
    /// The date following `date`
    pub fn next(self, date: NaiveDate) -> Result<NaiveDate> {
        let mut next = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ForecastError::DataError(format!("No date after {}", date)))?;

        if self == DateStep::TradingDay {
            let skip = match next.weekday() {
                Weekday::Sat => 2,
                Weekday::Sun => 1,
                _ => 0,
            };
            next = next
                .checked_add_days(Days::new(skip))
                .ok_or_else(|| ForecastError::DataError(format!("No date after {}", date)))?;
        }
        Ok(next)
    }
}
