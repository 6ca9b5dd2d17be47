//! Technical indicators derived from a price series
//!
//! [`IndicatorEngine::compute`] walks the bars once, oldest first, feeding the
//! streaming indicators from `trade_math`. Every value on row `i` depends only
//! on bars `0..=i`. Fields that are still warming up are `None`.

use crate::data::{Bar, PriceSeries};
use crate::error::Result;
use crate::features::DayFeatures;
use serde::Serialize;
use trade_math::{BollingerBands, Macd, RelativeStrengthIndex, SimpleMovingAverage, StandardDeviation};
use tracing::debug;

/// Moving average windows, shortest first
pub const MA_WINDOWS: [usize; 4] = [5, 10, 20, 30];
/// RSI lookback in bars
pub const RSI_PERIOD: usize = 14;
/// MACD fast, slow and signal spans
pub const MACD_SPANS: (usize, usize, usize) = (12, 26, 9);
/// Bollinger band window
pub const BOLLINGER_PERIOD: usize = 20;
/// Bollinger band width in standard deviations
pub const BOLLINGER_STD_DEVS: f64 = 2.0;
/// Rolling close volatility window
pub const VOLATILITY_PERIOD: usize = 20;

/// A bar together with its derived indicator fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub bar: Bar,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma30: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_width: Option<f64>,
    pub price_change: Option<f64>,
    pub volume_change: Option<f64>,
    pub volatility20: Option<f64>,
}

impl IndicatorRow {
    /// A row with no derived values yet
    pub fn from_bar(bar: Bar) -> Self {
        Self {
            bar,
            ma5: None,
            ma10: None,
            ma20: None,
            ma30: None,
            rsi14: None,
            macd: None,
            macd_signal: None,
            macd_histogram: None,
            bb_upper: None,
            bb_middle: None,
            bb_lower: None,
            bb_width: None,
            price_change: None,
            volume_change: None,
            volatility20: None,
        }
    }

    /// Whether every feature field is defined
    pub fn is_complete(&self) -> bool {
        self.day_features().is_some()
    }

    /// The row's feature fields in canonical order, if all are defined
    pub fn day_features(&self) -> Option<DayFeatures> {
        DayFeatures::from_row(self)
    }
}

/// Fractional one-step change, undefined when the base is zero or the result is not finite
pub(crate) fn fractional_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    let change = (current - previous) / previous;
    change.is_finite().then_some(change)
}

/// Streaming indicator state for one pass over a series
#[derive(Debug)]
struct IndicatorState {
    moving_averages: [SimpleMovingAverage; 4],
    rsi: RelativeStrengthIndex,
    macd: Macd,
    bollinger: BollingerBands,
    volatility: StandardDeviation,
    previous: Option<Bar>,
}

impl IndicatorState {
    fn new() -> Result<Self> {
        let (fast, slow, signal) = MACD_SPANS;
        Ok(Self {
            moving_averages: [
                SimpleMovingAverage::new(MA_WINDOWS[0])?,
                SimpleMovingAverage::new(MA_WINDOWS[1])?,
                SimpleMovingAverage::new(MA_WINDOWS[2])?,
                SimpleMovingAverage::new(MA_WINDOWS[3])?,
            ],
            rsi: RelativeStrengthIndex::new(RSI_PERIOD)?,
            macd: Macd::new(fast, slow, signal)?,
            bollinger: BollingerBands::new(BOLLINGER_PERIOD, BOLLINGER_STD_DEVS)?,
            volatility: StandardDeviation::new(VOLATILITY_PERIOD)?,
            previous: None,
        })
    }

    fn step(&mut self, bar: Bar) -> Result<IndicatorRow> {
        for ma in &mut self.moving_averages {
            ma.update(bar.close)?;
        }
        self.rsi.update(bar.close)?;
        self.macd.update(bar.close)?;
        self.bollinger.update(bar.close)?;
        self.volatility.update(bar.close)?;

        let [ma5, ma10, ma20, ma30] = &self.moving_averages;
        let row = IndicatorRow {
            bar,
            ma5: ma5.value().ok(),
            ma10: ma10.value().ok(),
            ma20: ma20.value().ok(),
            ma30: ma30.value().ok(),
            rsi14: self.rsi.value().ok(),
            macd: self.macd.macd_value().ok(),
            macd_signal: self.macd.signal_value().ok(),
            macd_histogram: self.macd.histogram().ok(),
            bb_upper: self.bollinger.upper_band().ok(),
            bb_middle: self.bollinger.middle_band().ok(),
            bb_lower: self.bollinger.lower_band().ok(),
            bb_width: self.bollinger.band_width().ok(),
            price_change: self
                .previous
                .and_then(|prev| fractional_change(bar.close, prev.close)),
            volume_change: self
                .previous
                .and_then(|prev| fractional_change(bar.volume as f64, prev.volume as f64)),
            volatility20: self.volatility.value().ok(),
        };

        self.previous = Some(bar);
        Ok(row)
    }
}

/// Computes [`IndicatorRow`]s for a price series
///
/// Stateless between calls: computing the same series twice yields identical rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    /// Create a new engine
    pub fn new() -> Self {
        Self
    }

    /// Index of the first row that can have every field defined
    pub fn warm_up(&self) -> usize {
        let longest = MA_WINDOWS
            .iter()
            .copied()
            .chain([BOLLINGER_PERIOD, VOLATILITY_PERIOD])
            .max()
            .unwrap_or(1);
        // RSI needs `period` changes, i.e. `period + 1` bars
        (longest - 1).max(RSI_PERIOD)
    }

    /// One row per bar, index-aligned with the series
    pub fn compute(&self, series: &PriceSeries) -> Result<Vec<IndicatorRow>> {
        let mut state = IndicatorState::new()?;
        let rows = series
            .bars()
            .iter()
            .map(|bar| state.step(*bar))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            symbol = series.symbol(),
            rows = rows.len(),
            complete = rows.iter().filter(|row| row.is_complete()).count(),
            "computed indicators"
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic;

    #[test]
    fn test_warm_up_index() {
        assert_eq!(IndicatorEngine::new().warm_up(), 29);
    }

    #[test]
    fn test_rows_become_complete_at_warm_up() {
        let series = synthetic::random_walk("SYN", 60, 50.0, 0.02, 3).unwrap();
        let rows = IndicatorEngine::new().compute(&series).unwrap();
        let warm_up = IndicatorEngine::new().warm_up();

        assert_eq!(rows.len(), 60);
        assert!(rows[..warm_up].iter().all(|row| !row.is_complete()));
        assert!(rows[warm_up..].iter().all(|row| row.is_complete()));
    }

    #[test]
    fn test_individual_warm_ups() {
        let series = synthetic::linear("LIN", 40, 100.0, 1.0).unwrap();
        let rows = IndicatorEngine::new().compute(&series).unwrap();

        assert!(rows[0].price_change.is_none());
        assert!(rows[1].price_change.is_some());
        assert!(rows[3].ma5.is_none());
        assert!(rows[4].ma5.is_some());
        assert!(rows[13].rsi14.is_none());
        assert_eq!(rows[14].rsi14, Some(100.0));
        assert!(rows[18].bb_upper.is_none());
        assert!(rows[19].volatility20.is_some());
        assert!(rows[28].ma30.is_none());
        assert!(rows[0].macd.is_some());

        // MA5 at index 4 is the mean of closes 100..=104
        assert_eq!(rows[4].ma5, Some(102.0));
    }

    #[test]
    fn test_zero_volume_change_is_undefined() {
        let series = synthetic::constant("FLAT", 3, 10.0, 0).unwrap();
        let rows = IndicatorEngine::new().compute(&series).unwrap();
        assert!(rows[1].volume_change.is_none());
        assert_eq!(rows[1].price_change, Some(0.0));
    }
}
