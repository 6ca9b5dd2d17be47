//! Feature windows built from indicator rows
//!
//! A feature vector is `lookback_days` consecutive days flattened in the
//! canonical [`Field`] order, oldest day first.

use crate::error::{ForecastError, Result};
use crate::indicators::IndicatorRow;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Number of fields contributed by each day
pub const FEATURES_PER_DAY: usize = 19;

/// One field of a day's feature block, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
    Ma5,
    Ma10,
    Ma20,
    Ma30,
    Rsi14,
    Macd,
    MacdSignal,
    MacdHistogram,
    BbUpper,
    BbLower,
    BbWidth,
    PriceChange,
    VolumeChange,
    Volatility20,
}

impl Field {
    /// Every field in canonical order
    pub const ALL: [Field; FEATURES_PER_DAY] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
        Field::Ma5,
        Field::Ma10,
        Field::Ma20,
        Field::Ma30,
        Field::Rsi14,
        Field::Macd,
        Field::MacdSignal,
        Field::MacdHistogram,
        Field::BbUpper,
        Field::BbLower,
        Field::BbWidth,
        Field::PriceChange,
        Field::VolumeChange,
        Field::Volatility20,
    ];

    /// Position within a day's block
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short column name
    pub fn name(self) -> &'static str {
        match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
            Field::Ma5 => "ma5",
            Field::Ma10 => "ma10",
            Field::Ma20 => "ma20",
            Field::Ma30 => "ma30",
            Field::Rsi14 => "rsi14",
            Field::Macd => "macd",
            Field::MacdSignal => "macd_signal",
            Field::MacdHistogram => "macd_histogram",
            Field::BbUpper => "bb_upper",
            Field::BbLower => "bb_lower",
            Field::BbWidth => "bb_width",
            Field::PriceChange => "price_change",
            Field::VolumeChange => "volume_change",
            Field::Volatility20 => "volatility20",
        }
    }
}

/// A single day's fields, all defined
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayFeatures([f64; FEATURES_PER_DAY]);

impl DayFeatures {
    /// Flatten a complete indicator row; `None` if any field is undefined
    pub fn from_row(row: &IndicatorRow) -> Option<Self> {
        let values = [
            Some(row.bar.open),
            Some(row.bar.high),
            Some(row.bar.low),
            Some(row.bar.close),
            Some(row.bar.volume as f64),
            row.ma5,
            row.ma10,
            row.ma20,
            row.ma30,
            row.rsi14,
            row.macd,
            row.macd_signal,
            row.macd_histogram,
            row.bb_upper,
            row.bb_lower,
            row.bb_width,
            row.price_change,
            row.volume_change,
            row.volatility20,
        ];

        let mut out = [0.0; FEATURES_PER_DAY];
        for (slot, value) in out.iter_mut().zip(values) {
            *slot = value.filter(|v| v.is_finite())?;
        }
        Some(Self(out))
    }

    /// Value of one field
    pub fn get(&self, field: Field) -> f64 {
        self.0[field.index()]
    }

    /// All fields in canonical order
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Read access to a flattened feature vector by position
pub trait FeatureAccess {
    /// Total number of features
    fn feature_len(&self) -> usize;

    /// Feature at `index`, counting from the oldest day's first field
    fn feature(&self, index: usize) -> f64;
}

impl FeatureAccess for [f64] {
    fn feature_len(&self) -> usize {
        self.len()
    }

    fn feature(&self, index: usize) -> f64 {
        self[index]
    }
}

/// Owned, flattened feature vector of `lookback_days × FEATURES_PER_DAY` values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap raw values
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Values, oldest day first
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector has no values
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FeatureAccess for FeatureVector {
    fn feature_len(&self) -> usize {
        self.0.len()
    }

    fn feature(&self, index: usize) -> f64 {
        self.0[index]
    }
}

/// Feature vectors paired with next-but-one-day close targets
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    lookback_days: usize,
    features: Vec<FeatureVector>,
    targets: Vec<f64>,
    target_dates: Vec<NaiveDate>,
}

impl TrainingSet {
    /// An empty set for windows of `lookback_days`
    pub fn new(lookback_days: usize) -> Self {
        Self {
            lookback_days,
            features: Vec::new(),
            targets: Vec::new(),
            target_dates: Vec::new(),
        }
    }

    /// Add one sample; the vector must match the set's width
    pub fn push(&mut self, features: FeatureVector, target: f64, target_date: NaiveDate) -> Result<()> {
        if features.len() != self.n_features() {
            return Err(ForecastError::DataError(format!(
                "Feature vector has {} values, expected {}",
                features.len(),
                self.n_features()
            )));
        }
        self.features.push(features);
        self.targets.push(target);
        self.target_dates.push(target_date);
        Ok(())
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the set has no samples
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Days per window
    pub fn lookback_days(&self) -> usize {
        self.lookback_days
    }

    /// Width of every feature vector
    pub fn n_features(&self) -> usize {
        self.lookback_days.saturating_mul(FEATURES_PER_DAY)
    }

    pub fn features(&self) -> &[FeatureVector] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn target_dates(&self) -> &[NaiveDate] {
        &self.target_dates
    }

    /// The most recent window
    pub fn last_features(&self) -> Option<&FeatureVector> {
        self.features.last()
    }

    /// A new set holding the samples at `indices`, in that order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            lookback_days: self.lookback_days,
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
            target_dates: indices.iter().map(|&i| self.target_dates[i]).collect(),
        }
    }

    /// Column names such as `close_t-1` for the newest day in the window
    pub fn feature_names(&self) -> Vec<String> {
        (0..self.lookback_days)
            .flat_map(|day| {
                let lag = self.lookback_days - day;
                Field::ALL
                    .iter()
                    .map(move |field| format!("{}_t-{}", field.name(), lag))
            })
            .collect()
    }
}

/// Turns indicator rows into a [`TrainingSet`]
#[derive(Debug, Clone, Copy)]
pub struct FeatureWindower {
    lookback_days: usize,
}

impl FeatureWindower {
    /// Create a windower for `lookback_days` trailing days
    pub fn new(lookback_days: usize) -> Result<Self> {
        if lookback_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "lookback_days must be positive".to_string(),
            ));
        }
        Ok(Self { lookback_days })
    }

    pub fn lookback_days(&self) -> usize {
        self.lookback_days
    }

    /// Fewest rows that can produce a window and its target
    pub fn min_history(&self) -> usize {
        self.lookback_days.saturating_add(2)
    }

    /// Pair window `[i - lookback, i)` with the close of row `i + 1`
    ///
    /// Windows touching an incomplete row are dropped, never imputed.
    pub fn build(&self, rows: &[IndicatorRow]) -> Result<TrainingSet> {
        if rows.is_empty() {
            return Err(ForecastError::EmptySeries);
        }
        if rows.len() < self.min_history() {
            return Err(ForecastError::InsufficientHistory {
                required: self.min_history(),
                available: rows.len(),
            });
        }

        let days: Vec<Option<DayFeatures>> = rows.iter().map(IndicatorRow::day_features).collect();
        let mut set = TrainingSet::new(self.lookback_days);
        let mut dropped = 0usize;

        for i in self.lookback_days..=rows.len() - 2 {
            match self.flatten(&days[i - self.lookback_days..i]) {
                Some(features) => {
                    let target = &rows[i + 1].bar;
                    set.push(features, target.close, target.date)?;
                }
                None => dropped += 1,
            }
        }

        debug!(
            samples = set.len(),
            dropped,
            lookback_days = self.lookback_days,
            "built training windows"
        );
        Ok(set)
    }

    /// The window ending at the last row, used when no target exists yet
    pub fn latest(&self, rows: &[IndicatorRow]) -> Option<FeatureVector> {
        let start = rows.len().checked_sub(self.lookback_days)?;
        let days: Vec<Option<DayFeatures>> =
            rows[start..].iter().map(IndicatorRow::day_features).collect();
        self.flatten(&days)
    }

    fn flatten(&self, days: &[Option<DayFeatures>]) -> Option<FeatureVector> {
        let mut values = Vec::with_capacity(days.len() * FEATURES_PER_DAY);
        for day in days {
            values.extend_from_slice(day.as_ref()?.as_slice());
        }
        Some(FeatureVector::new(values))
    }
}

/// Fixed-size sliding window over a flattened feature vector
///
/// Days are stored in a ring: `head` is the physical slot of the oldest day.
/// Pushing a new day overwrites that slot and advances `head`, so the window
/// never reallocates and each step touches `FEATURES_PER_DAY` values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWindow {
    data: Vec<f64>,
    days: usize,
    head: usize,
}

impl FeatureWindow {
    /// Start from an existing feature vector
    pub fn from_vector(vector: &FeatureVector) -> Result<Self> {
        let len = vector.len();
        if len == 0 || len % FEATURES_PER_DAY != 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Feature vector length {} is not a positive multiple of {}",
                len, FEATURES_PER_DAY
            )));
        }

        Ok(Self {
            data: vector.as_slice().to_vec(),
            days: len / FEATURES_PER_DAY,
            head: 0,
        })
    }

    /// Days held by the window
    pub fn days(&self) -> usize {
        self.days
    }

    /// Drop the oldest day and append `day` as the newest
    pub fn push_day(&mut self, day: &DayFeatures) {
        let start = self.head * FEATURES_PER_DAY;
        self.data[start..start + FEATURES_PER_DAY].copy_from_slice(day.as_slice());
        self.head = (self.head + 1) % self.days;
    }

    /// Linearized copy, oldest day first
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::new((0..self.data.len()).map(|i| self.feature(i)).collect())
    }
}

impl FeatureAccess for FeatureWindow {
    fn feature_len(&self) -> usize {
        self.data.len()
    }

    fn feature(&self, index: usize) -> f64 {
        let day = (self.head + index / FEATURES_PER_DAY) % self.days;
        self.data[day * FEATURES_PER_DAY + index % FEATURES_PER_DAY]
    }
}
