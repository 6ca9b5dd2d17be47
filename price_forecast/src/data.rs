//! Daily price data handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Days, Months, NaiveDate};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

pub mod synthetic;

/// One trading day's OHLCV record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: u64,
}

impl Bar {
    /// Create a new bar
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn validate(&self) -> Result<()> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(ForecastError::DataError(format!(
                "Bar on {} has a non-positive or non-finite price",
                self.date
            )));
        }
        if self.high < self.low {
            return Err(ForecastError::DataError(format!(
                "Bar on {} has high {} below low {}",
                self.date, self.high, self.low
            )));
        }
        Ok(())
    }
}

/// Chronologically ordered daily bars for a single symbol
///
/// Read-only once built: dates are strictly increasing and every price is a
/// finite positive number.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validate and wrap a sequence of bars
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self> {
        if bars.is_empty() {
            return Err(ForecastError::EmptySeries);
        }

        for bar in &bars {
            bar.validate()?;
        }

        if let Some(pair) = bars.windows(2).find(|pair| pair[1].date <= pair[0].date) {
            return Err(ForecastError::DataError(format!(
                "Bar dates must be strictly increasing, found {} after {}",
                pair[1].date, pair[0].date
            )));
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// Symbol the bars belong to
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All bars, oldest first
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Number of bars
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false: an empty series cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar
    pub fn last(&self) -> &Bar {
        // Non-empty by construction
        &self.bars[self.bars.len() - 1]
    }

    /// Close prices as a vector
    pub fn close_prices(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Restrict the series to bars inside `period`, measured back from the last bar
    pub fn within(&self, period: HistoryPeriod) -> Result<Self> {
        let bars: Vec<Bar> = match period.start_date(self.last().date) {
            Some(start) => self
                .bars
                .iter()
                .filter(|bar| bar.date >= start)
                .copied()
                .collect(),
            None => self.bars.clone(),
        };

        Self::new(self.symbol.clone(), bars)
    }
}

/// Length of history to request, written like `30d`, `6mo`, `1y`, `ytd` or `max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HistoryPeriod {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Default for HistoryPeriod {
    fn default() -> Self {
        HistoryPeriod::Years(1)
    }
}

impl HistoryPeriod {
    /// First date included in the period ending at `end`, or `None` for unbounded history
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        match *self {
            HistoryPeriod::Days(n) => end.checked_sub_days(Days::new(u64::from(n))),
            HistoryPeriod::Weeks(n) => end.checked_sub_days(Days::new(7 * u64::from(n))),
            HistoryPeriod::Months(n) => end.checked_sub_months(Months::new(n)),
            HistoryPeriod::Years(n) => end.checked_sub_months(Months::new(12 * n)),
            HistoryPeriod::YearToDate => NaiveDate::from_ymd_opt(end.year(), 1, 1),
            HistoryPeriod::Max => None,
        }
    }
}

impl FromStr for HistoryPeriod {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "ytd" => return Ok(HistoryPeriod::YearToDate),
            "max" => return Ok(HistoryPeriod::Max),
            _ => {}
        }

        let split = lower
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ForecastError::InvalidParameter(format!("Missing period unit in '{}'", s)))?;
        let (count, unit) = lower.split_at(split);
        let count: u32 = count
            .parse()
            .map_err(|_| ForecastError::InvalidParameter(format!("Invalid period count in '{}'", s)))?;
        if count == 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Period '{}' must be positive",
                s
            )));
        }

        match unit {
            "d" => Ok(HistoryPeriod::Days(count)),
            "wk" | "w" => Ok(HistoryPeriod::Weeks(count)),
            "mo" => Ok(HistoryPeriod::Months(count)),
            "y" => Ok(HistoryPeriod::Years(count)),
            _ => Err(ForecastError::InvalidParameter(format!(
                "Unsupported period unit '{}' in '{}'",
                unit, s
            ))),
        }
    }
}

impl TryFrom<String> for HistoryPeriod {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<HistoryPeriod> for String {
    fn from(period: HistoryPeriod) -> Self {
        period.to_string()
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryPeriod::Days(n) => write!(f, "{}d", n),
            HistoryPeriod::Weeks(n) => write!(f, "{}wk", n),
            HistoryPeriod::Months(n) => write!(f, "{}mo", n),
            HistoryPeriod::Years(n) => write!(f, "{}y", n),
            HistoryPeriod::YearToDate => write!(f, "ytd"),
            HistoryPeriod::Max => write!(f, "max"),
        }
    }
}

/// Anything that can supply daily bars for a symbol
pub trait PriceSource {
    /// Fetch bars for `symbol` covering `period`, oldest first
    fn fetch(&self, symbol: &str, period: HistoryPeriod) -> Result<PriceSeries>;
}

/// Row layout of a price CSV file
#[derive(Debug, Deserialize)]
struct BarRecord {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<BarRecord> for Bar {
    fn from(record: BarRecord) -> Self {
        Bar {
            date: record.date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume.max(0.0).round() as u64,
        }
    }
}

/// Data loader for daily bar CSV files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load bars from a CSV file with a `date,open,high,low,close,volume` header
    ///
    /// Header names are matched case-insensitively. Rows must already be in
    /// ascending date order.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let bars = Self::from_reader(file)?;
        info!(path = %path.display(), bars = bars.len(), "loaded price bars");
        Ok(bars)
    }

    /// Load bars from any CSV reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Bar>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: StringRecord = rdr
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        rdr.set_headers(headers);

        let mut bars = Vec::new();
        for record in rdr.deserialize::<BarRecord>() {
            bars.push(Bar::from(record?));
        }

        debug!(rows = bars.len(), "parsed csv rows");
        Ok(bars)
    }
}

/// Reads `<dir>/<SYMBOL>.csv` files
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    dir: PathBuf,
}

impl CsvPriceSource {
    /// Create a source rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path the source reads for `symbol`
    pub fn path_for(&self, symbol: &str) -> Result<PathBuf> {
        if symbol.is_empty() || symbol.contains(|c: char| c == '/' || c == '\\') || symbol.contains("..") {
            return Err(ForecastError::InvalidParameter(format!(
                "Invalid symbol '{}'",
                symbol
            )));
        }
        Ok(self.dir.join(format!("{}.csv", symbol)))
    }
}

impl PriceSource for CsvPriceSource {
    fn fetch(&self, symbol: &str, period: HistoryPeriod) -> Result<PriceSeries> {
        let bars = DataLoader::from_csv(self.path_for(symbol)?)?;
        PriceSeries::new(symbol, bars)?.within(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("30d".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::Days(30));
        assert_eq!("2wk".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::Weeks(2));
        assert_eq!("6mo".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::Months(6));
        assert_eq!("1Y".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::Years(1));
        assert_eq!("ytd".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::YearToDate);
        assert_eq!("max".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::Max);

        assert!("y".parse::<HistoryPeriod>().is_err());
        assert!("0d".parse::<HistoryPeriod>().is_err());
        assert!("5q".parse::<HistoryPeriod>().is_err());
        assert!("12".parse::<HistoryPeriod>().is_err());
    }

    #[test]
    fn test_period_start_dates() {
        let end = date(2024, 3, 31);
        assert_eq!(HistoryPeriod::Days(1).start_date(end), Some(date(2024, 3, 30)));
        assert_eq!(HistoryPeriod::Months(1).start_date(end), Some(date(2024, 2, 29)));
        assert_eq!(HistoryPeriod::Years(1).start_date(end), Some(date(2023, 3, 31)));
        assert_eq!(HistoryPeriod::YearToDate.start_date(end), Some(date(2024, 1, 1)));
        assert_eq!(HistoryPeriod::Max.start_date(end), None);
        assert_eq!(HistoryPeriod::Months(6).to_string(), "6mo");
    }

    #[test]
    fn test_series_rejects_unordered_dates() {
        let bars = vec![
            Bar::new(date(2024, 1, 2), 1.0, 1.0, 1.0, 1.0, 10),
            Bar::new(date(2024, 1, 2), 1.0, 1.0, 1.0, 1.0, 10),
        ];
        assert!(matches!(
            PriceSeries::new("X", bars),
            Err(ForecastError::DataError(_))
        ));
        assert!(matches!(
            PriceSeries::new("X", Vec::new()),
            Err(ForecastError::EmptySeries)
        ));
    }

    #[test]
    fn test_csv_source_rejects_path_like_symbols() {
        let source = CsvPriceSource::new("/tmp");
        assert!(source.path_for("../etc/passwd").is_err());
        assert!(source.path_for("").is_err());
        assert_eq!(
            source.path_for("AAPL").unwrap(),
            PathBuf::from("/tmp").join("AAPL.csv")
        );
    }
}
