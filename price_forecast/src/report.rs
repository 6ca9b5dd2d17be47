//! Human-readable forecast summaries

use crate::confidence::ConfidenceLevel;
use crate::forecaster::ForecastStep;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Half-width of the display band at zero confidence, as a fraction of the price
pub const BAND_SCALE: f64 = 0.15;

/// Direction of the whole forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    StrongBullish,
    Bullish,
    Sideways,
    Bearish,
    StrongBearish,
}

impl Trend {
    /// Classify a total percentage change
    pub fn from_change_pct(change_pct: f64) -> Self {
        if change_pct > 5.0 {
            Trend::StrongBullish
        } else if change_pct > 2.0 {
            Trend::Bullish
        } else if change_pct > -2.0 {
            Trend::Sideways
        } else if change_pct > -5.0 {
            Trend::Bearish
        } else {
            Trend::StrongBearish
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::StrongBullish => "Strong Bullish",
            Trend::Bullish => "Bullish",
            Trend::Sideways => "Sideways",
            Trend::Bearish => "Bearish",
            Trend::StrongBearish => "Strong Bearish",
        };
        f.pad(label)
    }
}

/// One row of the summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub date: NaiveDate,
    pub predicted_close: f64,
    /// Change from the previous prediction, or from the last close on day one
    pub day_change: f64,
    pub day_change_pct: f64,
    /// Change from the last observed close
    pub cumulative_change_pct: f64,
    pub confidence: f64,
    pub level: ConfidenceLevel,
    pub band_low: f64,
    pub band_high: f64,
}

/// Forecast relative to the last observed close
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub symbol: String,
    pub last_date: NaiveDate,
    pub last_close: f64,
    pub lines: Vec<SummaryLine>,
    /// `None` for an empty forecast
    pub final_close: Option<f64>,
    pub total_change_pct: f64,
    pub trend: Trend,
}

fn pct(change: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        change / base * 100.0
    }
}

impl ForecastSummary {
    /// Summarize `steps` against the last observed bar
    pub fn new(symbol: &str, last_date: NaiveDate, last_close: f64, steps: &[ForecastStep]) -> Self {
        let mut previous = last_close;
        let lines: Vec<SummaryLine> = steps
            .iter()
            .map(|step| {
                let price = step.predicted_close;
                let day_change = price - previous;
                let half_width = BAND_SCALE * (1.0 - step.confidence);
                let line = SummaryLine {
                    date: step.date,
                    predicted_close: price,
                    day_change,
                    day_change_pct: pct(day_change, previous),
                    cumulative_change_pct: pct(price - last_close, last_close),
                    confidence: step.confidence,
                    level: ConfidenceLevel::from_score(step.confidence),
                    band_low: price * (1.0 - half_width),
                    band_high: price * (1.0 + half_width),
                };
                previous = price;
                line
            })
            .collect();

        let final_close = lines.last().map(|line| line.predicted_close);
        let total_change_pct = final_close.map_or(0.0, |close| pct(close - last_close, last_close));

        Self {
            symbol: symbol.to_string(),
            last_date,
            last_close,
            lines,
            final_close,
            total_change_pct,
            trend: Trend::from_change_pct(total_change_pct),
        }
    }
}

impl fmt::Display for ForecastSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} forecast", self.symbol)?;
        writeln!(f, "Last close ({}): {:.2}", self.last_date, self.last_close)?;
        writeln!(
            f,
            "{:<12} {:>10} {:>10} {:>8} {:>10} {:<8} {:>21}",
            "Date", "Close", "Change", "Change%", "Confidence", "Level", "Band"
        )?;
        for line in &self.lines {
            writeln!(
                f,
                "{:<12} {:>10.2} {:>+10.2} {:>+7.2}% {:>9.1}% {:<8} {:>10.2}-{:<10.2}",
                line.date.to_string(),
                line.predicted_close,
                line.day_change,
                line.day_change_pct,
                line.confidence * 100.0,
                line.level,
                line.band_low,
                line.band_high
            )?;
        }
        if let Some(close) = self.final_close {
            writeln!(
                f,
                "Final: {:.2} ({:+.2}%), trend {}",
                close, self.total_change_pct, self.trend
            )?;
        }
        Ok(())
    }
}
