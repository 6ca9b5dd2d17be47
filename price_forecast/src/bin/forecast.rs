//! Command-line price forecast
//!
//! ```text
//! forecast --csv-dir data --symbol AAPL --period 1y --predict-days 10
//! forecast --synthetic --json
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use price_forecast::data::synthetic;
use price_forecast::{
    CsvPriceSource, DateStep, ForecastConfig, ForecastPipeline, HistoryPeriod, PriceSeries,
    PriceSource,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forecast", about = "Recursive random-forest forecast of daily closes")]
struct Cli {
    /// Directory holding <SYMBOL>.csv files
    #[arg(long, default_value = "data")]
    csv_dir: PathBuf,

    /// Symbol to forecast
    #[arg(long, default_value = "AAPL")]
    symbol: String,

    /// History to train on (e.g. 6mo, 1y, 2y, ytd, max)
    #[arg(long, default_value = "1y")]
    period: HistoryPeriod,

    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Days to forecast (1-90)
    #[arg(long)]
    predict_days: Option<usize>,

    /// Trailing days per feature window
    #[arg(long)]
    lookback_days: Option<usize>,

    /// Trees in the forest
    #[arg(long)]
    n_estimators: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Skip weekends when dating forecast steps
    #[arg(long)]
    trading_days: bool,

    /// Use a seeded synthetic random walk instead of CSV data
    #[arg(long)]
    synthetic: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn forecast_config(&self) -> Result<ForecastConfig> {
        let mut config = match &self.config {
            Some(path) => ForecastConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ForecastConfig::default(),
        };

        if let Some(days) = self.predict_days {
            config.predict_days = days;
        }
        if let Some(days) = self.lookback_days {
            config.lookback_days = days;
        }
        if let Some(n) = self.n_estimators {
            config.n_estimators = n;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.trading_days {
            config.date_step = DateStep::TradingDay;
        }

        config.validate()?;
        Ok(config)
    }

    fn load_series(&self) -> Result<PriceSeries> {
        if self.synthetic {
            return Ok(synthetic::random_walk(&self.symbol, 365, 100.0, 0.015, 42)?);
        }
        if !self.csv_dir.is_dir() {
            bail!("CSV directory {} does not exist", self.csv_dir.display());
        }
        let source = CsvPriceSource::new(&self.csv_dir);
        source
            .fetch(&self.symbol, self.period)
            .with_context(|| format!("loading {} for {}", self.symbol, self.period))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.forecast_config()?;
    let series = cli.load_series()?;
    info!(symbol = %cli.symbol, bars = series.len(), "loaded history");

    let report = ForecastPipeline::new(config)?
        .run(&series)
        .with_context(|| format!("forecasting {}", cli.symbol))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary);
        let d = &report.diagnostics;
        match d.mape {
            Some(mape) => println!(
                "Holdout: MSE {:.4}  MAE {:.4}  MAPE {:.2}% ({} samples)",
                d.mse, d.mae, mape, d.holdout_samples
            ),
            None => println!(
                "Holdout: MSE {:.4}  MAE {:.4}  MAPE n/a ({} samples)",
                d.mse, d.mae, d.holdout_samples
            ),
        }
    }
    Ok(())
}
