use price_forecast::data::synthetic;
use price_forecast::features::FeatureWindower;
use price_forecast::indicators::IndicatorEngine;
use price_forecast::models::{EnsembleRegressor, ForecastModel, ForestConfig};
use price_forecast::report::ForecastSummary;
use price_forecast::{DateStep, RecursiveForecaster};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Price Forecast: Basic Forecasting Example");
    println!("=========================================\n");

    // Two years of a seeded random walk
    let series = synthetic::random_walk("DEMO", 500, 100.0, 0.015, 42)?;
    println!(
        "Sample data created: {} daily bars, last close {:.2}\n",
        series.len(),
        series.last().close
    );

    // Indicators and feature windows
    let rows = IndicatorEngine::new().compute(&series)?;
    let windower = FeatureWindower::new(20)?;
    let training = windower.build(&rows)?;
    println!(
        "Training windows: {} of {} features each\n",
        training.len(),
        training.n_features()
    );

    // Fit a small forest
    let mut model = ForecastModel::random_forest(ForestConfig {
        n_estimators: 50,
        ..ForestConfig::default()
    });
    let diagnostics = model.train(&training, 42)?;
    println!(
        "Holdout: MSE {:.4}, MAE {:.4}, MAPE {:?}\n",
        diagnostics.mse, diagnostics.mae, diagnostics.mape
    );

    println!("Most important features:");
    for (name, importance) in model.regressor().ranked_importances(&training).iter().take(5) {
        println!("  {:<20} {:.4}", name, importance);
    }
    println!("  ({} trees)\n", model.regressor().member_count());

    // Roll the forecast forward over trading days
    let last_features = training
        .last_features()
        .ok_or("no training windows")?;
    let last_row = rows.last().ok_or("no indicator rows")?;
    let forecast = RecursiveForecaster::new()
        .with_date_step(DateStep::TradingDay)
        .forecast(&model, last_features, last_row, 10)?;

    let last_bar = series.last();
    println!(
        "{}",
        ForecastSummary::new(series.symbol(), last_bar.date, last_bar.close, &forecast.steps)
    );

    Ok(())
}
