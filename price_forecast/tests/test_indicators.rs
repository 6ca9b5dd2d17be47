use approx::assert_relative_eq;
use price_forecast::data::synthetic;
use price_forecast::indicators::IndicatorEngine;
use rstest::rstest;

#[test]
fn test_constant_series_indicators() {
    let series = synthetic::constant("FLAT", 40, 100.0, 5_000).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();
    let warm_up = IndicatorEngine::new().warm_up();

    assert_eq!(rows.len(), 40);
    for row in &rows[warm_up..] {
        assert!(row.is_complete());
        assert_eq!(row.ma5, Some(100.0));
        assert_eq!(row.ma10, Some(100.0));
        assert_eq!(row.ma20, Some(100.0));
        assert_eq!(row.ma30, Some(100.0));
        assert_eq!(row.rsi14, Some(100.0));
        assert_eq!(row.macd, Some(0.0));
        assert_eq!(row.bb_width, Some(0.0));
        assert_eq!(row.volatility20, Some(0.0));
        assert_eq!(row.price_change, Some(0.0));
        assert_eq!(row.volume_change, Some(0.0));
    }
    assert!(rows[..warm_up].iter().all(|row| !row.is_complete()));
}

#[test]
fn test_compute_is_idempotent() {
    let series = synthetic::random_walk("SYN", 90, 40.0, 0.03, 17).unwrap();
    let engine = IndicatorEngine::new();

    let first = engine.compute(&series).unwrap();
    let second = engine.compute(&series).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_rows_only_depend_on_the_past() {
    let series = synthetic::random_walk("SYN", 80, 40.0, 0.03, 21).unwrap();
    let prefix = price_forecast::PriceSeries::new("SYN", series.bars()[..50].to_vec()).unwrap();

    let full = IndicatorEngine::new().compute(&series).unwrap();
    let partial = IndicatorEngine::new().compute(&prefix).unwrap();
    assert_eq!(&full[..50], partial.as_slice());
}

#[rstest]
#[case(4, 102.0)]
#[case(9, 104.5)]
#[case(19, 109.5)]
#[case(29, 114.5)]
fn test_moving_averages_on_linear_series(#[case] index: usize, #[case] expected: f64) {
    let series = synthetic::linear("LIN", 40, 100.0, 1.0).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();

    let windows = [
        (rows[index].ma5, 4),
        (rows[index].ma10, 9),
        (rows[index].ma20, 19),
        (rows[index].ma30, 29),
    ];
    for (value, first_index) in windows {
        if first_index == index {
            assert_relative_eq!(value.unwrap(), expected);
        } else if first_index > index {
            assert!(value.is_none());
        }
    }
}

#[test]
fn test_bollinger_bands_on_linear_series() {
    let series = synthetic::linear("LIN", 40, 100.0, 1.0).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();
    let row = &rows[19];

    // closes 100..=119: mean 109.5, population variance (20² - 1) / 12
    let std_dev = (399.0f64 / 12.0).sqrt();
    assert_relative_eq!(row.bb_middle.unwrap(), 109.5);
    assert_relative_eq!(row.bb_upper.unwrap(), 109.5 + 2.0 * std_dev, epsilon = 1e-9);
    assert_relative_eq!(row.bb_lower.unwrap(), 109.5 - 2.0 * std_dev, epsilon = 1e-9);
    assert_relative_eq!(row.bb_width.unwrap(), 4.0 * std_dev / 109.5, epsilon = 1e-9);
    assert_relative_eq!(row.volatility20.unwrap(), std_dev, epsilon = 1e-9);
}

#[test]
fn test_rsi_reflects_losses() {
    let series = synthetic::linear("DOWN", 20, 100.0, -1.0).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();
    assert_relative_eq!(rows[14].rsi14.unwrap(), 0.0);
    assert!(rows[15].macd.unwrap() < 0.0);
}

#[rstest]
#[case(11, 0.0, 0.0)]
#[case(12, 0.5, 0.1)]
#[case(13, 1.0, 0.28)]
#[case(25, 7.0, 5.08796093022208)]
#[case(39, 7.0, 6.915907632400687)]
fn test_macd_on_linear_series(#[case] index: usize, #[case] macd: f64, #[case] signal: f64) {
    // both EMAs are expanding means until seeded, so MACD is zero through index 11
    // and settles at the lag difference (26 - 12) / 2 once the slow EMA is seeded
    let series = synthetic::linear("LIN", 40, 100.0, 1.0).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();
    let row = &rows[index];

    assert_relative_eq!(row.macd.unwrap(), macd, epsilon = 1e-9);
    assert_relative_eq!(row.macd_signal.unwrap(), signal, epsilon = 1e-9);
    assert_relative_eq!(row.macd_histogram.unwrap(), macd - signal, epsilon = 1e-9);
}
