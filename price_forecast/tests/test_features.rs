use pretty_assertions::assert_eq;
use price_forecast::data::synthetic;
use price_forecast::error::ForecastError;
use price_forecast::features::{
    FeatureAccess, FeatureWindow, FeatureWindower, Field, TrainingSet, FEATURES_PER_DAY,
};
use price_forecast::indicators::IndicatorEngine;
use proptest::prelude::*;

#[test]
fn test_window_contents_and_targets() {
    let series = synthetic::linear("LIN", 45, 100.0, 1.0).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();
    let set = FeatureWindower::new(3).unwrap().build(&rows).unwrap();

    // first complete row is 29, so the first window is rows 29..32
    assert_eq!(set.len(), 45 - 30 - 3);
    let first = &set.features()[0];
    assert_eq!(first.len(), 3 * FEATURES_PER_DAY);
    assert_eq!(first.feature(Field::Close.index()), 129.0);
    assert_eq!(first.feature(2 * FEATURES_PER_DAY + Field::Close.index()), 131.0);
    assert_eq!(
        first.feature(FEATURES_PER_DAY + Field::Volume.index()),
        series.bars()[30].volume as f64
    );

    // target is the close of row 33, one row past the window's end
    assert_eq!(set.targets()[0], 133.0);
    assert_eq!(set.target_dates()[0], series.bars()[33].date);
    assert_eq!(*set.targets().last().unwrap(), series.last().close);
}

#[test]
fn test_build_is_deterministic() {
    let series = synthetic::random_walk("SYN", 70, 20.0, 0.02, 4).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();
    let windower = FeatureWindower::new(7).unwrap();

    assert_eq!(windower.build(&rows).unwrap(), windower.build(&rows).unwrap());
}

#[test]
fn test_lookback_longer_than_series() {
    let series = synthetic::random_walk("SYN", 20, 20.0, 0.02, 4).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();

    assert!(matches!(
        FeatureWindower::new(30).unwrap().build(&rows),
        Err(ForecastError::InsufficientHistory {
            required: 32,
            available: 20
        })
    ));
    assert!(matches!(
        FeatureWindower::new(5).unwrap().build(&[]),
        Err(ForecastError::EmptySeries)
    ));
    assert!(FeatureWindower::new(0).is_err());
}

#[test]
fn test_huge_lookback_is_insufficient_history() {
    let series = synthetic::random_walk("SYN", 50, 20.0, 0.02, 4).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();
    let windower = FeatureWindower::new(usize::MAX).unwrap();

    assert_eq!(windower.min_history(), usize::MAX);
    assert!(matches!(
        windower.build(&rows),
        Err(ForecastError::InsufficientHistory {
            required: usize::MAX,
            available: 50
        })
    ));
    assert!(windower.latest(&rows).is_none());
    assert_eq!(TrainingSet::new(usize::MAX).n_features(), usize::MAX);
}

#[test]
fn test_latest_window_ends_at_last_row() {
    let series = synthetic::linear("LIN", 40, 100.0, 1.0).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();
    let windower = FeatureWindower::new(4).unwrap();

    let latest = windower.latest(&rows).unwrap();
    assert_eq!(latest.len(), 4 * FEATURES_PER_DAY);
    assert_eq!(latest.feature(3 * FEATURES_PER_DAY + Field::Close.index()), 139.0);

    // rows 25..29 include incomplete rows
    assert!(windower.latest(&rows[..29]).is_none());
}

#[test]
fn test_ring_window_matches_shifted_vector() {
    let series = synthetic::random_walk("SYN", 60, 20.0, 0.02, 8).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();
    let windower = FeatureWindower::new(5).unwrap();

    let start = windower.latest(&rows[..50]).unwrap();
    let mut window = FeatureWindow::from_vector(&start).unwrap();
    for row in &rows[50..57] {
        window.push_day(&row.day_features().unwrap());
    }

    assert_eq!(window.to_vector(), windower.latest(&rows[..57]).unwrap());
    assert_eq!(window.feature_len(), 5 * FEATURES_PER_DAY);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_window_row_count(len in 40usize..120, lookback in 1usize..12, seed in 0u64..1000) {
        let series = synthetic::random_walk("SYN", len, 50.0, 0.02, seed).unwrap();
        let rows = IndicatorEngine::new().compute(&series).unwrap();
        let warm_up = IndicatorEngine::new().warm_up();
        let set = FeatureWindower::new(lookback).unwrap().build(&rows).unwrap();

        // every window index i in lookback..=len-2 minus those touching warm-up rows
        let expected = (len - 1).saturating_sub(lookback + warm_up);
        prop_assert_eq!(set.len(), expected);
        prop_assert!(set.features().iter().all(|f| f.len() == lookback * FEATURES_PER_DAY));
        prop_assert_eq!(set.feature_names().len(), lookback * FEATURES_PER_DAY);
    }
}
