use price_forecast::data::synthetic;
use price_forecast::error::ForecastError;
use price_forecast::features::{FeatureWindower, TrainingSet};
use price_forecast::indicators::IndicatorEngine;
use price_forecast::models::{
    EnsembleRegressor, ForecastModel, ForestConfig, RandomForest, RegressionTree, TreeConfig,
};
use rstest::rstest;

fn training_set(len: usize, lookback: usize, seed: u64) -> TrainingSet {
    let series = synthetic::random_walk("SYN", len, 80.0, 0.02, seed).unwrap();
    let rows = IndicatorEngine::new().compute(&series).unwrap();
    FeatureWindower::new(lookback).unwrap().build(&rows).unwrap()
}

fn forest(n_estimators: usize) -> ForecastModel {
    ForecastModel::random_forest(ForestConfig {
        n_estimators,
        ..ForestConfig::default()
    })
}

#[test]
fn test_training_is_reproducible() {
    let set = training_set(120, 5, 1);
    let mut a = forest(12);
    let mut b = forest(12);

    let diag_a = a.train(&set, 42).unwrap();
    let diag_b = b.train(&set, 42).unwrap();
    assert_eq!(diag_a, diag_b);

    let x = set.last_features().unwrap();
    assert_eq!(a.predict_one(x).unwrap(), b.predict_one(x).unwrap());
}

#[test]
fn test_seed_changes_members() {
    let set = training_set(120, 5, 1);
    let mut a = forest(12);
    let mut b = forest(12);
    a.train(&set, 1).unwrap();
    b.train(&set, 2).unwrap();

    let x = set.last_features().unwrap();
    assert_ne!(
        a.predict_one(x).unwrap().members,
        b.predict_one(x).unwrap().members
    );
}

#[test]
fn test_prediction_is_member_mean() {
    let set = training_set(100, 4, 3);
    let mut model = forest(9);
    model.train(&set, 42).unwrap();

    let prediction = model.predict_one(&set.features()[0]).unwrap();
    assert_eq!(prediction.members.len(), 9);
    let mean = prediction.members.iter().sum::<f64>() / 9.0;
    assert_eq!(prediction.point, mean);

    // bagged tree means stay inside the target range
    let lo = set.targets().iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = set.targets().iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(prediction.members.iter().all(|&m| m >= lo && m <= hi));
}

#[test]
fn test_diagnostics_split_sizes() {
    let set = training_set(100, 4, 3);
    let mut model = forest(5).with_holdout_ratio(0.25).unwrap();
    let diagnostics = model.train(&set, 42).unwrap();

    let holdout = (set.len() as f64 * 0.25).round() as usize;
    assert_eq!(diagnostics.holdout_samples, holdout);
    assert_eq!(diagnostics.train_samples, set.len() - holdout);
    assert!(diagnostics.mse >= 0.0);
    assert!((diagnostics.rmse - diagnostics.mse.sqrt()).abs() < 1e-12);
    assert!(diagnostics.mape.is_some());
    assert_eq!(model.diagnostics(), Some(&diagnostics));
}

#[test]
fn test_no_holdout_scores_in_sample() {
    let set = training_set(100, 4, 3);
    let mut model = forest(5).with_holdout_ratio(0.0).unwrap();
    let diagnostics = model.train(&set, 42).unwrap();
    assert_eq!(diagnostics.holdout_samples, set.len());
    assert_eq!(diagnostics.train_samples, set.len());
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(29)]
fn test_insufficient_training_data(#[case] samples: usize) {
    let full = training_set(100, 4, 3);
    let indices: Vec<usize> = (0..samples).collect();
    let set = full.subset(&indices);

    let mut model = forest(5);
    assert!(matches!(
        model.train(&set, 42),
        Err(ForecastError::InsufficientData { required: 30, available }) if available == samples
    ));
    assert!(!model.is_trained());
}

#[test]
fn test_predict_before_train() {
    let set = training_set(80, 4, 3);
    let model = forest(5);
    assert!(matches!(
        model.predict_one(&set.features()[0]),
        Err(ForecastError::ModelNotTrained)
    ));
}

#[test]
fn test_wrong_width_is_rejected() {
    let set = training_set(80, 4, 3);
    let other = training_set(80, 5, 3);
    let mut model = forest(3).with_min_training_samples(5).unwrap();
    model.train(&set, 42).unwrap();

    assert!(matches!(
        model.predict_one(&other.features()[0]),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_regressors_behind_trait_objects() {
    let set = training_set(90, 3, 5);
    let regressors: Vec<Box<dyn EnsembleRegressor>> = vec![
        Box::new(RegressionTree::new(TreeConfig::default())),
        Box::new(RandomForest::new(ForestConfig {
            n_estimators: 4,
            ..ForestConfig::default()
        })),
    ];

    for mut regressor in regressors {
        assert!(!regressor.is_fitted());
        regressor.fit(&set, 7).unwrap();
        assert!(regressor.is_fitted());

        let members = regressor.predict_members(&set.features()[3]).unwrap();
        assert_eq!(members.len(), regressor.member_count());
        assert!(regressor.predict_point(&set.features()[3]).unwrap().is_finite());
    }
}

#[test]
fn test_max_features_override() {
    let set = training_set(90, 3, 5);
    let mut model = ForecastModel::random_forest(ForestConfig {
        n_estimators: 3,
        max_features: Some(2),
        ..ForestConfig::default()
    });
    model.train(&set, 42).unwrap();
    assert_eq!(model.regressor().trees().len(), 3);
    assert!(model.regressor().trees().iter().all(|t| t.depth() <= 10));
}
