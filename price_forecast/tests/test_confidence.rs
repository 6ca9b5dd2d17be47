use approx::assert_relative_eq;
use price_forecast::confidence::{ConfidenceEstimator, ConfidenceLevel, CONFIDENCE_CEILING};
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn test_unanimous_members() {
    let estimator = ConfidenceEstimator::new();
    assert_eq!(estimator.estimate(42.0, &[42.0; 100]), CONFIDENCE_CEILING);
    assert_eq!(estimator.ceiling(), 0.95);
}

#[test]
fn test_zero_point_estimate() {
    let estimator = ConfidenceEstimator::new();
    assert_eq!(estimator.estimate(0.0, &[0.0, 0.0]), 0.0);
    assert_eq!(estimator.estimate(0.0, &[5.0, -5.0]), 0.0);
}

#[rstest]
#[case(100.0, &[95.0, 105.0], 0.95)]
#[case(100.0, &[80.0, 120.0], 0.8)]
#[case(10.0, &[0.0, 20.0], 0.0)]
#[case(50.0, &[40.0, 50.0, 60.0], 1.0 - (200.0f64 / 3.0).sqrt() / 50.0)]
fn test_relative_dispersion(#[case] point: f64, #[case] members: &[f64], #[case] expected: f64) {
    let estimator = ConfidenceEstimator::new();
    assert_relative_eq!(estimator.estimate(point, members), expected, epsilon = 1e-9);
}

#[rstest]
#[case(0.96, ConfidenceLevel::High)]
#[case(0.71, ConfidenceLevel::High)]
#[case(0.6, ConfidenceLevel::Medium)]
#[case(0.2, ConfidenceLevel::Low)]
fn test_levels(#[case] score: f64, #[case] level: ConfidenceLevel) {
    assert_eq!(ConfidenceLevel::from_score(score), level);
}

proptest! {
    #[test]
    fn prop_confidence_is_bounded(
        point in -1.0e6f64..1.0e6,
        members in prop::collection::vec(-1.0e6f64..1.0e6, 0..50),
    ) {
        let confidence = ConfidenceEstimator::new().estimate(point, &members);
        prop_assert!((0.0..=CONFIDENCE_CEILING).contains(&confidence));
    }

    #[test]
    fn prop_agreement_reaches_ceiling(point in 1.0f64..1.0e4, count in 1usize..50) {
        let members = vec![point; count];
        let confidence = ConfidenceEstimator::new().estimate(point, &members);
        prop_assert!((confidence - CONFIDENCE_CEILING).abs() < 1e-9);
    }
}
