use chrono::NaiveDate;
use price_forecast::utils::{train_holdout_split, DateStep};
use rstest::rstest;
use std::collections::HashSet;

#[rstest]
#[case(10, 0.2, 2)]
#[case(5, 0.2, 1)]
#[case(2, 0.2, 1)]
#[case(100, 0.25, 25)]
#[case(7, 0.0, 0)]
fn test_holdout_sizes(#[case] n: usize, #[case] ratio: f64, #[case] expected: usize) {
    let (train, holdout) = train_holdout_split(n, ratio, 42);
    assert_eq!(holdout.len(), expected);
    assert_eq!(train.len(), n - expected);

    let unique: HashSet<usize> = train.iter().chain(&holdout).copied().collect();
    assert_eq!(unique.len(), n);
}

#[test]
fn test_holdout_is_shuffled() {
    let (_, holdout) = train_holdout_split(200, 0.2, 42);
    let tail: Vec<usize> = (160..200).collect();
    assert_ne!(holdout, tail);
}

#[rstest]
#[case(DateStep::CalendarDay, (2024, 1, 5), (2024, 1, 6))]
#[case(DateStep::TradingDay, (2024, 1, 5), (2024, 1, 8))]
#[case(DateStep::TradingDay, (2024, 1, 8), (2024, 1, 9))]
#[case(DateStep::CalendarDay, (2024, 12, 31), (2025, 1, 1))]
fn test_date_steps(
    #[case] step: DateStep,
    #[case] from: (i32, u32, u32),
    #[case] to: (i32, u32, u32),
) {
    let from = NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap();
    let to = NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap();
    assert_eq!(step.next(from).unwrap(), to);
}

#[test]
fn test_date_step_overflow() {
    assert!(DateStep::CalendarDay.next(NaiveDate::MAX).is_err());
}

#[test]
fn test_date_step_serde() {
    assert_eq!(
        serde_json::to_string(&DateStep::TradingDay).unwrap(),
        "\"trading_day\""
    );
    assert_eq!(DateStep::default(), DateStep::CalendarDay);
}
