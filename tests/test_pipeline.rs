//! Integration tests: both pipeline variants end-to-end

use chrono::NaiveDate;
use polars::prelude::*;
use velocount::features::ExternalDataMerger;
use velocount::training::{GradientBoostingConfig, NeuralNetConfig};
use velocount::{gradient_boosted_estimator, CounterPipeline, VelocountError};

fn datetime_series(values: &[(i32, u32, u32, u32)]) -> Series {
    let datetimes: Vec<_> = values
        .iter()
        .map(|&(y, m, d, h)| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        })
        .collect();
    DatetimeChunked::from_naive_datetime("date".into(), datetimes, TimeUnit::Milliseconds)
        .into_series()
}

fn training_frame() -> DataFrame {
    DataFrame::new(vec![
        datetime_series(&[(2021, 1, 1, 8), (2021, 1, 2, 8), (2021, 1, 3, 8)]).into(),
        Series::new("counter_name".into(), &["A", "B", "A"]).into(),
        Series::new("site_name".into(), &["S1", "S1", "S2"]).into(),
    ])
    .unwrap()
}

fn target() -> Series {
    Series::new("count".into(), &[10.0f64, 20.0, 15.0])
}

fn auxiliary_frame() -> DataFrame {
    let mut dates: Vec<(i32, u32, u32, u32)> = vec![(2020, 12, 31, 0), (2020, 12, 31, 12)];
    dates.extend((1..=4).flat_map(|d| [(2021, 1, d, 0), (2021, 1, d, 12)]));
    let n = dates.len();
    DataFrame::new(vec![
        datetime_series(&dates).into(),
        Series::new("conf".into(), vec![1i64; n]).into(),
        Series::new(
            "hourly".into(),
            (0..n).map(|i| (i % 2) as i64).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "ww".into(),
            (0..n).map(|i| (i % 3) as i64).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "rr1".into(),
            (0..n).map(|i| i as f64 * 0.1).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "etat_sol".into(),
            (0..n).map(|i| (i % 2) as i64).collect::<Vec<_>>(),
        )
        .into(),
    ])
    .unwrap()
}

fn small_booster_config() -> GradientBoostingConfig {
    GradientBoostingConfig {
        n_estimators: 15,
        max_depth: 3,
        ..Default::default()
    }
}

#[test]
fn test_gradient_boosted_end_to_end() {
    let merger = ExternalDataMerger::from_frame(auxiliary_frame()).unwrap();
    let mut pipeline = CounterPipeline::gradient_boosted_with_config(merger, small_booster_config());

    pipeline.fit(&training_frame(), &target()).unwrap();
    let predictions = pipeline.predict(&training_frame()).unwrap();

    assert_eq!(predictions.len(), 3);
    assert!(predictions.iter().all(|p| p.is_finite()));
}

#[test]
fn test_neural_end_to_end() {
    let config = NeuralNetConfig {
        max_epochs: 30,
        ..Default::default()
    };
    let mut pipeline = CounterPipeline::neural_with_config(config);

    pipeline.fit(&training_frame(), &target()).unwrap();
    let predictions = pipeline.predict(&training_frame()).unwrap();

    assert_eq!(predictions.len(), 3);
    assert!(predictions.iter().all(|p| p.is_finite()));
}

#[test]
fn test_gradient_boosted_factory_uses_shipped_auxiliary_table() {
    // cargo runs tests from the package root, where the default CSV lives
    let mut pipeline = gradient_boosted_estimator().unwrap();
    pipeline.fit(&training_frame(), &target()).unwrap();
    let predictions = pipeline.predict(&training_frame()).unwrap();

    assert_eq!(predictions.len(), 3);
    assert!(predictions.iter().all(|p| p.is_finite()));
}

#[test]
fn test_unknown_counter_at_predict_time_is_tolerated() {
    let merger = ExternalDataMerger::from_frame(auxiliary_frame()).unwrap();
    let mut pipeline = CounterPipeline::gradient_boosted_with_config(merger, small_booster_config());
    pipeline.fit(&training_frame(), &target()).unwrap();

    let unseen = DataFrame::new(vec![
        datetime_series(&[(2021, 1, 2, 14)]).into(),
        Series::new("counter_name".into(), &["never-seen"]).into(),
        Series::new("site_name".into(), &["S9"]).into(),
    ])
    .unwrap();

    let predictions = pipeline.predict(&unseen).unwrap();
    assert_eq!(predictions.len(), 1);
    assert!(predictions[0].is_finite());
}

#[test]
fn test_deterministic_fit_predict() {
    let run = || {
        let merger = ExternalDataMerger::from_frame(auxiliary_frame()).unwrap();
        let mut pipeline =
            CounterPipeline::gradient_boosted_with_config(merger, small_booster_config());
        pipeline.fit(&training_frame(), &target()).unwrap();
        pipeline.predict(&training_frame()).unwrap()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_predict_before_fit_rejected() {
    let pipeline = CounterPipeline::neural();
    let err = pipeline.predict(&training_frame()).unwrap_err();
    assert!(matches!(err, VelocountError::ModelNotFitted));
}

#[test]
fn test_target_length_mismatch_rejected() {
    let mut pipeline = CounterPipeline::neural();
    let short_target = Series::new("count".into(), &[1.0f64]);
    let err = pipeline.fit(&training_frame(), &short_target).unwrap_err();
    assert!(matches!(err, VelocountError::ShapeError { .. }));
}
