//! Integration tests: feature stages against their contracts

use chrono::NaiveDate;
use polars::prelude::*;
use velocount::features::{DateFeatureExtractor, ExternalDataMerger, DATE_FEATURE_COLUMNS};

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

#[test]
fn test_date_extractor_adds_five_columns_and_drops_date() {
    let df = DataFrame::new(vec![
        datetime_series(&[(2021, 1, 1, 0), (2021, 1, 2, 6), (2021, 1, 3, 12)]).into(),
        Series::new("counter_name".into(), &["A", "B", "A"]).into(),
    ])
    .unwrap();

    let result = DateFeatureExtractor::new().transform(&df).unwrap();

    assert!(result.column("date").is_err());
    assert_eq!(result.width(), df.width() - 1 + DATE_FEATURE_COLUMNS.len());
    for name in DATE_FEATURE_COLUMNS {
        assert!(result.column(name).is_ok(), "missing derived column {name}");
    }
    // input frame still owns its date column
    assert!(df.column("date").is_ok());
}

#[test]
fn test_as_of_match_picks_latest_earlier_observation() {
    // auxiliary rows at 2021-03-15 00:00 (conf=1) and 2021-03-16 00:00
    // (conf=0); an input at 2021-03-15 08:00 must pick up conf=1
    let aux = DataFrame::new(vec![
        datetime_series(&[(2021, 3, 15, 0), (2021, 3, 16, 0)]).into(),
        Series::new("conf".into(), &[1i64, 0]).into(),
        Series::new("hourly".into(), &[0i64, 0]).into(),
        Series::new("ww".into(), &[1i64, 2]).into(),
        Series::new("rr1".into(), &[0.0f64, 0.2]).into(),
        Series::new("etat_sol".into(), &[0i64, 1]).into(),
    ])
    .unwrap();
    let merger = ExternalDataMerger::from_frame(aux).unwrap();

    let input = DataFrame::new(vec![datetime_series(&[(2021, 3, 15, 8)]).into()]).unwrap();
    let result = merger.transform(&input).unwrap();

    assert_eq!(result.column("conf").unwrap().i64().unwrap().get(0), Some(1));
}

#[test]
fn test_merge_preserves_row_order_on_shuffled_input() {
    let aux = DataFrame::new(vec![
        datetime_series(&(1..=9).map(|d| (2021, 5, d, 0)).collect::<Vec<_>>()).into(),
        Series::new("conf".into(), (1..=9i64).collect::<Vec<_>>()).into(),
        Series::new("hourly".into(), vec![0i64; 9]).into(),
        Series::new("ww".into(), vec![1i64; 9]).into(),
        Series::new("rr1".into(), vec![0.0f64; 9]).into(),
        Series::new("etat_sol".into(), vec![0i64; 9]).into(),
    ])
    .unwrap();
    let merger = ExternalDataMerger::from_frame(aux).unwrap();

    // days visited in scrambled order; tag = day of month
    let days = [7u32, 2, 9, 4, 1, 8, 3, 6, 5];
    let input = DataFrame::new(vec![
        datetime_series(&days.iter().map(|&d| (2021, 5, d, 10)).collect::<Vec<_>>()).into(),
        Series::new("tag".into(), days.iter().map(|&d| d as i64).collect::<Vec<_>>()).into(),
    ])
    .unwrap();

    let result = merger.transform(&input).unwrap();
    let tags = result.column("tag").unwrap().i64().unwrap();
    let conf = result.column("conf").unwrap().i64().unwrap();

    for i in 0..days.len() {
        // order untouched, and each row matched its own day's auxiliary row
        assert_eq!(tags.get(i), Some(days[i] as i64));
        assert_eq!(conf.get(i), Some(days[i] as i64));
    }
}
