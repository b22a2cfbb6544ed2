//! Shared fixtures for the integration tests

use chrono::{Datelike, Duration, NaiveDate};
use polars::prelude::*;

/// Three years of daily values equal to the calendar month, with a string
/// date column
pub fn monthly_steps() -> DataFrame {
    let start = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
    let days: Vec<NaiveDate> = (0..365 * 3).map(|d| start + Duration::days(d)).collect();
    let dates: Vec<String> = days.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    let values: Vec<f64> = days.iter().map(|d| d.month() as f64).collect();
    DataFrame::new(vec![
        Series::new(PlSmallStr::from("date"), dates).into(),
        Series::new(PlSmallStr::from("q"), values).into(),
    ])
    .unwrap()
}
