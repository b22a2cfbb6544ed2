//! Conversion between polars columns and hydrobox series
//!
//! Value columns of any numeric type are read as `f64`; nulls become NaN.
//! A time column may be `Date`, `Datetime` (any unit) or a string column in
//! one of the formats `parse_datetime` understands.

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

use hydrobox_core::validate::parse_datetime;
use hydrobox_core::{Index, TimeFrame, TimeSeries};

use crate::{Error, Result};

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| Error::InvalidColumn(format!("'{name}' not found")))
}

/// Values of a numeric column as `f64`, with nulls as NaN
pub(crate) fn float_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let col = column(df, name)?;
    let col = match col.dtype() {
        DataType::Float64 => col.clone(),
        DataType::Float32
        | DataType::Int64
        | DataType::Int32
        | DataType::Int16
        | DataType::Int8
        | DataType::UInt64
        | DataType::UInt32
        | DataType::UInt16
        | DataType::UInt8 => col.cast(&DataType::Float64)?,
        dt => {
            return Err(Error::TypeMismatch {
                column: name.to_string(),
                expected: "numeric".to_string(),
                got: format!("{dt:?}"),
            })
        }
    };
    Ok(col.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Timestamps of a date, datetime or string column
pub(crate) fn datetime_values(df: &DataFrame, name: &str) -> Result<Vec<NaiveDateTime>> {
    let col = column(df, name)?;
    let null_error = || Error::InvalidColumn(format!("'{name}' contains null timestamps"));
    match col.dtype() {
        DataType::Date | DataType::Datetime(_, _) => {
            let millis = col
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?;
            millis
                .i64()?
                .into_iter()
                .map(|ms| {
                    ms.and_then(DateTime::from_timestamp_millis)
                        .map(|t| t.naive_utc())
                        .ok_or_else(null_error)
                })
                .collect()
        }
        DataType::String => col
            .str()?
            .into_iter()
            .map(|s| {
                let s = s.ok_or_else(null_error)?;
                parse_datetime(s).ok_or_else(|| Error::InvalidColumn(format!("'{name}': '{s}' is not a date")))
            })
            .collect(),
        other => Err(Error::TypeMismatch {
            column: name.to_string(),
            expected: "Date, Datetime or String".to_string(),
            got: format!("{other:?}"),
        }),
    }
}

pub(crate) fn index(df: &DataFrame, time_column: Option<&str>) -> Result<Index> {
    Ok(match time_column {
        Some(name) => Index::Datetime(datetime_values(df, name)?),
        None => Index::Range(df.height()),
    })
}

/// Millisecond `Datetime` column from timestamps
fn datetime_column(name: &str, index: &[NaiveDateTime]) -> Result<Column> {
    let millis: Vec<i64> = index.iter().map(|t| t.and_utc().timestamp_millis()).collect();
    let series = Series::new(PlSmallStr::from(name), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(series.into())
}

/// DataFrame with a `time_column` (datetime index only) and one column per
/// frame column
pub fn timeframe_to_dataframe(frame: &TimeFrame, time_column: &str) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(frame.n_columns() + 1);
    if let Some(index) = frame.index().datetimes() {
        columns.push(datetime_column(time_column, index)?);
    }
    for (name, values) in frame.columns() {
        columns.push(Series::new(PlSmallStr::from(name), values.to_vec()).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Two-column DataFrame of a series; the value column is named after the
/// series or `"value"`
pub fn timeseries_to_dataframe(series: &TimeSeries, time_column: &str) -> Result<DataFrame> {
    let name = series.name().unwrap_or("value");
    let frame = TimeFrame::new(series.index().clone()).with_column(name, series.values().to_vec())?;
    timeframe_to_dataframe(&frame, time_column)
}
