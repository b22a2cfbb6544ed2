//! Combining several series into one frame

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use tracing::{debug, instrument};

use hydrobox_core::{Error, Index, Result, TimeFrame, TimeSeries};

/// Outer-join `series` on their index.
///
/// All series must share the kind of index. Datetime indices are united
/// and sorted; positional indices are padded to the longest series. Rows
/// missing from a series are NaN. With `dropna`, every row holding at
/// least one NaN is removed.
///
/// Columns are named after the series, or by position when unnamed.
#[instrument(skip(series), fields(n = series.len()))]
pub fn merge(series: &[TimeSeries], dropna: bool) -> Result<TimeFrame> {
    let Some(first) = series.first() else {
        return Err(Error::InvalidInput(
            "merge(...): at least one series is required".to_string(),
        ));
    };
    let kind = first.index().kind_name();
    if let Some(other) = series.iter().find(|s| s.index().kind_name() != kind) {
        return Err(Error::InvalidInput(format!(
            "merge(...): at least one data set was not {kind} indexed (got {})",
            other.index().kind_name()
        )));
    }

    let names: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(i, s)| s.name().map_or_else(|| i.to_string(), str::to_string))
        .collect();

    let frame = if first.index().is_datetime() {
        join_datetime(series, names)?
    } else {
        join_range(series, names)?
    };
    debug!(rows = frame.n_rows(), "series merged");

    Ok(if dropna { frame.dropna() } else { frame })
}

fn join_datetime(series: &[TimeSeries], names: Vec<String>) -> Result<TimeFrame> {
    let mut rows: BTreeMap<NaiveDateTime, usize> = BTreeMap::new();
    for s in series {
        let index = s.require_datetime("merge")?;
        let mut seen = HashSet::with_capacity(index.len());
        if let Some(t) = index.iter().find(|t| !seen.insert(**t)) {
            return Err(Error::InvalidInput(format!(
                "merge(...): duplicate timestamp {t} in series {}",
                s.name().unwrap_or("<unnamed>")
            )));
        }
        rows.extend(index.iter().map(|&t| (t, 0)));
    }
    for (row, slot) in rows.values_mut().enumerate() {
        *slot = row;
    }

    let timestamps: Vec<NaiveDateTime> = rows.keys().copied().collect();
    let frame = TimeFrame::new(Index::Datetime(timestamps));
    series
        .iter()
        .zip(names)
        .try_fold(frame, |frame, (s, name)| {
            let mut column = vec![f64::NAN; rows.len()];
            for (t, &v) in s.require_datetime("merge")?.iter().zip(s.values()) {
                column[rows[t]] = v;
            }
            frame.with_column(name, column)
        })
}

fn join_range(series: &[TimeSeries], names: Vec<String>) -> Result<TimeFrame> {
    let n = series.iter().map(TimeSeries::len).max().unwrap_or(0);
    let frame = TimeFrame::new(Index::Range(n));
    series
        .iter()
        .zip(names)
        .try_fold(frame, |frame, (s, name)| {
            let mut column = s.values().to_vec();
            column.resize(n, f64::NAN);
            frame.with_column(name, column)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_outer_join() {
        let a = TimeSeries::from_datetimes(vec![day(1), day(2), day(4)], vec![1.0, 2.0, 4.0])
            .unwrap()
            .with_name("a");
        let b = TimeSeries::from_datetimes(vec![day(3), day(2)], vec![30.0, 20.0]).unwrap();

        let frame = merge(&[a.clone(), b.clone()], false).unwrap();
        assert_eq!(frame.column_names(), vec!["a", "1"]);
        assert_eq!(
            frame.index().datetimes().unwrap(),
            &[day(1), day(2), day(3), day(4)]
        );
        assert!(frame.column("1").unwrap()[0].is_nan());
        assert_eq!(frame.column("1").unwrap()[1..3], [20.0, 30.0]);

        let dense = merge(&[a, b], true).unwrap();
        assert_eq!(dense.n_rows(), 1);
        assert_eq!(dense.column("a").unwrap(), &[2.0]);
    }

    #[test]
    fn test_single_series() {
        let a = TimeSeries::from_values(vec![1.0, 2.0]).with_name("q");
        let frame = merge(&[a], false).unwrap();
        assert_eq!(frame.n_columns(), 1);
        assert_eq!(frame.column("q").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_range_padding() {
        let a = TimeSeries::from_values(vec![1.0, 2.0, 3.0]);
        let b = TimeSeries::from_values(vec![1.0]);
        let frame = merge(&[a, b], false).unwrap();
        assert_eq!(frame.n_rows(), 3);
        assert!(frame.column("1").unwrap()[2].is_nan());
    }

    #[test]
    fn test_mismatched_index_kinds() {
        let a = TimeSeries::from_values(vec![1.0]);
        let b = TimeSeries::from_datetimes(vec![day(1)], vec![1.0]).unwrap();
        let err = merge(&[a, b], false).unwrap_err();
        assert!(err.to_string().contains("range indexed"));
        assert!(merge(&[], false).is_err());
    }

    #[test]
    fn test_duplicate_timestamps() {
        let a = TimeSeries::from_datetimes(vec![day(1), day(1)], vec![1.0, 2.0]).unwrap();
        assert!(merge(&[a], false).is_err());
    }
}
