//! Indexed time series containers
//!
//! `TimeSeries` is a single named column of `f64` over an [`Index`];
//! `TimeFrame` shares one index between several named columns.

use chrono::NaiveDateTime;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Row labels of a series or frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Index {
    /// Timestamps, one per row
    Datetime(Vec<NaiveDateTime>),
    /// Plain positional index `0..n`
    Range(usize),
}

impl Index {
    pub fn len(&self) -> usize {
        match self {
            Self::Datetime(ts) => ts.len(),
            Self::Range(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_datetime(&self) -> bool {
        matches!(self, Self::Datetime(_))
    }

    /// Timestamps, if this is a datetime index
    pub fn datetimes(&self) -> Option<&[NaiveDateTime]> {
        match self {
            Self::Datetime(ts) => Some(ts),
            Self::Range(_) => None,
        }
    }

    /// Rows at `positions`, in the given order
    pub fn select(&self, positions: &[usize]) -> Index {
        match self {
            Self::Datetime(ts) => Self::Datetime(positions.iter().map(|&i| ts[i]).collect()),
            Self::Range(_) => Self::Range(positions.len()),
        }
    }

    /// Short description used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Datetime(_) => "datetime",
            Self::Range(_) => "range",
        }
    }
}

/// A single column of observations over an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    index: Index,
    values: Vec<f64>,
    name: Option<String>,
}

impl TimeSeries {
    /// Create a series; index and values must have the same length
    pub fn new(index: Index, values: Vec<f64>) -> Result<Self> {
        if index.len() != values.len() {
            return Err(Error::size_mismatch(values.len(), index.len(), "series index"));
        }
        Ok(Self {
            index,
            values,
            name: None,
        })
    }

    /// Series over a datetime index
    pub fn from_datetimes(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self> {
        Self::new(Index::Datetime(timestamps), values)
    }

    /// Series over a positional index
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            index: Index::Range(values.len()),
            values,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Timestamps, or a validation error naming `function`
    pub fn require_datetime(&self, function: &str) -> Result<&[NaiveDateTime]> {
        self.index
            .datetimes()
            .ok_or_else(|| Error::not_datetime_indexed(function))
    }

    /// Rows at `positions`, keeping the name
    pub fn select(&self, positions: &[usize]) -> TimeSeries {
        TimeSeries {
            index: self.index.select(positions),
            values: positions.iter().map(|&i| self.values[i]).collect(),
            name: self.name.clone(),
        }
    }

    /// Split into index and values
    pub fn into_parts(self) -> (Index, Vec<f64>) {
        (self.index, self.values)
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

/// Named columns sharing one index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeFrame {
    index: Index,
    columns: Vec<(String, Vec<f64>)>,
}

impl TimeFrame {
    /// Empty frame over `index`
    pub fn new(index: Index) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Frame over a positional index built from `(name, values)` pairs
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let n = columns.first().map_or(0, |(_, v)| v.len());
        columns
            .into_iter()
            .try_fold(Self::new(Index::Range(n)), |frame, (name, values)| {
                frame.with_column(name, values)
            })
    }

    /// Append a column; its length must match the index
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(Error::size_mismatch(
                self.index.len(),
                values.len(),
                &format!("column {name}"),
            ));
        }
        self.columns.push((name, values));
        Ok(self)
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Column by position
    pub fn column_at(&self, i: usize) -> Option<(&str, &[f64])> {
        self.columns.get(i).map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Column as a standalone series
    pub fn series(&self, name: &str) -> Option<TimeSeries> {
        self.column(name).map(|v| TimeSeries {
            index: self.index.clone(),
            values: v.to_vec(),
            name: Some(name.to_string()),
        })
    }

    /// Rows × columns matrix
    pub fn to_array2(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.n_rows(), self.n_columns()), |(r, c)| {
            self.columns[c].1[r]
        })
    }

    /// Drop every row containing a NaN in any column
    pub fn dropna(&self) -> TimeFrame {
        let keep: Vec<usize> = (0..self.n_rows())
            .filter(|&r| self.columns.iter().all(|(_, v)| !v[r].is_nan()))
            .collect();
        TimeFrame {
            index: self.index.select(&keep),
            columns: self
                .columns
                .iter()
                .map(|(n, v)| (n.clone(), keep.iter().map(|&r| v[r]).collect()))
                .collect(),
        }
    }
}

impl From<TimeSeries> for TimeFrame {
    fn from(series: TimeSeries) -> Self {
        let name = series.name.unwrap_or_else(|| "0".to_string());
        TimeFrame {
            index: series.index,
            columns: vec![(name, series.values)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_series_length_mismatch() {
        let err = TimeSeries::from_datetimes(vec![ts(1)], vec![1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("series index"));
    }

    #[test]
    fn test_require_datetime() {
        let s = TimeSeries::from_values(vec![1.0, 2.0]);
        assert!(s.require_datetime("regime").is_err());

        let s = TimeSeries::from_datetimes(vec![ts(1), ts(2)], vec![1.0, 2.0]).unwrap();
        assert_eq!(s.require_datetime("regime").unwrap().len(), 2);
    }

    #[test]
    fn test_series_as_slice() {
        let s = TimeSeries::from_values(vec![1.0, 2.0, 3.0]).with_name("q");
        let slice: &[f64] = s.as_ref();
        assert_eq!(slice, &[1.0, 2.0, 3.0]);
        assert_eq!(s.name(), Some("q"));
    }

    #[test]
    fn test_frame_columns_and_dropna() {
        let frame = TimeFrame::from_columns(vec![
            ("a", vec![1.0, f64::NAN, 3.0]),
            ("b", vec![4.0, 5.0, 6.0]),
        ])
        .unwrap();
        assert_eq!(frame.column_names(), vec!["a", "b"]);
        assert_eq!(frame.to_array2()[[2, 1]], 6.0);

        let clean = frame.dropna();
        assert_eq!(clean.n_rows(), 2);
        assert_eq!(clean.column("a").unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn test_frame_rejects_short_column() {
        let frame = TimeFrame::new(Index::Range(3));
        assert!(frame.with_column("x", vec![1.0]).is_err());
    }
}
