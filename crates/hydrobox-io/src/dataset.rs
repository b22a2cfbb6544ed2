//! CSV time series and the bundled sample data
//!
//! The CSV layout is a header line followed by one observation per line:
//! a date or date-time in the first column and the value in the second.
//! An empty value is a missing observation (NaN). The value column header
//! becomes the series name.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, instrument};

use hydrobox_core::validate::parse_datetime;
use hydrobox_core::TimeSeries;

use crate::{Error, Result};

/// Sample data shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Three years (2010-2012) of synthetic daily discharge in m³/s with a
    /// few missing days
    Discharge,
}

impl Dataset {
    pub const ALL: [Dataset; 1] = [Self::Discharge];

    pub fn name(self) -> &'static str {
        match self {
            Self::Discharge => "discharge",
        }
    }

    fn contents(self) -> &'static str {
        match self {
            Self::Discharge => include_str!("../data/discharge.csv"),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|d| d.name() == s).ok_or_else(|| {
            hydrobox_core::Error::InvalidParameter(format!("load_dataset(...): unknown dataset '{s}'")).into()
        })
    }
}

/// Load a bundled dataset
pub fn load_dataset(dataset: Dataset) -> Result<TimeSeries> {
    parse_timeseries_csv(dataset.contents().as_bytes(), dataset.name())
}

/// Read a time series CSV file
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_timeseries_csv(path: impl AsRef<Path>) -> Result<TimeSeries> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse_timeseries_csv(BufReader::new(file), &path.display().to_string())
}

/// Parse time series CSV content; `source_name` is used in error messages
pub fn parse_timeseries_csv<R: Read>(reader: R, source_name: &str) -> Result<TimeSeries> {
    let mut reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(reader);
    let name = reader.headers()?.get(1).map(str::to_string);
    let parse_error = |line: u64, message: String| Error::Parse {
        source_name: source_name.to_string(),
        line,
        message,
    };

    let mut index = Vec::new();
    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let (Some(date), Some(value)) = (record.get(0), record.get(1)) else {
            return Err(parse_error(line, "expected a date and a value column".to_string()));
        };
        let t = parse_datetime(date).ok_or_else(|| parse_error(line, format!("'{date}' is not a date")))?;
        let v = if value.is_empty() {
            f64::NAN
        } else {
            value
                .parse::<f64>()
                .map_err(|_| parse_error(line, format!("'{value}' is not a number")))?
        };
        index.push(t);
        values.push(v);
    }
    debug!(source_name, rows = values.len(), "time series read");

    let series = TimeSeries::from_datetimes(index, values)?;
    Ok(match name {
        Some(name) if !name.is_empty() => series.with_name(name),
        _ => series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_missing_values() {
        let csv = "date,q\n2020-01-01,1.5\n2020-01-02,\n2020-01-03 12:00:00, 2.5\n";
        let s = parse_timeseries_csv(csv.as_bytes(), "inline").unwrap();
        assert_eq!(s.name(), Some("q"));
        assert_eq!(s.len(), 3);
        assert!(s.values()[1].is_nan());
        assert_eq!(s.values()[2], 2.5);
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let csv = "date,q\n2020-01-01,1.5\nyesterday,2.0\n";
        let err = parse_timeseries_csv(csv.as_bytes(), "inline").unwrap_err();
        assert_eq!(err.to_string(), "inline, line 3: 'yesterday' is not a date");

        let csv = "date,q\n2020-01-01,lots\n";
        let err = parse_timeseries_csv(csv.as_bytes(), "inline").unwrap_err();
        assert!(err.to_string().contains("'lots' is not a number"));
    }

    #[test]
    fn test_dataset_names() {
        assert_eq!("Discharge".parse::<Dataset>().unwrap(), Dataset::Discharge);
        assert!("pancake".parse::<Dataset>().is_err());
    }
}
