//! Truncation of datetime-indexed data to a period

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, instrument};

use hydrobox_core::validate::parse_datetime;
use hydrobox_core::{Error, Result, TimeFrame, TimeSeries};

/// Start or end of a truncation period
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    At(NaiveDateTime),
    /// `YYYYMMDD` or `YYYYMMDDhhmmss`; ISO forms are accepted as well
    Str(String),
}

impl From<NaiveDateTime> for Bound {
    fn from(t: NaiveDateTime) -> Self {
        Self::At(t)
    }
}

impl From<&str> for Bound {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Bound {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Resolved period; `end` is exclusive when `end_inclusive` is false
#[derive(Debug, Clone, Copy)]
struct Period {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    end_inclusive: bool,
}

impl Period {
    fn resolve(start: Option<&Bound>, stop: Option<&Bound>) -> Result<Self> {
        let start = start
            .map(|b| resolve_bound(b, "start"))
            .transpose()?
            .map(|(t, _)| t);
        let (end, end_inclusive) = match stop.map(|b| resolve_bound(b, "stop")).transpose()? {
            // a bare date as stop covers that whole day
            Some((t, true)) => (Some(t + Duration::days(1)), false),
            Some((t, false)) => (Some(t), true),
            None => (None, true),
        };
        Ok(Self {
            start,
            end,
            end_inclusive,
        })
    }

    fn contains(&self, t: NaiveDateTime) -> bool {
        let after_start = self.start.map_or(true, |s| t >= s);
        let before_end = match self.end {
            Some(e) if self.end_inclusive => t <= e,
            Some(e) => t < e,
            None => true,
        };
        after_start && before_end
    }

    fn positions(&self, index: &[NaiveDateTime]) -> Vec<usize> {
        index
            .iter()
            .enumerate()
            .filter(|(_, &t)| self.contains(t))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Timestamp of a bound and whether it was given as a bare date
fn resolve_bound(bound: &Bound, argument: &str) -> Result<(NaiveDateTime, bool)> {
    let s = match bound {
        Bound::At(t) => return Ok((*t, false)),
        Bound::Str(s) => s.trim(),
    };
    let parsed = if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|t| (t, true))
    } else {
        parse_datetime(s).map(|t| (t, false))
    };
    parsed.ok_or_else(|| {
        Error::InvalidParameter(format!(
            "cut(...): arg {argument}: '{s}' is not a date in YYYYMMDD[hhmmss] format"
        ))
    })
}

/// Rows of `x` within `[start, stop]`; a missing bound leaves that side open.
///
/// A `stop` given as a bare date (`"20201231"`) includes that entire day.
#[instrument(skip(x, start, stop), fields(n = x.len()))]
pub fn cut(x: &TimeSeries, start: Option<Bound>, stop: Option<Bound>) -> Result<TimeSeries> {
    let index = x.require_datetime("cut")?;
    let period = Period::resolve(start.as_ref(), stop.as_ref())?;
    let keep = period.positions(index);
    debug!(kept = keep.len(), "series truncated");
    Ok(x.select(&keep))
}

/// [`cut`] for a frame
pub fn cut_frame(x: &TimeFrame, start: Option<Bound>, stop: Option<Bound>) -> Result<TimeFrame> {
    let index = x
        .index()
        .datetimes()
        .ok_or_else(|| Error::not_datetime_indexed("cut"))?;
    let period = Period::resolve(start.as_ref(), stop.as_ref())?;
    let keep = period.positions(index);

    let frame = TimeFrame::new(x.index().select(&keep));
    x.columns().try_fold(frame, |frame, (name, values)| {
        frame.with_column(name, keep.iter().map(|&i| values[i]).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(days: i64) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 12, 30)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let index: Vec<_> = (0..days * 24).map(|h| start + Duration::hours(h)).collect();
        let values = (0..index.len()).map(|i| i as f64).collect();
        TimeSeries::from_datetimes(index, values).unwrap()
    }

    #[test]
    fn test_bare_date_stop_covers_day() {
        let x = hourly(4);
        let out = cut(&x, Some("20201231".into()), Some("20201231".into())).unwrap();
        assert_eq!(out.len(), 24);
        assert_eq!(out.values()[0], 24.0);
        assert_eq!(out.values()[23], 47.0);
    }

    #[test]
    fn test_exact_bounds_are_inclusive() {
        let x = hourly(2);
        let out = cut(&x, Some("20201230060000".into()), Some("20201230120000".into())).unwrap();
        assert_eq!(out.values(), &[6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);

        let t = x.index().datetimes().unwrap()[40];
        let out = cut(&x, Some(t.into()), None).unwrap();
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn test_open_bounds() {
        let x = hourly(1);
        assert_eq!(cut(&x, None, None).unwrap(), x);
    }

    #[test]
    fn test_frame() {
        let x = hourly(2);
        let frame = TimeFrame::from(x.clone().with_name("q"))
            .with_column("r", vec![1.0; 48])
            .unwrap();
        let out = cut_frame(&frame, None, Some("20201230".into())).unwrap();
        assert_eq!(out.n_rows(), 24);
        assert_eq!(out.column("r").unwrap().len(), 24);
    }

    #[test]
    fn test_invalid() {
        let x = hourly(1);
        let err = cut(&x, Some("yesterday".into()), None).unwrap_err();
        assert!(err.to_string().contains("arg start"));
        assert!(cut(&TimeSeries::from_values(vec![1.0]), None, None).is_err());
    }
}
