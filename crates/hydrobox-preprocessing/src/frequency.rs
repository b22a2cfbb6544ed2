//! Resampling frequencies such as `"15min"`, `"3D"` or `"1M"`
//!
//! A frequency is an optional positive count followed by a unit alias:
//!
//! | unit | aliases |
//! |------|---------|
//! | second | `S`, `s` |
//! | minute | `min`, `T` |
//! | hour | `H`, `h` |
//! | day | `D`, `d` |
//! | week | `W` |
//! | month | `M`, `MS` |
//! | year | `Y`, `YS`, `A`, `AS` |
//!
//! Bins are anchored at the floor of the earliest timestamp: midnight of
//! that day for sub-daily and daily units, the preceding Monday for weeks,
//! the first of the month and the first of January for months and years.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use hydrobox_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrequencyUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl FrequencyUnit {
    fn alias(self) -> &'static str {
        match self {
            Self::Second => "S",
            Self::Minute => "min",
            Self::Hour => "H",
            Self::Day => "D",
            Self::Week => "W",
            Self::Month => "M",
            Self::Year => "Y",
        }
    }

    /// Length in seconds for units of fixed length
    fn fixed_seconds(self) -> Option<i64> {
        match self {
            Self::Second => Some(1),
            Self::Minute => Some(60),
            Self::Hour => Some(3_600),
            Self::Day => Some(86_400),
            Self::Week => Some(7 * 86_400),
            Self::Month | Self::Year => None,
        }
    }
}

/// `count` consecutive units per bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frequency {
    pub count: u32,
    pub unit: FrequencyUnit,
}

impl Frequency {
    pub fn new(count: u32, unit: FrequencyUnit) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidParameter(
                "frequency count must be at least 1".to_string(),
            ));
        }
        Ok(Self { count, unit })
    }

    /// Start of the bin grid for data beginning at `t`
    pub fn origin(&self, t: NaiveDateTime) -> Result<NaiveDateTime> {
        let date = t.date();
        let day = match self.unit {
            FrequencyUnit::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            FrequencyUnit::Month => first_of(date.year(), date.month())?,
            FrequencyUnit::Year => first_of(date.year(), 1)?,
            _ => date,
        };
        let midnight = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::Computation(format!("no midnight on {day}")))?;

        match self.unit {
            FrequencyUnit::Second | FrequencyUnit::Minute | FrequencyUnit::Hour => {
                let step = self.step_seconds().unwrap_or(1);
                let offset = (t - midnight).num_seconds().div_euclid(step) * step;
                Ok(midnight + Duration::seconds(offset))
            }
            _ => Ok(midnight),
        }
    }

    /// Zero-based bin of `t` on the grid starting at `origin`
    pub fn bin(&self, origin: NaiveDateTime, t: NaiveDateTime) -> i64 {
        match self.step_seconds() {
            Some(step) => (t - origin).num_seconds().div_euclid(step),
            None => {
                let months = i64::from(t.year() - origin.year()) * 12
                    + i64::from(t.month()) - i64::from(origin.month());
                months.div_euclid(self.step_months())
            }
        }
    }

    /// Label (start) of bin `k` on the grid starting at `origin`
    pub fn label(&self, origin: NaiveDateTime, k: i64) -> Option<NaiveDateTime> {
        match self.step_seconds() {
            Some(step) => origin.checked_add_signed(Duration::seconds(step.checked_mul(k)?)),
            None => {
                let months = u32::try_from(self.step_months().checked_mul(k)?).ok()?;
                origin.checked_add_months(Months::new(months))
            }
        }
    }

    fn step_seconds(&self) -> Option<i64> {
        self.unit.fixed_seconds().map(|s| s * i64::from(self.count))
    }

    fn step_months(&self) -> i64 {
        let per_unit = if self.unit == FrequencyUnit::Year { 12 } else { 1 };
        per_unit * i64::from(self.count)
    }
}

fn first_of(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::Computation(format!("invalid date {year}-{month}-01")))
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (count, alias) = s.split_at(split);
        let count = if count.is_empty() {
            1
        } else {
            count
                .parse::<u32>()
                .map_err(|e| Error::InvalidParameter(format!("frequency '{s}': {e}")))?
        };
        let unit = match alias {
            "S" | "s" => FrequencyUnit::Second,
            "min" | "T" => FrequencyUnit::Minute,
            "H" | "h" => FrequencyUnit::Hour,
            "D" | "d" => FrequencyUnit::Day,
            "W" => FrequencyUnit::Week,
            "M" | "MS" => FrequencyUnit::Month,
            "Y" | "YS" | "A" | "AS" => FrequencyUnit::Year,
            other => {
                return Err(Error::InvalidParameter(format!(
                    "frequency '{s}': unknown unit '{other}'"
                )))
            }
        };
        Self::new(count, unit)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.alias())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_parse() {
        let f: Frequency = "15min".parse().unwrap();
        assert_eq!(f, Frequency::new(15, FrequencyUnit::Minute).unwrap());
        assert_eq!("M".parse::<Frequency>().unwrap().count, 1);
        assert_eq!("3D".parse::<Frequency>().unwrap().to_string(), "3D");
        assert!("0D".parse::<Frequency>().is_err());
        assert!("2fortnights".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_origin() {
        let t = at(2021, 3, 17, 13, 52);
        let f = |s: &str| s.parse::<Frequency>().unwrap();
        assert_eq!(f("15min").origin(t).unwrap(), at(2021, 3, 17, 13, 45));
        assert_eq!(f("D").origin(t).unwrap(), at(2021, 3, 17, 0, 0));
        // 2021-03-17 is a Wednesday
        assert_eq!(f("W").origin(t).unwrap(), at(2021, 3, 15, 0, 0));
        assert_eq!(f("M").origin(t).unwrap(), at(2021, 3, 1, 0, 0));
        assert_eq!(f("Y").origin(t).unwrap(), at(2021, 1, 1, 0, 0));
    }

    #[test]
    fn test_month_bins_and_labels() {
        let f: Frequency = "2M".parse().unwrap();
        let origin = at(2020, 11, 1, 0, 0);
        assert_eq!(f.bin(origin, at(2020, 12, 31, 23, 0)), 0);
        assert_eq!(f.bin(origin, at(2021, 1, 1, 0, 0)), 1);
        assert_eq!(f.label(origin, 1), Some(at(2021, 1, 1, 0, 0)));
    }
}
