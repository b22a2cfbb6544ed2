//! Aggregation functions
//!
//! The named reductions mirror the numpy functions hydrologists are used to
//! passing by name (`"nanmedian"`, `"mean"`, ...). A custom closure can be
//! supplied wherever a name is accepted.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::numeric;
use crate::{Error, Result};

/// Boxed user-supplied reduction.
pub type AggregateFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// A reduction from many values to one
#[derive(Clone, Default)]
pub enum Aggregation {
    Mean,
    Median,
    NanMean,
    #[default]
    NanMedian,
    Sum,
    NanSum,
    Min,
    Max,
    NanMin,
    NanMax,
    Std,
    NanStd,
    /// User-supplied reduction
    Custom { name: String, func: AggregateFn },
}

impl Aggregation {
    /// Wrap a closure as an aggregation
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Name of the reduction
    pub fn name(&self) -> &str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::NanMean => "nanmean",
            Self::NanMedian => "nanmedian",
            Self::Sum => "sum",
            Self::NanSum => "nansum",
            Self::Min => "min",
            Self::Max => "max",
            Self::NanMin => "nanmin",
            Self::NanMax => "nanmax",
            Self::Std => "std",
            Self::NanStd => "nanstd",
            Self::Custom { name, .. } => name,
        }
    }

    /// Apply the reduction. Empty input gives NaN (zero for sums).
    pub fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Self::Mean => numeric::mean(values),
            Self::Median => numeric::median(values),
            Self::NanMean => numeric::mean(&numeric::without_nan(values)),
            Self::NanMedian => numeric::median(&numeric::without_nan(values)),
            Self::Sum => values.iter().sum(),
            Self::NanSum => values.iter().filter(|v| !v.is_nan()).sum(),
            Self::Min => fold_propagating(values, f64::min),
            Self::Max => fold_propagating(values, f64::max),
            Self::NanMin => numeric::min_max(values).map_or(f64::NAN, |(lo, _)| lo),
            Self::NanMax => numeric::min_max(values).map_or(f64::NAN, |(_, hi)| hi),
            Self::Std => numeric::std_dev(values),
            Self::NanStd => numeric::std_dev(&numeric::without_nan(values)),
            Self::Custom { func, .. } => func(values),
        }
    }

    /// The NaN-propagating counterpart of a `nan*` reduction.
    ///
    /// Weighted windows cannot skip missing values, so the `nan` prefix is
    /// dropped there.
    pub fn without_nan_handling(&self) -> Self {
        match self {
            Self::NanMean => Self::Mean,
            Self::NanMedian => Self::Median,
            Self::NanSum => Self::Sum,
            Self::NanMin => Self::Min,
            Self::NanMax => Self::Max,
            Self::NanStd => Self::Std,
            other => other.clone(),
        }
    }

    /// True for user-supplied closures
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }
}

fn fold_propagating(values: &[f64], f: fn(f64, f64) -> f64) -> f64 {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    values.iter().copied().fold(values[0], f)
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialEq for Aggregation {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom { func: a, .. }, Self::Custom { func: b, .. }) => Arc::ptr_eq(a, b),
            (a, b) => !a.is_custom() && !b.is_custom() && a.name() == b.name(),
        }
    }
}

impl FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "mean" | "average" => Self::Mean,
            "median" => Self::Median,
            "nanmean" => Self::NanMean,
            "nanmedian" => Self::NanMedian,
            "sum" => Self::Sum,
            "nansum" => Self::NanSum,
            "min" | "amin" => Self::Min,
            "max" | "amax" => Self::Max,
            "nanmin" => Self::NanMin,
            "nanmax" => Self::NanMax,
            "std" => Self::Std,
            "nanstd" => Self::NanStd,
            other => {
                return Err(Error::InvalidParameter(format!(
                    "The function {other} is not a known aggregation"
                )))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_named_functions() {
        assert_eq!("nanmedian".parse::<Aggregation>().unwrap(), Aggregation::NanMedian);
        assert_eq!("mean".parse::<Aggregation>().unwrap(), Aggregation::Mean);
        assert!("nanmode".parse::<Aggregation>().is_err());
    }

    #[test]
    fn test_nan_handling() {
        let data = [1.0, 2.0, f64::NAN, 6.0];
        assert!(Aggregation::Mean.apply(&data).is_nan());
        assert_relative_eq!(Aggregation::NanMean.apply(&data), 3.0);
        assert_relative_eq!(Aggregation::NanMedian.apply(&data), 2.0);
        assert_relative_eq!(Aggregation::NanSum.apply(&data), 9.0);
        assert!(Aggregation::Max.apply(&data).is_nan());
        assert_relative_eq!(Aggregation::NanMax.apply(&data), 6.0);
    }

    #[test]
    fn test_custom_aggregation() {
        let range = Aggregation::custom("range", |v| {
            let (lo, hi) = numeric::min_max(v).unwrap_or((f64::NAN, f64::NAN));
            hi - lo
        });
        assert_eq!(range.name(), "range");
        assert_relative_eq!(range.apply(&[3.0, 9.0, 4.0]), 6.0);
        assert_eq!(range, range.clone());
    }

    #[test]
    fn test_without_nan_handling() {
        assert_eq!(Aggregation::NanMean.without_nan_handling(), Aggregation::Mean);
        assert_eq!(Aggregation::Sum.without_nan_handling(), Aggregation::Sum);
    }
}
