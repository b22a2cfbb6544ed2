//! Semi-variance estimators
//!
//! Every estimator reduces the absolute value differences of the point
//! pairs in one lag class to a single semi-variance. An empty class gives
//! NaN.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use hydrobox_core::numeric::{median, percentile_sorted, sorted_finite};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    /// Method of moments, `sum(d^2) / 2N`
    #[default]
    Matheron,
    /// Cressie-Hawkins robust estimator
    Cressie,
    /// Dowd's median based estimator
    Dowd,
    /// Percentile (0..=100) of the differences
    Percentile(f64),
}

impl Estimator {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Matheron => "matheron",
            Self::Cressie => "cressie",
            Self::Dowd => "dowd",
            Self::Percentile(_) => "percentile",
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Self::Percentile(p) = self {
            if p.is_nan() || *p < 0.0 || *p > 100.0 {
                return Err(Error::invalid("variogram", "estimator", format!("percentile {p} is outside [0, 100]")));
            }
        }
        Ok(())
    }

    pub fn estimate(&self, differences: &[f64]) -> f64 {
        if differences.is_empty() {
            return f64::NAN;
        }
        let n = differences.len() as f64;
        match self {
            Self::Matheron => differences.iter().map(|d| d * d).sum::<f64>() / (2.0 * n),
            Self::Cressie => {
                let term = differences.iter().map(|d| d.abs().sqrt()).sum::<f64>() / n;
                0.5 * term.powi(4) / (0.457 + 0.494 / n + 0.045 / (n * n))
            }
            Self::Dowd => 2.198 * median(differences).powi(2) / 2.0,
            Self::Percentile(p) => percentile_sorted(&sorted_finite(differences), *p),
        }
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentile(p) => write!(f, "percentile({p})"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Estimator {
    type Err = Error;

    /// `"matheron"`, `"cressie"`, `"dowd"`, `"percentile"` (median) or
    /// `"percentile(p)"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        let unknown = || Error::invalid("variogram", "estimator", format!("unknown estimator '{s}'"));
        match s.as_str() {
            "matheron" => Ok(Self::Matheron),
            "cressie" => Ok(Self::Cressie),
            "dowd" => Ok(Self::Dowd),
            "percentile" => Ok(Self::Percentile(50.0)),
            other => {
                let p = other
                    .strip_prefix("percentile(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .and_then(|p| p.trim().parse::<f64>().ok())
                    .ok_or_else(unknown)?;
                let estimator = Self::Percentile(p);
                estimator.validate()?;
                Ok(estimator)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DIFFS: [f64; 4] = [1.0, 2.0, 3.0, 4.0];

    #[test]
    fn test_matheron() {
        assert_relative_eq!(Estimator::Matheron.estimate(&DIFFS), 30.0 / 8.0);
    }

    #[test]
    fn test_cressie() {
        let term: f64 = DIFFS.iter().map(|d| d.sqrt()).sum::<f64>() / 4.0;
        let expected = 0.5 * term.powi(4) / (0.457 + 0.494 / 4.0 + 0.045 / 16.0);
        assert_relative_eq!(Estimator::Cressie.estimate(&DIFFS), expected);
    }

    #[test]
    fn test_dowd_and_percentile() {
        assert_relative_eq!(Estimator::Dowd.estimate(&DIFFS), 2.198 * 2.5 * 2.5 / 2.0);
        assert_relative_eq!(Estimator::Percentile(50.0).estimate(&DIFFS), 2.5);
        assert_relative_eq!(Estimator::Percentile(100.0).estimate(&DIFFS), 4.0);
    }

    #[test]
    fn test_empty_class_is_nan() {
        assert!(Estimator::Cressie.estimate(&[]).is_nan());
    }

    #[test]
    fn test_parse() {
        assert_eq!("Dowd".parse::<Estimator>().unwrap(), Estimator::Dowd);
        assert_eq!("percentile(25)".parse::<Estimator>().unwrap(), Estimator::Percentile(25.0));
        assert_eq!("percentile".parse::<Estimator>().unwrap(), Estimator::Percentile(50.0));
        assert!("percentile(250)".parse::<Estimator>().is_err());
        assert!("genton".parse::<Estimator>().is_err());
    }
}
