//! Lag classes
//!
//! Bins are described by their upper edges; the first class starts at 0.
//! A pair with distance `d` falls into class `k` when
//! `edges[k - 1] < d <= edges[k]`. Pairs beyond the maximum lag are not
//! used at all.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use hydrobox_core::numeric::{linspace, mean, median, percentile_sorted, sorted_finite};

use crate::{Error, Result};

/// Rule that places the lag class edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinFunc {
    /// Classes of equal width
    #[default]
    Even,
    /// Classes holding the same number of pairs
    Uniform,
    /// Equal width, `ceil(sqrt(n_pairs))` classes
    Sqrt,
    /// Equal width, `ceil(log2(n_pairs) + 1)` classes
    Sturges,
}

impl BinFunc {
    pub const ALL: [BinFunc; 4] = [Self::Even, Self::Uniform, Self::Sqrt, Self::Sturges];

    pub fn name(self) -> &'static str {
        match self {
            Self::Even => "even",
            Self::Uniform => "uniform",
            Self::Sqrt => "sqrt",
            Self::Sturges => "sturges",
        }
    }

    /// Upper edges for `distances` (already limited to the maximum lag).
    ///
    /// `Sqrt` and `Sturges` derive the number of classes and ignore `n_lags`.
    pub fn edges(self, distances: &[f64], n_lags: usize, maxlag: f64) -> Result<Vec<f64>> {
        if distances.is_empty() {
            return Err(Error::invalid("variogram", "maxlag", "no point pair is within the maximum lag"));
        }
        if n_lags == 0 {
            return Err(Error::invalid("variogram", "n_lags", "must be at least 1"));
        }
        let npairs = distances.len() as f64;
        let even = |n: usize| linspace(0.0, maxlag, n + 1).split_off(1);
        Ok(match self {
            Self::Even => even(n_lags),
            Self::Sqrt => even(npairs.sqrt().ceil() as usize),
            Self::Sturges => even((npairs.log2() + 1.0).ceil() as usize),
            Self::Uniform => {
                let sorted = sorted_finite(distances);
                (1..=n_lags)
                    .map(|k| percentile_sorted(&sorted, 100.0 * k as f64 / n_lags as f64))
                    .collect()
            }
        })
    }
}

impl fmt::Display for BinFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BinFunc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        let s = if s == "sturge" { "sturges".to_string() } else { s };
        Self::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| Error::invalid("variogram", "bin_func", format!("unknown binning function '{s}'")))
    }
}

/// Largest separating distance a pair may have to be used
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Maxlag {
    /// Largest observed distance
    #[default]
    None,
    /// Mean of all distances
    Mean,
    /// Median of all distances
    Median,
    /// Fixed distance
    Absolute(f64),
    /// Share (0..1) of the largest observed distance
    Ratio(f64),
}

impl Maxlag {
    pub fn resolve(self, distances: &[f64]) -> Result<f64> {
        let max = distances.iter().copied().fold(0.0, f64::max);
        let value = match self {
            Self::None => max,
            Self::Mean => mean(distances),
            Self::Median => median(distances),
            Self::Absolute(d) => {
                if d.is_nan() || d <= 0.0 {
                    return Err(Error::invalid("variogram", "maxlag", format!("{d} is not a positive distance")));
                }
                d
            }
            Self::Ratio(r) => {
                if r.is_nan() || r <= 0.0 || r >= 1.0 {
                    return Err(Error::invalid("variogram", "maxlag", format!("ratio {r} is outside (0, 1)")));
                }
                r * max
            }
        };
        Ok(value)
    }
}

impl fmt::Display for Maxlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Mean => f.write_str("mean"),
            Self::Median => f.write_str("median"),
            Self::Absolute(d) => write!(f, "{d}"),
            Self::Ratio(r) => write!(f, "{r}"),
        }
    }
}

impl FromStr for Maxlag {
    type Err = Error;

    /// `"mean"`, `"median"`, `"none"` or a number; numbers below 1 are ratios.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            other => {
                let value: f64 = other
                    .parse()
                    .map_err(|_| Error::invalid("variogram", "maxlag", format!("cannot parse '{other}'")))?;
                Ok(if value < 1.0 { Self::Ratio(value) } else { Self::Absolute(value) })
            }
        }
    }
}

/// Lag class of every distance, `None` beyond the last edge
pub fn lag_classes(distances: &[f64], edges: &[f64]) -> Vec<Option<usize>> {
    distances
        .iter()
        .map(|&d| edges.iter().position(|&e| d <= e))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn distances() -> Vec<f64> {
        (1..=100).map(f64::from).collect()
    }

    #[test]
    fn test_even_edges() {
        let edges = BinFunc::Even.edges(&distances(), 4, 100.0).unwrap();
        assert_eq!(edges, vec![25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn test_uniform_edges_split_pairs_evenly() {
        let d = distances();
        let edges = BinFunc::Uniform.edges(&d, 4, 100.0).unwrap();
        let classes = lag_classes(&d, &edges);
        for k in 0..4 {
            let count = classes.iter().filter(|c| **c == Some(k)).count();
            assert!((24..=26).contains(&count), "class {k} holds {count}");
        }
    }

    #[test]
    fn test_derived_class_counts() {
        let d = distances();
        assert_eq!(BinFunc::Sqrt.edges(&d, 3, 100.0).unwrap().len(), 10);
        // log2(100) + 1 = 7.64
        assert_eq!(BinFunc::Sturges.edges(&d, 3, 100.0).unwrap().len(), 8);
    }

    #[test]
    fn test_maxlag() {
        let d = distances();
        assert_relative_eq!(Maxlag::None.resolve(&d).unwrap(), 100.0);
        assert_relative_eq!(Maxlag::Mean.resolve(&d).unwrap(), 50.5);
        assert_relative_eq!(Maxlag::Median.resolve(&d).unwrap(), 50.5);
        assert_relative_eq!(Maxlag::Ratio(0.25).resolve(&d).unwrap(), 25.0);
        assert!(Maxlag::Ratio(1.5).resolve(&d).is_err());
        assert!(Maxlag::Absolute(-1.0).resolve(&d).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!("0.5".parse::<Maxlag>().unwrap(), Maxlag::Ratio(0.5));
        assert_eq!("40".parse::<Maxlag>().unwrap(), Maxlag::Absolute(40.0));
        assert_eq!("median".parse::<Maxlag>().unwrap(), Maxlag::Median);
        assert_eq!("sturge".parse::<BinFunc>().unwrap(), BinFunc::Sturges);
        assert!("kmeans".parse::<BinFunc>().is_err());
    }

    #[test]
    fn test_lag_classes() {
        let classes = lag_classes(&[0.0, 1.0, 1.5, 3.5], &[1.0, 2.0, 3.0]);
        assert_eq!(classes, vec![Some(0), Some(0), Some(1), None]);
    }
}
