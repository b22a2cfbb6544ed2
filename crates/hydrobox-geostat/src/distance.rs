//! Distance metrics and point pairs

use std::fmt;
use std::str::FromStr;

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Separating distance between two coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistFunc {
    #[default]
    Euclidean,
    Cityblock,
    Chebyshev,
    Sqeuclidean,
}

impl DistFunc {
    pub const ALL: [DistFunc; 4] = [Self::Euclidean, Self::Cityblock, Self::Chebyshev, Self::Sqeuclidean];

    pub fn name(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Cityblock => "cityblock",
            Self::Chebyshev => "chebyshev",
            Self::Sqeuclidean => "sqeuclidean",
        }
    }

    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        self.reduce(a.iter().zip(b).map(|(x, y)| (x - y).abs()))
    }

    pub(crate) fn between(self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        self.reduce(a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()))
    }

    fn reduce(self, deltas: impl Iterator<Item = f64>) -> f64 {
        match self {
            Self::Euclidean => deltas.map(|d| d * d).sum::<f64>().sqrt(),
            Self::Sqeuclidean => deltas.map(|d| d * d).sum(),
            Self::Cityblock => deltas.sum(),
            Self::Chebyshev => deltas.fold(0.0, f64::max),
        }
    }
}

impl fmt::Display for DistFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistFunc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| Error::invalid("variogram", "dist_func", format!("unknown distance function '{s}'")))
    }
}

/// Every unordered point pair `i < j` in condensed order
#[derive(Debug, Clone, PartialEq)]
pub struct PairList {
    pub pairs: Vec<(usize, usize)>,
    pub distances: Vec<f64>,
}

impl PairList {
    pub fn new(coordinates: ArrayView2<f64>, dist_func: DistFunc) -> Self {
        let n = coordinates.nrows();
        let capacity = n * n.saturating_sub(1) / 2;
        let mut pairs = Vec::with_capacity(capacity);
        let mut distances = Vec::with_capacity(capacity);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((i, j));
                distances.push(dist_func.between(coordinates.row(i), coordinates.row(j)));
            }
        }
        Self { pairs, distances }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Absolute value differences in pair order
    pub fn differences(&self, values: &[f64]) -> Vec<f64> {
        self.pairs.iter().map(|&(i, j)| (values[i] - values[j]).abs()).collect()
    }
}
