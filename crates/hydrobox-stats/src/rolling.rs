//! Moving window statistics
//!
//! Windows are trailing: the value at position `i` aggregates
//! `x[i + 1 - size..=i]`, and the first `size - 1` positions are NaN.
//!
//! Without a [`WindowType`] every window is reduced with the given
//! [`Aggregation`]. With a window type the values are weighted by the
//! (symmetric) window function, which only makes sense for a weighted sum
//! or a weighted mean. Weighted windows cannot skip missing values, so a
//! `nan*` reduction falls back to its NaN-propagating counterpart.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use hydrobox_core::{Aggregation, Error as CoreError, Index, TimeFrame, TimeSeries};

use crate::Result;

/// Window weighting functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Boxcar,
    Triang,
    Hamming,
    Hann,
    Bartlett,
    Blackman,
}

impl WindowType {
    pub const ALL: [WindowType; 6] = [
        Self::Boxcar,
        Self::Triang,
        Self::Hamming,
        Self::Hann,
        Self::Bartlett,
        Self::Blackman,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Boxcar => "boxcar",
            Self::Triang => "triang",
            Self::Hamming => "hamming",
            Self::Hann => "hann",
            Self::Bartlett => "bartlett",
            Self::Blackman => "blackman",
        }
    }

    /// Symmetric window of length `m`
    pub fn weights(self, m: usize) -> Vec<f64> {
        if m == 1 {
            return vec![1.0];
        }
        let denom = (m - 1) as f64;
        let cosine = |a: &[f64]| -> Vec<f64> {
            (0..m)
                .map(|n| {
                    let phase = 2.0 * PI * n as f64 / denom;
                    a.iter()
                        .enumerate()
                        .map(|(k, c)| {
                            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                            sign * c * (k as f64 * phase).cos()
                        })
                        .sum::<f64>()
                })
                .collect()
        };
        match self {
            Self::Boxcar => vec![1.0; m],
            Self::Triang => {
                let half: Vec<f64> = (1..=(m + 1) / 2)
                    .map(|n| {
                        if m % 2 == 0 {
                            (2 * n - 1) as f64 / m as f64
                        } else {
                            2.0 * n as f64 / (m + 1) as f64
                        }
                    })
                    .collect();
                let mirrored = half.iter().rev().skip(m % 2);
                half.iter().chain(mirrored).copied().collect()
            }
            Self::Hamming => cosine(&[0.54, 0.46]),
            Self::Hann => cosine(&[0.5, 0.5]),
            Self::Blackman => cosine(&[0.42, 0.5, 0.08]),
            Self::Bartlett => (0..m)
                .map(|n| 2.0 / denom * (denom / 2.0 - (n as f64 - denom / 2.0).abs()))
                .collect(),
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowType {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|w| w.name() == s)
            .ok_or_else(|| {
                CoreError::InvalidParameter(format!(
                    "moving_window(...): unknown window type '{s}'"
                ))
            })
    }
}

enum Reducer {
    Plain(Aggregation),
    WeightedSum(Vec<f64>),
    WeightedMean(Vec<f64>),
}

impl Reducer {
    fn new(size: usize, window_type: Option<WindowType>, agg: &Aggregation) -> Result<Self> {
        let Some(window_type) = window_type else {
            return Ok(Self::Plain(agg.clone()));
        };
        let weights = window_type.weights(size);
        match agg.without_nan_handling() {
            Aggregation::Mean => Ok(Self::WeightedMean(weights)),
            Aggregation::Sum => Ok(Self::WeightedSum(weights)),
            other => Err(CoreError::InvalidParameter(format!(
                "moving_window(...): function {other} is not supported for window type {window_type}; use mean or sum"
            ))
            .into()),
        }
    }

    fn reduce(&self, window: &[f64]) -> f64 {
        match self {
            Self::Plain(agg) => agg.apply(window),
            Self::WeightedSum(w) => w.iter().zip(window).map(|(w, x)| w * x).sum(),
            Self::WeightedMean(w) => {
                let total: f64 = w.iter().sum();
                w.iter().zip(window).map(|(w, x)| w * x).sum::<f64>() / total
            }
        }
    }
}

fn rolling(values: &[f64], size: usize, reducer: &Reducer) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for (i, window) in values.windows(size).enumerate() {
        out[i + size - 1] = reducer.reduce(window);
    }
    out
}

fn check_size(window_size: usize) -> Result<()> {
    if window_size == 0 {
        return Err(CoreError::InvalidParameter(
            "moving_window(...): window_size must be at least 1".to_string(),
        )
        .into());
    }
    Ok(())
}

/// Trailing moving window over `x`
#[instrument(skip(x, agg), fields(n = x.len(), agg = %agg))]
pub fn moving_window(
    x: &TimeSeries,
    window_size: usize,
    window_type: Option<WindowType>,
    agg: &Aggregation,
) -> Result<TimeSeries> {
    check_size(window_size)?;
    let reducer = Reducer::new(window_size, window_type, agg)?;
    let values = rolling(x.values(), window_size, &reducer);
    debug!(window_size, "moving window applied");

    let out = TimeSeries::new(x.index().clone(), values)?;
    Ok(match x.name() {
        Some(name) => out.with_name(name),
        None => out,
    })
}

/// [`moving_window`] applied to every column of a frame
pub fn moving_window_frame(
    x: &TimeFrame,
    window_size: usize,
    window_type: Option<WindowType>,
    agg: &Aggregation,
) -> Result<TimeFrame> {
    check_size(window_size)?;
    let reducer = Reducer::new(window_size, window_type, agg)?;
    let frame = TimeFrame::new(Index::clone(x.index()));
    Ok(x.columns().try_fold(frame, |frame, (name, values)| {
        frame.with_column(name, rolling(values, window_size, &reducer))
    })?)
}
