//! Node reduction for environmental signals
//!
//! Two reductions are applied alternately until nothing changes:
//!
//! - **threshold**: walking the signal, a node is kept only if it differs
//!   from the last kept node by more than `threshold`. With the default of
//!   zero this collapses runs of equal values.
//! - **flatten**: a node whose two neighbours hold the same value is treated
//!   as one-step, one-amplitude noise and removed. The first and last nodes
//!   always survive this step.
//!
//! Noise with a longer period or a larger amplitude than one step is not
//! recognised; filter the signal first in that case.

use ndarray::{ArrayBase, Data, Dimension};
use tracing::{debug, instrument};

use hydrobox_core::{Error, Result};

/// Options for [`simplify`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifyOptions {
    /// Remove single-step noise
    pub flatten: bool,
    /// Differences up to this value carry no information
    pub threshold: f64,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            flatten: true,
            threshold: 0.0,
        }
    }
}

impl SimplifyOptions {
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Reduce the number of nodes representing `x`.
///
/// The result is a fixed point of both reductions, so simplifying it again
/// returns it unchanged. Missing values cannot be compared against a
/// threshold and are rejected.
#[instrument(skip(x), fields(n = x.as_ref().len()))]
pub fn simplify<T: AsRef<[f64]> + ?Sized>(x: &T, options: &SimplifyOptions) -> Result<Vec<f64>> {
    let x = x.as_ref();
    if options.threshold.is_nan() || options.threshold < 0.0 {
        return Err(Error::InvalidParameter(format!(
            "simplify(...): threshold must be a non-negative number, got {}",
            options.threshold
        )));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(Error::non_finite("simplify(...): x"));
    }

    let mut current = x.to_vec();
    let mut passes = 0usize;
    loop {
        passes += 1;
        let mut next = drop_below_threshold(&current, options.threshold);
        if options.flatten {
            next = flatten(&next);
        }
        if next.len() == current.len() {
            break;
        }
        current = next;
    }

    debug!(kept = current.len(), passes, "signal simplified");
    Ok(current)
}

/// [`simplify`] for an n-dimensional array; only one dimension is supported
pub fn simplify_array<S, D>(x: &ArrayBase<S, D>, options: &SimplifyOptions) -> Result<Vec<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if x.ndim() > 1 {
        return Err(Error::Unsupported(format!(
            "simplify(...): only one-dimensional signals are supported, got {} dimensions",
            x.ndim()
        )));
    }
    simplify(&x.iter().copied().collect::<Vec<f64>>(), options)
}

fn drop_below_threshold(x: &[f64], threshold: f64) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(x.len());
    for &v in x {
        match out.last() {
            Some(last) if (v - last).abs() <= threshold => {}
            _ => out.push(v),
        }
    }
    out
}

// the mask is computed on the input, so alternating runs like a b a b
// lose both interior nodes in one pass
fn flatten(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    x.iter()
        .enumerate()
        .filter(|&(i, _)| i == 0 || i + 1 == n || x[i - 1] != x[i + 1])
        .map(|(_, &v)| v)
        .collect()
}
