//! Ordinary least squares between pairs of observables
//!
//! [`linregress`] fits `y = slope * x + intercept` and reports the Pearson
//! correlation, the two-sided p-value of a zero slope (Student-t with
//! `n - 2` degrees of freedom) and the standard error of the slope.
//!
//! [`linear_regression`] works on a frame: two columns give one
//! [`Regression`], more columns give every ordered pair as a
//! [`RegressionGrid`].

use ndarray::Array2;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::{debug, instrument};

use hydrobox_core::numeric::min_max;
use hydrobox_core::{Error as CoreError, TimeFrame, TimeSeries};
use hydrobox_plotting::{Figure, PlotContext, PlotKind, PlotOptions, XyChart, XySeries};

use crate::Result;

const TINY: f64 = 1.0e-20;

/// Result of a single regression
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub rvalue: f64,
    pub pvalue: f64,
    pub stderr: f64,
}

impl Regression {
    /// Fitted value at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Regressions between all ordered column pairs.
///
/// Entry `[i, j]` regresses column `j` on column `i`. The diagonal is NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionGrid {
    pub names: Vec<String>,
    pub slope: Array2<f64>,
    pub intercept: Array2<f64>,
    pub rvalue: Array2<f64>,
    pub pvalue: Array2<f64>,
    pub stderr: Array2<f64>,
}

impl RegressionGrid {
    fn nan(names: Vec<String>) -> Self {
        let n = names.len();
        let nan = Array2::from_elem((n, n), f64::NAN);
        Self {
            names,
            slope: nan.clone(),
            intercept: nan.clone(),
            rvalue: nan.clone(),
            pvalue: nan.clone(),
            stderr: nan,
        }
    }

    /// Regression of column `j` on column `i`; `None` on the diagonal
    pub fn get(&self, i: usize, j: usize) -> Option<Regression> {
        if i == j || i >= self.names.len() || j >= self.names.len() {
            return None;
        }
        Some(Regression {
            slope: self.slope[[i, j]],
            intercept: self.intercept[[i, j]],
            rvalue: self.rvalue[[i, j]],
            pvalue: self.pvalue[[i, j]],
            stderr: self.stderr[[i, j]],
        })
    }
}

/// Outcome of [`linear_regression`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LinearRegression {
    Pair(Regression),
    Grid(RegressionGrid),
}

/// Pairs where both values are present
fn complete_pairs(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(a, b)| (*a, *b))
        .unzip()
}

/// Least squares fit of `y` on `x`; rows with a NaN in either are dropped
pub fn linregress(x: &[f64], y: &[f64]) -> Result<Regression> {
    if x.len() != y.len() {
        return Err(CoreError::size_mismatch(x.len(), y.len(), "linear_regression").into());
    }
    let (x, y) = complete_pairs(x, y);
    let n = x.len();
    if n < 2 {
        return Err(CoreError::InsufficientData {
            expected: 2,
            actual: n,
        }
        .into());
    }

    let nf = n as f64;
    let xmean = x.iter().sum::<f64>() / nf;
    let ymean = y.iter().sum::<f64>() / nf;
    let (mut ssxm, mut ssym, mut ssxym) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(&y) {
        ssxm += (a - xmean).powi(2);
        ssym += (b - ymean).powi(2);
        ssxym += (a - xmean) * (b - ymean);
    }
    ssxm /= nf;
    ssym /= nf;
    ssxym /= nf;

    if ssxm == 0.0 {
        return Err(CoreError::Computation(
            "linear_regression(...): all x values are identical".to_string(),
        )
        .into());
    }

    let r = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };
    let slope = ssxym / ssxm;
    let intercept = ymean - slope * xmean;

    let (pvalue, stderr) = if n == 2 {
        // a line through two points is exact
        (if y[0] == y[1] { 1.0 } else { 0.0 }, 0.0)
    } else {
        let df = nf - 2.0;
        let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| CoreError::Computation(format!("Student-t with {df} dof: {e}")))?;
        let p = 2.0 * dist.cdf(-t.abs());
        let stderr = ((1.0 - r * r) * ssym / ssxm / df).sqrt();
        (p, stderr)
    };

    Ok(Regression {
        slope,
        intercept,
        rvalue: r,
        pvalue,
        stderr,
    })
}

/// Regress the columns of `frame` on each other
#[instrument(skip(frame), fields(columns = frame.n_columns(), rows = frame.n_rows()))]
pub fn linear_regression(frame: &TimeFrame) -> Result<LinearRegression> {
    let columns: Vec<(&str, &[f64])> = frame.columns().collect();
    match columns.len() {
        0 | 1 => Err(CoreError::InsufficientData {
            expected: 2,
            actual: columns.len(),
        }
        .into()),
        2 => Ok(LinearRegression::Pair(linregress(columns[0].1, columns[1].1)?)),
        n => {
            let names = columns.iter().map(|(name, _)| name.to_string()).collect();
            let mut grid = RegressionGrid::nan(names);
            for i in 0..n {
                for j in (0..n).filter(|&j| j != i) {
                    let reg = linregress(columns[i].1, columns[j].1)?;
                    grid.slope[[i, j]] = reg.slope;
                    grid.intercept[[i, j]] = reg.intercept;
                    grid.rvalue[[i, j]] = reg.rvalue;
                    grid.pvalue[[i, j]] = reg.pvalue;
                    grid.stderr[[i, j]] = reg.stderr;
                }
            }
            debug!(pairs = n * (n - 1), "regression grid computed");
            Ok(LinearRegression::Grid(grid))
        }
    }
}

/// Merge `series` on their index and regress them
pub fn linear_regression_series(series: &[TimeSeries]) -> Result<LinearRegression> {
    let frame = hydrobox_preprocessing::merge(series, false)?;
    linear_regression(&frame)
}

fn regression_chart(x: &[f64], y: &[f64], names: (&str, &str), reg: &Regression) -> XyChart {
    let (xs, ys) = complete_pairs(x, y);
    let points: Vec<(f64, f64)> = xs.iter().copied().zip(ys).collect();
    let line = min_max(&xs)
        .map(|(lo, hi)| vec![(lo, reg.predict(lo)), (hi, reg.predict(hi))])
        .unwrap_or_default();

    XyChart::new(format!(
        "slope: {:.2}  intercept: {:.2}  r: {:.2}  p: {:.2}  stderr: {:.2}",
        reg.slope, reg.intercept, reg.rvalue, reg.pvalue, reg.stderr
    ))
    .with_labels(names.0, names.1)
    .with_series(XySeries::markers("observations", points))
    .with_series(XySeries::line("fit", line))
}

/// Scatter of `y` over `x` with the fitted line
pub fn plot_regression(
    x: &[f64],
    y: &[f64],
    names: (&str, &str),
    ctx: &PlotContext,
    options: &PlotOptions,
) -> Result<Figure> {
    let reg = linregress(x, y)?;
    let chart = regression_chart(x, y, names, &reg);
    Ok(ctx.render(PlotKind::Regression, chart, options)?)
}

/// One scatter per ordered pair of distinct columns, row-major
pub fn plot_regression_grid(
    frame: &TimeFrame,
    ctx: &PlotContext,
    options: &PlotOptions,
) -> Result<Vec<Figure>> {
    let columns: Vec<(&str, &[f64])> = frame.columns().collect();
    let mut figures = Vec::with_capacity(columns.len() * columns.len().saturating_sub(1));
    for (i, &(xn, x)) in columns.iter().enumerate() {
        for (j, &(yn, y)) in columns.iter().enumerate() {
            if i != j {
                figures.push(plot_regression(x, y, (xn, yn), ctx, options)?);
            }
        }
    }
    Ok(figures)
}
