//! Flow duration curves
//!
//! Probabilities follow the Weibull plotting position `p = m / (n + 1)`,
//! where `m` is the average rank of an observation and `n` the number of
//! observations. The `+ 1` keeps every probability strictly inside (0, 1).

use ndarray::{Array2, ArrayView2};
use tracing::{debug, instrument};

use hydrobox_core::numeric::{argsort, average_ranks, without_nan};
use hydrobox_core::Error as CoreError;
use hydrobox_plotting::{Figure, PlotContext, PlotKind, PlotOptions, SeriesStyle, XyChart, XySeries};

use crate::Result;

/// Ordered (non-)exceedance probabilities with the matching discharge
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDurationCurve {
    pub probability: Vec<f64>,
    pub discharge: Vec<f64>,
    pub non_exceeding: bool,
}

impl FlowDurationCurve {
    pub fn len(&self) -> usize {
        self.probability.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probability.is_empty()
    }

    fn series(&self, name: impl Into<String>) -> XySeries {
        XySeries::from_xy(name, &self.discharge, &self.probability, SeriesStyle::Line)
    }
}

/// Flow duration curve of one series of observations.
///
/// NaN observations are dropped before ranking. With `non_exceeding` the
/// result is ordered by ascending probability, otherwise it is the exact
/// reverse.
#[instrument(skip(x), fields(n = x.as_ref().len()))]
pub fn flow_duration_curve<T: AsRef<[f64]> + ?Sized>(x: &T, non_exceeding: bool) -> Result<FlowDurationCurve> {
    let data = without_nan(x.as_ref());
    if data.is_empty() {
        return Err(CoreError::InsufficientData {
            expected: 1,
            actual: 0,
        }
        .into());
    }
    if data.len() < x.as_ref().len() {
        debug!(dropped = x.as_ref().len() - data.len(), "NaN observations dropped");
    }

    let n = data.len() as f64;
    let p: Vec<f64> = average_ranks(&data).into_iter().map(|r| r / (n + 1.0)).collect();

    let mut order = argsort(&p);
    if !non_exceeding {
        order.reverse();
    }

    Ok(FlowDurationCurve {
        probability: order.iter().map(|&i| p[i]).collect(),
        discharge: order.iter().map(|&i| data[i]).collect(),
        non_exceeding,
    })
}

/// Flow duration curves of every column of `x`.
///
/// Column `j` of the result holds the ordered probabilities of column `j`.
/// Columns with missing values are padded with NaN at the end.
pub fn flow_duration_curves(x: ArrayView2<'_, f64>, non_exceeding: bool) -> Result<Array2<f64>> {
    let (rows, cols) = x.dim();
    let mut out = Array2::from_elem((rows, cols), f64::NAN);
    for (j, column) in x.columns().into_iter().enumerate() {
        let curve = flow_duration_curve(&column.to_vec(), non_exceeding)?;
        for (i, p) in curve.probability.into_iter().enumerate() {
            out[[i, j]] = p;
        }
    }
    Ok(out)
}

fn chart(non_exceeding: bool, log: bool) -> XyChart {
    let prefix = if log { "loglog " } else { "" };
    let y_label = if non_exceeding {
        "non-exceeding prob."
    } else {
        "exceeding prob."
    };
    XyChart::new(format!("{prefix}FDC"))
        .with_labels("discharge [m3/s]", y_label)
        .with_log(log, log)
}

/// Render the flow duration curve of `x`
pub fn plot_flow_duration_curve<T: AsRef<[f64]> + ?Sized>(
    x: &T,
    non_exceeding: bool,
    log: bool,
    ctx: &PlotContext,
    options: &PlotOptions,
) -> Result<Figure> {
    let curve = flow_duration_curve(x, non_exceeding)?;
    let data = chart(non_exceeding, log).with_series(curve.series("discharge"));
    Ok(ctx.render(PlotKind::FlowDurationCurve, data, options)?)
}

/// Render one curve per column of `x` into a shared chart
pub fn plot_flow_duration_curves(
    x: ArrayView2<'_, f64>,
    non_exceeding: bool,
    log: bool,
    ctx: &PlotContext,
    options: &PlotOptions,
) -> Result<Figure> {
    let mut data = chart(non_exceeding, log);
    for (j, column) in x.columns().into_iter().enumerate() {
        let curve = flow_duration_curve(&column.to_vec(), non_exceeding)?;
        data = data.with_series(curve.series(format!("column {j}")));
    }
    Ok(ctx.render(PlotKind::FlowDurationCurve, data, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_weibull_probabilities() {
        let curve = flow_duration_curve(&[3.0, 1.0, 2.0], true).unwrap();
        assert_eq!(curve.probability, vec![0.25, 0.5, 0.75]);
        assert_eq!(curve.discharge, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ties_share_average_rank() {
        let curve = flow_duration_curve(&[5.0, 5.0, 1.0], true).unwrap();
        assert_relative_eq!(curve.probability[0], 0.25);
        assert_relative_eq!(curve.probability[1], 0.625);
        assert_relative_eq!(curve.probability[2], 0.625);
    }

    #[test]
    fn test_exceeding_is_reverse() {
        let x = [4.0, 8.0, 1.0, 6.0];
        let mut up = flow_duration_curve(&x, true).unwrap().probability;
        let down = flow_duration_curve(&x, false).unwrap().probability;
        up.reverse();
        assert_eq!(up, down);
    }

    #[test]
    fn test_nan_dropped_and_empty_rejected() {
        let curve = flow_duration_curve(&[1.0, f64::NAN, 2.0], true).unwrap();
        assert_eq!(curve.len(), 2);
        assert_relative_eq!(curve.probability[1], 2.0 / 3.0);

        assert!(flow_duration_curve(&[f64::NAN], true).is_err());
        assert!(flow_duration_curve(&Vec::<f64>::new(), true).is_err());
    }

    #[test]
    fn test_columns_are_independent() {
        let x = array![[1.0, 30.0], [2.0, 10.0], [3.0, f64::NAN]];
        let out = flow_duration_curves(x.view(), true).unwrap();
        assert_eq!(out.column(0).to_vec(), vec![0.25, 0.5, 0.75]);
        assert_relative_eq!(out[[0, 1]], 1.0 / 3.0);
        assert_relative_eq!(out[[1, 1]], 2.0 / 3.0);
        assert!(out[[2, 1]].is_nan());
    }
}
