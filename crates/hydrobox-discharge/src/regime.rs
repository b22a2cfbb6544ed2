//! Monthly regime of a datetime-indexed series

use chrono::Datelike;
use ndarray::Array2;
use tracing::{debug, instrument};

use hydrobox_core::numeric::nan_percentile;
use hydrobox_core::{Aggregation, Error as CoreError, TimeSeries};
use hydrobox_plotting::{Band, Figure, PlotContext, PlotKind, PlotOptions, RegimeChart};

use crate::Result;

/// Within-month percentiles to add next to the aggregate
#[derive(Debug, Clone, PartialEq)]
pub enum Percentiles {
    /// Explicit percentiles in `[0, 100]`
    List(Vec<f64>),
    /// `n` evenly spaced percentiles strictly between 0 and 100
    Count(usize),
}

impl Percentiles {
    /// Resolve to explicit percentile values
    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::List(v) => v.clone(),
            Self::Count(n) => (1..=*n).map(|k| k as f64 * 100.0 / (*n as f64 + 1.0)).collect(),
        }
    }
}

/// Options for [`regime`]
#[derive(Debug, Clone, Default)]
pub struct RegimeOptions {
    pub percentiles: Option<Percentiles>,
    pub normalize: bool,
    pub agg: Aggregation,
}

impl RegimeOptions {
    pub fn with_percentiles(mut self, percentiles: Percentiles) -> Self {
        self.percentiles = Some(percentiles);
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_agg(mut self, agg: Aggregation) -> Self {
        self.agg = agg;
        self
    }
}

/// Monthly aggregate and percentile columns
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeTable {
    /// Calendar months (1..=12) that have observations
    pub months: Vec<u32>,
    /// `(name, values)` pairs; the aggregate comes first, then `q{p}` columns
    pub columns: Vec<(String, Vec<f64>)>,
}

impl RegimeTable {
    /// The aggregate column
    pub fn aggregate(&self) -> &[f64] {
        self.columns.first().map(|(_, v)| v.as_slice()).unwrap_or(&[])
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Months × columns matrix
    pub fn to_array2(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.months.len(), self.columns.len()), |(r, c)| {
            self.columns[c].1[r]
        })
    }

    /// Chart payload: aggregate line over bands pairing the outermost
    /// percentiles first
    pub fn to_chart(&self, title: impl Into<String>) -> RegimeChart {
        let (center_name, center) = self
            .columns
            .first()
            .cloned()
            .unwrap_or_else(|| (String::new(), Vec::new()));
        let mut quantiles: Vec<&(String, Vec<f64>)> = self.columns.iter().skip(1).collect();
        quantiles.sort_by(|a, b| percentile_of(&a.0).total_cmp(&percentile_of(&b.0)));

        let n = quantiles.len();
        let bands = (0..n / 2)
            .map(|i| {
                let (lo_name, lower) = quantiles[i];
                let (hi_name, upper) = quantiles[n - 1 - i];
                Band {
                    name: format!("{lo_name}-{hi_name}"),
                    lower: lower.clone(),
                    upper: upper.clone(),
                }
            })
            .collect();

        RegimeChart {
            title: title.into(),
            y_label: "discharge".to_string(),
            months: self.months.clone(),
            center_name,
            center,
            bands,
        }
    }
}

fn percentile_of(column: &str) -> f64 {
    column
        .strip_prefix('q')
        .and_then(|p| p.parse().ok())
        .unwrap_or(f64::NAN)
}

/// Group `x` by calendar month and aggregate.
///
/// The series must carry a datetime index. Only months with observations
/// appear in the table. With `normalize`, every column is divided by the
/// aggregate of that column over all months.
#[instrument(skip(x, options), fields(n = x.len(), agg = %options.agg))]
pub fn regime(x: &TimeSeries, options: &RegimeOptions) -> Result<RegimeTable> {
    let index = x.require_datetime("regime")?;

    let mut groups: Vec<Vec<f64>> = vec![Vec::new(); 12];
    for (t, &v) in index.iter().zip(x.values()) {
        groups[t.month0() as usize].push(v);
    }
    let months: Vec<u32> = (1..=12).filter(|m| !groups[*m as usize - 1].is_empty()).collect();
    if months.is_empty() {
        return Err(CoreError::InsufficientData {
            expected: 1,
            actual: 0,
        }
        .into());
    }
    let present: Vec<&Vec<f64>> = months.iter().map(|m| &groups[*m as usize - 1]).collect();

    let mut columns = vec![(
        options.agg.name().to_string(),
        present.iter().map(|g| options.agg.apply(g)).collect::<Vec<f64>>(),
    )];

    if let Some(percentiles) = &options.percentiles {
        for q in percentiles.values() {
            if !(0.0..=100.0).contains(&q) {
                return Err(CoreError::InvalidParameter(format!(
                    "regime(...): percentile {q} is outside [0, 100]"
                ))
                .into());
            }
            columns.push((
                format!("q{}", q.trunc() as i64),
                present.iter().map(|g| nan_percentile(g, q)).collect(),
            ));
        }
    }

    if options.normalize {
        for (_, values) in columns.iter_mut() {
            let overall = options.agg.apply(values);
            values.iter_mut().for_each(|v| *v /= overall);
        }
    }

    debug!(months = months.len(), columns = columns.len(), "regime computed");
    Ok(RegimeTable { months, columns })
}

/// Compute the regime of `x` and render it
pub fn plot_regime(
    x: &TimeSeries,
    options: &RegimeOptions,
    ctx: &PlotContext,
    plot_options: &PlotOptions,
) -> Result<Figure> {
    let table = regime(x, options)?;
    let title = if options.normalize {
        "normalized regime"
    } else {
        "regime"
    };
    Ok(ctx.render(PlotKind::Regime, table.to_chart(title), plot_options)?)
}
