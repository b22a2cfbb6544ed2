//! Variogram figures

use std::fmt;
use std::str::FromStr;

use hydrobox_plotting::{Figure, PlotContext, PlotKind, PlotOptions, SeriesStyle, XyChart, XySeries};

use crate::variogram::Variogram;
use crate::{Error, Result};

/// What [`plot_variogram`] draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariogramPlotType {
    /// Experimental semi-variances and the fitted model
    #[default]
    Plot,
    /// Value difference against separating distance for every pair
    DistanceDifference,
    /// Observed values against each coordinate dimension
    LocationTrend,
    /// Tail value against head value for every pair within the maximum lag
    Scattergram,
}

impl VariogramPlotType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Plot => "plot",
            Self::DistanceDifference => "distance_difference",
            Self::LocationTrend => "location_trend",
            Self::Scattergram => "scattergram",
        }
    }
}

impl fmt::Display for VariogramPlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VariogramPlotType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plot" => Ok(Self::Plot),
            "distance_difference" => Ok(Self::DistanceDifference),
            "location_trend" => Ok(Self::LocationTrend),
            "scattergram" => Ok(Self::Scattergram),
            other => Err(Error::invalid(
                "variogram",
                "plot_type",
                format!("'{other}' is not one of plot, distance_difference, location_trend, scattergram"),
            )),
        }
    }
}

fn variogram_chart(v: &Variogram, plot_type: VariogramPlotType) -> XyChart {
    let title = format!("{} variogram: {plot_type}", v.model());
    match plot_type {
        VariogramPlotType::Plot => {
            let (lags, model) = v.model_curve(100);
            XyChart::new(title)
                .with_labels("lag", "semivariance")
                .with_series(XySeries::from_xy(
                    "experimental",
                    v.bins(),
                    v.experimental(),
                    SeriesStyle::Markers,
                ))
                .with_series(XySeries::from_xy(v.model().name(), &lags, &model, SeriesStyle::Line))
        }
        VariogramPlotType::DistanceDifference => XyChart::new(title)
            .with_labels("distance", "|difference|")
            .with_series(XySeries::from_xy(
                "pairs",
                v.distances(),
                v.differences(),
                SeriesStyle::Markers,
            )),
        VariogramPlotType::LocationTrend => {
            let values = v.values().to_vec();
            v.coordinates()
                .columns()
                .into_iter()
                .enumerate()
                .fold(XyChart::new(title).with_labels("coordinate", "value"), |chart, (k, column)| {
                    let column: Vec<f64> = column.to_vec();
                    chart.with_series(XySeries::from_xy(format!("dim {k}"), &column, &values, SeriesStyle::Markers))
                })
        }
        VariogramPlotType::Scattergram => {
            let values = v.values();
            let points = v
                .pairs()
                .iter()
                .zip(v.distances())
                .filter(|(_, &d)| d <= v.maxlag())
                .map(|(&(i, j), _)| (values[i], values[j]))
                .collect();
            XyChart::new(title)
                .with_labels("tail", "head")
                .with_series(XySeries::markers("pairs", points))
        }
    }
}

/// Render `v` as one of the [`VariogramPlotType`]s
pub fn plot_variogram(
    v: &Variogram,
    plot_type: VariogramPlotType,
    ctx: &PlotContext,
    options: &PlotOptions,
) -> Result<Figure> {
    Ok(ctx.render(PlotKind::Variogram, variogram_chart(v, plot_type), options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variogram::VariogramConfig;
    use ndarray::Array2;

    fn variogram() -> Variogram {
        let coords = Array2::from_shape_fn((12, 2), |(i, k)| (i * (k + 2)) as f64 % 7.0 + i as f64 * 0.1);
        let values: Vec<f64> = (0..12).map(|i| (i as f64).sqrt()).collect();
        Variogram::new(coords.view(), &values, VariogramConfig::default().with_n_lags(4)).unwrap()
    }

    #[test]
    fn test_chart_contents() {
        let v = variogram();
        let chart = variogram_chart(&v, VariogramPlotType::Plot);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[1].points.len(), 100);

        let chart = variogram_chart(&v, VariogramPlotType::DistanceDifference);
        assert_eq!(chart.series[0].points.len(), 66);

        let chart = variogram_chart(&v, VariogramPlotType::LocationTrend);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[1].name, "dim 1");

        // maxlag defaults to the largest distance, so every pair is used
        let chart = variogram_chart(&v, VariogramPlotType::Scattergram);
        assert_eq!(chart.series[0].points.len(), 66);
    }

    #[test]
    fn test_parse_plot_type() {
        assert_eq!(
            "distance_difference".parse::<VariogramPlotType>().unwrap(),
            VariogramPlotType::DistanceDifference
        );
        assert!("heatmap".parse::<VariogramPlotType>().is_err());
    }
}
