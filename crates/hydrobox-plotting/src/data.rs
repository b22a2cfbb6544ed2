//! Backend-neutral chart payloads
//!
//! Analysis crates describe *what* to draw with these types; the renderers
//! decide *how*.

use ndarray::Array2;

/// How a series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesStyle {
    #[default]
    Line,
    Markers,
}

/// One named series of `(x, y)` points
#[derive(Debug, Clone, PartialEq)]
pub struct XySeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
    pub style: SeriesStyle,
}

impl XySeries {
    pub fn line(name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
            style: SeriesStyle::Line,
        }
    }

    pub fn markers(name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
            style: SeriesStyle::Markers,
        }
    }

    /// Pair up `x` and `y`, dropping non-finite points
    pub fn from_xy(name: impl Into<String>, x: &[f64], y: &[f64], style: SeriesStyle) -> Self {
        Self {
            name: name.into(),
            points: x
                .iter()
                .zip(y)
                .filter(|(a, b)| a.is_finite() && b.is_finite())
                .map(|(&a, &b)| (a, b))
                .collect(),
            style,
        }
    }
}

/// Cartesian chart with any number of series
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XyChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<XySeries>,
    pub log_x: bool,
    pub log_y: bool,
}

impl XyChart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_series(mut self, series: XySeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_log(mut self, log_x: bool, log_y: bool) -> Self {
        self.log_x = log_x;
        self.log_y = log_y;
        self
    }

    /// Points as plotted: log axes are drawn as log10 of the data, and
    /// points that have no logarithm are dropped.
    pub fn transformed(&self) -> Vec<XySeries> {
        let tx = |v: f64| if self.log_x { v.log10() } else { v };
        let ty = |v: f64| if self.log_y { v.log10() } else { v };
        self.series
            .iter()
            .map(|s| XySeries {
                name: s.name.clone(),
                points: s
                    .points
                    .iter()
                    .map(|&(x, y)| (tx(x), ty(y)))
                    .filter(|(x, y)| x.is_finite() && y.is_finite())
                    .collect(),
                style: s.style,
            })
            .collect()
    }

    /// Axis labels with a log10 marker where applicable
    pub fn axis_labels(&self) -> (String, String) {
        let label = |l: &str, log: bool| {
            if log {
                format!("log10 {l}")
            } else {
                l.to_string()
            }
        };
        (label(&self.x_label, self.log_x), label(&self.y_label, self.log_y))
    }
}

/// Filled band between a lower and an upper curve
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub name: String,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Monthly regime: a central line over percentile bands
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegimeChart {
    pub title: String,
    pub y_label: String,
    /// Calendar months (1..=12) present in the data
    pub months: Vec<u32>,
    pub center_name: String,
    pub center: Vec<f64>,
    /// Bands ordered from the outermost to the innermost
    pub bands: Vec<Band>,
}

/// Scalar field on a regular 2D grid with optional observation points
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChart {
    pub title: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// `values[[i, j]]` belongs to `(x[i], y[j])`
    pub values: Array2<f64>,
    pub points: Vec<(f64, f64)>,
}

/// Any payload a rendering routine can draw
#[derive(Debug, Clone, PartialEq)]
pub enum PlotData {
    Xy(XyChart),
    Regime(RegimeChart),
    Field(FieldChart),
}

impl PlotData {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Xy(_) => "xy",
            Self::Regime(_) => "regime",
            Self::Field(_) => "field",
        }
    }
}

impl From<XyChart> for PlotData {
    fn from(c: XyChart) -> Self {
        Self::Xy(c)
    }
}

impl From<RegimeChart> for PlotData {
    fn from(c: RegimeChart) -> Self {
        Self::Regime(c)
    }
}

impl From<FieldChart> for PlotData {
    fn from(c: FieldChart) -> Self {
        Self::Field(c)
    }
}

/// Padded `(min, max)` over finite values, `(0, 1)` when there are none
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return (0.0, 1.0);
    }
    let range = hi - lo;
    let padding = if range < 1e-9 { 0.5 } else { range * 0.05 };
    (lo - padding, hi + padding)
}
