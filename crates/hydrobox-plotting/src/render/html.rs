//! charming (ECharts) renderers for the interactive HTML backend

use charming::component::{Axis, Legend, Title};
use charming::element::AxisType;
use charming::series::{Line, Scatter};
use charming::{Chart, HtmlRenderer};

use crate::data::{PlotData, RegimeChart, SeriesStyle, XyChart};
use crate::figure::{Figure, PlotOptions};
use crate::{Error, Result};

fn points(xy: &[(f64, f64)]) -> Vec<Vec<f64>> {
    xy.iter().map(|&(x, y)| vec![x, y]).collect()
}

fn xy_chart(chart: &XyChart, title: &str) -> Chart {
    let (x_label, y_label) = chart.axis_labels();
    let mut out = Chart::new()
        .title(Title::new().text(title))
        .legend(Legend::new())
        .x_axis(Axis::new().type_(AxisType::Value).name(x_label))
        .y_axis(Axis::new().type_(AxisType::Value).name(y_label));

    for s in chart.transformed() {
        let data = points(&s.points);
        out = match s.style {
            SeriesStyle::Line => out.series(Line::new().name(s.name).show_symbol(false).data(data)),
            SeriesStyle::Markers => out.series(Scatter::new().name(s.name).symbol_size(6.0).data(data)),
        };
    }
    out
}

fn regime_chart(chart: &RegimeChart, title: &str) -> Chart {
    let x: Vec<f64> = chart.months.iter().map(|&m| f64::from(m)).collect();
    let pair = |values: &[f64]| -> Vec<Vec<f64>> {
        x.iter().zip(values).map(|(&m, &v)| vec![m, v]).collect()
    };

    let mut out = Chart::new()
        .title(Title::new().text(title))
        .legend(Legend::new())
        .x_axis(Axis::new().type_(AxisType::Value).name("month"))
        .y_axis(Axis::new().type_(AxisType::Value).name(chart.y_label.as_str()));

    for band in &chart.bands {
        out = out
            .series(
                Line::new()
                    .name(format!("{} lower", band.name))
                    .show_symbol(false)
                    .data(pair(&band.lower)),
            )
            .series(
                Line::new()
                    .name(format!("{} upper", band.name))
                    .show_symbol(false)
                    .data(pair(&band.upper)),
            );
    }
    out.series(Line::new().name(chart.center_name.as_str()).data(pair(&chart.center)))
}

fn to_html(chart: &Chart, title: &str, options: &PlotOptions) -> Result<Figure> {
    HtmlRenderer::new(title, u64::from(options.width), u64::from(options.height))
        .render(chart)
        .map(Figure::Html)
        .map_err(|e| Error::Render(format!("{e:?}")))
}

/// Render any supported payload as an HTML page
pub(crate) fn render_html(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    match data {
        PlotData::Xy(chart) => {
            let title = options.title.as_deref().unwrap_or(&chart.title);
            to_html(&xy_chart(chart, title), title, options)
        }
        PlotData::Regime(chart) => {
            let title = options.title.as_deref().unwrap_or(&chart.title);
            to_html(&regime_chart(chart, title), title, options)
        }
        PlotData::Field(_) => Err(Error::payload_mismatch("render_html", "xy or regime")),
    }
}
