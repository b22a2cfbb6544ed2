//! plotters renderers for the bitmap and SVG backends
//!
//! Drawing is written once against any `DrawingBackend`; the two entry
//! points only differ in the backend they hand to [`draw`].

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::data::{padded_range, FieldChart, PlotData, RegimeChart, SeriesStyle, XyChart};
use crate::figure::{Figure, PlotOptions};
use crate::{Error, Result};

const FONT: &str = "sans-serif";

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

/// Render into an in-memory RGB buffer
#[cfg(feature = "bitmap")]
pub(crate) fn render_bitmap(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    let (width, height) = (options.width, options.height);
    let mut rgb = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        draw(&root, data, options)?;
        root.present().map_err(render_err)?;
    }
    Ok(Figure::Bitmap { width, height, rgb })
}

/// Render into an SVG document
#[cfg(feature = "svg")]
pub(crate) fn render_svg(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    let mut doc = String::new();
    {
        let root = SVGBackend::with_string(&mut doc, (options.width, options.height))
            .into_drawing_area();
        draw(&root, data, options)?;
        root.present().map_err(render_err)?;
    }
    Ok(Figure::Svg(doc))
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &PlotData,
    options: &PlotOptions,
) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;
    match data {
        PlotData::Xy(chart) => draw_xy(root, chart, options),
        PlotData::Regime(chart) => draw_regime(root, chart, options),
        PlotData::Field(chart) => draw_field(root, chart, options),
    }
}

fn series_color(i: usize, options: &PlotOptions) -> RGBColor {
    match (i, options.color) {
        (0, Some((r, g, b))) => RGBColor(r, g, b),
        _ => {
            let (r, g, b) = Palette99::pick(i).rgb();
            RGBColor(r, g, b)
        }
    }
}

fn draw_xy<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &XyChart,
    options: &PlotOptions,
) -> Result<()> {
    let series = chart.transformed();
    let (x0, x1) = padded_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
    let (y0, y1) = padded_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));
    let (x_label, y_label) = chart.axis_labels();
    let title = options.title.as_deref().unwrap_or(&chart.title);

    let mut ctx = ChartBuilder::on(root)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    ctx.configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style((FONT, 12))
        .draw()
        .map_err(render_err)?;

    for (i, s) in series.iter().enumerate() {
        let color = series_color(i, options);
        match s.style {
            SeriesStyle::Line => ctx
                .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))
                .map_err(render_err)?
                .label(&s.name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))),
            SeriesStyle::Markers => ctx
                .draw_series(s.points.iter().map(|&p| Circle::new(p, 3, color.filled())))
                .map_err(render_err)?
                .label(&s.name)
                .legend(move |(x, y)| Circle::new((x + 10, y), 3, color.filled())),
        };
    }

    if series.len() > 1 {
        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT, 12))
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

fn draw_regime<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &RegimeChart,
    options: &PlotOptions,
) -> Result<()> {
    let x: Vec<f64> = chart.months.iter().map(|&m| f64::from(m)).collect();
    let all_values = chart
        .center
        .iter()
        .chain(chart.bands.iter().flat_map(|b| b.lower.iter().chain(&b.upper)))
        .copied();
    let (y0, y1) = padded_range(all_values);
    let title = options.title.as_deref().unwrap_or(&chart.title);

    let mut ctx = ChartBuilder::on(root)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5..12.5, y0..y1)
        .map_err(render_err)?;

    ctx.configure_mesh()
        .x_desc("month")
        .y_desc(chart.y_label.as_str())
        .x_labels(12)
        .label_style((FONT, 12))
        .draw()
        .map_err(render_err)?;

    let base = series_color(0, options);
    let n_bands = chart.bands.len().max(1) as f64;
    for (i, band) in chart.bands.iter().enumerate() {
        let mut outline: Vec<(f64, f64)> = x.iter().copied().zip(band.upper.iter().copied()).collect();
        outline.extend(x.iter().copied().zip(band.lower.iter().copied()).rev());
        // inner bands are drawn darker on top of outer ones
        let alpha = 0.15 + 0.35 * (i as f64 + 1.0) / n_bands;
        ctx.draw_series(std::iter::once(Polygon::new(outline, base.mix(alpha).filled())))
            .map_err(render_err)?
            .label(&band.name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 20, y + 4)], base.mix(alpha).filled()));
    }

    let center: Vec<(f64, f64)> = x.iter().copied().zip(chart.center.iter().copied()).collect();
    ctx.draw_series(LineSeries::new(center, base.stroke_width(2)))
        .map_err(render_err)?
        .label(&chart.center_name)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], base.stroke_width(2)));

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((FONT, 12))
        .draw()
        .map_err(render_err)?;
    Ok(())
}

/// Blue to yellow ramp for `t` in `[0, 1]`
fn ramp(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    hsl_to_rgb(240.0 - 180.0 * t, 0.75, 0.35 + 0.25 * t)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> RGBColor {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = (h % 360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    RGBColor(to_u8(r), to_u8(g), to_u8(b))
}

/// Cell edges around grid coordinates
fn cell_edges(coords: &[f64]) -> Vec<f64> {
    match coords.len() {
        0 => Vec::new(),
        1 => vec![coords[0] - 0.5, coords[0] + 0.5],
        n => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(coords[0] - (coords[1] - coords[0]) / 2.0);
            edges.extend(coords.windows(2).map(|w| (w[0] + w[1]) / 2.0));
            edges.push(coords[n - 1] + (coords[n - 1] - coords[n - 2]) / 2.0);
            edges
        }
    }
}

fn draw_field<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &FieldChart,
    options: &PlotOptions,
) -> Result<()> {
    let (nx, ny) = chart.values.dim();
    if nx != chart.x.len() || ny != chart.y.len() {
        return Err(Error::Render(format!(
            "field of shape {nx}x{ny} does not match axes of length {} and {}",
            chart.x.len(),
            chart.y.len()
        )));
    }
    let x_edges = cell_edges(&chart.x);
    let y_edges = cell_edges(&chart.y);
    let (x0, x1) = padded_range(x_edges.iter().copied());
    let (y0, y1) = padded_range(y_edges.iter().copied());
    let (lo, hi) = chart
        .values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = if hi > lo { hi - lo } else { 1.0 };
    let title = options.title.as_deref().unwrap_or(&chart.title);

    let mut ctx = ChartBuilder::on(root)
        .caption(title, (FONT, 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    ctx.configure_mesh()
        .disable_mesh()
        .label_style((FONT, 12))
        .draw()
        .map_err(render_err)?;

    let cells = (0..nx).flat_map(|i| (0..ny).map(move |j| (i, j)));
    ctx.draw_series(cells.map(|(i, j)| {
        let color = ramp((chart.values[[i, j]] - lo) / span);
        Rectangle::new(
            [(x_edges[i], y_edges[j]), (x_edges[i + 1], y_edges[j + 1])],
            color.filled(),
        )
    }))
    .map_err(render_err)?;

    ctx.draw_series(
        chart
            .points
            .iter()
            .map(|&p| Circle::new(p, 3, BLACK.filled())),
    )
    .map_err(render_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::XySeries;

    #[test]
    fn test_cell_edges() {
        assert_eq!(cell_edges(&[0.0, 1.0, 2.0]), vec![-0.5, 0.5, 1.5, 2.5]);
        assert_eq!(cell_edges(&[3.0]), vec![2.5, 3.5]);
        assert!(cell_edges(&[]).is_empty());
    }

    #[test]
    fn test_ramp_endpoints() {
        let low = ramp(0.0);
        let high = ramp(1.0);
        assert!(low.2 > low.0, "low end is blue");
        assert!(high.0 > high.2 && high.1 > high.2, "high end is yellow");
        assert_eq!(ramp(f64::NAN), low);
    }

    #[test]
    fn test_first_series_uses_option_color() {
        let opts = PlotOptions::default().with_color(1, 2, 3);
        assert_eq!(series_color(0, &opts), RGBColor(1, 2, 3));
        assert_ne!(series_color(1, &opts), RGBColor(1, 2, 3));
    }

    // Text rendering needs system fonts
    #[cfg(feature = "svg")]
    #[test]
    #[ignore]
    fn test_svg_xy_render() {
        let chart = XyChart::new("fdc")
            .with_labels("p", "Q")
            .with_series(XySeries::line("Q", vec![(0.1, 1.0), (0.5, 2.0), (0.9, 4.0)]));
        let fig = render_svg(&PlotData::Xy(chart), &PlotOptions::default()).unwrap();
        assert!(fig.as_text().unwrap().contains("<svg"));
    }

    #[cfg(feature = "bitmap")]
    #[test]
    #[ignore]
    fn test_bitmap_buffer_size() {
        let chart = XyChart::new("x").with_series(XySeries::markers("a", vec![(0.0, 0.0), (1.0, 1.0)]));
        let opts = PlotOptions::default().with_size(120, 80);
        match render_bitmap(&PlotData::Xy(chart), &opts).unwrap() {
            Figure::Bitmap { width, height, rgb } => assert_eq!(rgb.len(), (width * height * 3) as usize),
            other => panic!("unexpected figure {other:?}"),
        }
    }
}
