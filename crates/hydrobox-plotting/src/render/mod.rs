//! Built-in rendering routines
//!
//! Every routine checks that it received the payload its plot produces and
//! then hands off to the backend renderer.

#[cfg(feature = "html")]
mod html;
#[cfg(any(feature = "bitmap", feature = "svg"))]
mod raster;

use crate::data::PlotData;
#[allow(unused_imports)]
use crate::figure::{Figure, PlotOptions};
use crate::registry::PlotRegistry;
#[allow(unused_imports)]
use crate::{Error, Result};

#[allow(dead_code)]
fn expect_payload(data: &PlotData, expected: &'static str, routine: &str) -> Result<()> {
    if data.kind_name() == expected {
        Ok(())
    } else {
        Err(Error::payload_mismatch(routine, expected))
    }
}

#[cfg(feature = "bitmap")]
fn bitmap_xy(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    expect_payload(data, "xy", "bitmap_xy")?;
    raster::render_bitmap(data, options)
}

#[cfg(feature = "bitmap")]
fn bitmap_regime(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    expect_payload(data, "regime", "bitmap_regime")?;
    raster::render_bitmap(data, options)
}

#[cfg(feature = "bitmap")]
fn bitmap_field(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    expect_payload(data, "field", "bitmap_field")?;
    raster::render_bitmap(data, options)
}

#[cfg(feature = "svg")]
fn svg_xy(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    expect_payload(data, "xy", "svg_xy")?;
    raster::render_svg(data, options)
}

#[cfg(feature = "svg")]
fn svg_regime(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    expect_payload(data, "regime", "svg_regime")?;
    raster::render_svg(data, options)
}

#[cfg(feature = "svg")]
fn svg_field(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    expect_payload(data, "field", "svg_field")?;
    raster::render_svg(data, options)
}

#[cfg(feature = "html")]
fn html_xy(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    expect_payload(data, "xy", "html_xy")?;
    html::render_html(data, options)
}

#[cfg(feature = "html")]
fn html_regime(data: &PlotData, options: &PlotOptions) -> Result<Figure> {
    expect_payload(data, "regime", "html_regime")?;
    html::render_html(data, options)
}

/// Register every routine compiled into this build
#[allow(unused_variables)]
pub(crate) fn register_builtin(registry: &mut PlotRegistry) {
    #[allow(unused_imports)]
    use crate::backend::Backend;
    #[allow(unused_imports)]
    use crate::registry::PlotKind;

    #[cfg(feature = "bitmap")]
    {
        registry.register(PlotKind::FlowDurationCurve, Backend::Bitmap, bitmap_xy);
        registry.register(PlotKind::Regime, Backend::Bitmap, bitmap_regime);
        registry.register(PlotKind::Variogram, Backend::Bitmap, bitmap_xy);
        registry.register(PlotKind::Regression, Backend::Bitmap, bitmap_xy);
        registry.register(PlotKind::Kriging, Backend::Bitmap, bitmap_field);
    }
    #[cfg(feature = "svg")]
    {
        registry.register(PlotKind::FlowDurationCurve, Backend::Svg, svg_xy);
        registry.register(PlotKind::Regime, Backend::Svg, svg_regime);
        registry.register(PlotKind::Variogram, Backend::Svg, svg_xy);
        registry.register(PlotKind::Regression, Backend::Svg, svg_xy);
        registry.register(PlotKind::Kriging, Backend::Svg, svg_field);
    }
    #[cfg(feature = "html")]
    {
        registry.register(PlotKind::FlowDurationCurve, Backend::Html, html_xy);
        registry.register(PlotKind::Regime, Backend::Html, html_regime);
        registry.register(PlotKind::Variogram, Backend::Html, html_xy);
    }
}
