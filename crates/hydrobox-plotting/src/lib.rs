//! Plotting backend dispatch for hydrobox
//!
//! Analysis functions describe a chart as [`PlotData`] and hand it to a
//! [`PlotContext`], which looks up the routine for `(PlotKind, Backend)` in
//! a [`PlotRegistry`] and returns a [`Figure`].
//!
//! Three backends make up the fixed set:
//!
//! - [`Backend::Bitmap`]: static raster image via plotters (feature `bitmap`)
//! - [`Backend::Svg`]: static vector image via plotters (feature `svg`)
//! - [`Backend::Html`]: interactive ECharts page via charming (feature `html`)
//!
//! [`plotting_backend`] reads or changes the process-wide backend. That
//! value is shared by every thread and is not synchronised beyond a single
//! atomic store, so concurrent setters race and the last one wins. Pass an
//! explicit [`PlotContext`] where a call needs its own backend.
//!
//! # Example
//!
//! ```rust
//! use hydrobox_plotting::{plotting_backend, Error};
//!
//! assert!(matches!(plotting_backend(Some("matplotlib")), Err(Error::UnknownBackend { .. })));
//! ```

pub mod backend;
pub mod context;
pub mod data;
pub mod error;
pub mod figure;
pub mod registry;
mod render;

pub use backend::{available_backends, current_backend, plotting_backend, set_plotting_backend, Backend};
pub use context::PlotContext;
pub use data::{Band, FieldChart, PlotData, RegimeChart, SeriesStyle, XyChart, XySeries};
pub use error::{Error, Result};
pub use figure::{Figure, PlotOptions};
pub use registry::{default_registry, plot_function_loader, PlotKind, PlotRegistry, RenderFn};
