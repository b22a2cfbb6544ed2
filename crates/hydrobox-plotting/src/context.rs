//! Explicit plotting context
//!
//! A `PlotContext` carries its own backend and availability list, so a
//! caller can render with a given backend without touching the
//! process-wide selector.

use std::sync::Arc;

use tracing::debug;

use crate::backend::{available_backends, current_backend, ensure_available, resolve_backend, Backend};
use crate::data::PlotData;
use crate::figure::{Figure, PlotOptions};
use crate::registry::{default_registry, PlotKind, PlotRegistry, RenderFn};
use crate::Result;

/// Backend selection and routine lookup for a series of plot calls
#[derive(Debug, Clone)]
pub struct PlotContext {
    backend: Backend,
    available: Vec<Backend>,
    registry: Option<Arc<PlotRegistry>>,
}

impl PlotContext {
    /// Snapshot of the process-wide backend
    pub fn current() -> Result<Self> {
        Ok(Self {
            backend: current_backend()?,
            available: available_backends().to_vec(),
            registry: None,
        })
    }

    /// Context for `backend`, which must be compiled in
    pub fn new(backend: Backend) -> Result<Self> {
        Self::with_available(backend, available_backends().to_vec())
    }

    /// Context with an explicit availability list
    pub fn with_available(backend: Backend, available: Vec<Backend>) -> Result<Self> {
        let backend = ensure_available(backend, &available)?;
        Ok(Self {
            backend,
            available,
            registry: None,
        })
    }

    /// Use `registry` instead of the built-in one
    pub fn with_registry(mut self, registry: Arc<PlotRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn available(&self) -> &[Backend] {
        &self.available
    }

    /// Switch this context to the backend called `name`
    pub fn set_backend(&mut self, name: &str) -> Result<Backend> {
        self.backend = resolve_backend(name, &self.available)?;
        Ok(self.backend)
    }

    fn registry(&self) -> &PlotRegistry {
        self.registry.as_deref().unwrap_or_else(|| default_registry())
    }

    /// Routine for the plot called `name` under this context's backend
    pub fn loader(&self, name: &str) -> Result<RenderFn> {
        self.registry().load(name, self.backend)
    }

    /// Render `data` as plot `kind`
    pub fn render(&self, kind: PlotKind, data: impl Into<PlotData>, options: &PlotOptions) -> Result<Figure> {
        let routine = self.registry().get(kind, self.backend)?;
        let data = data.into();
        debug!(plot = %kind, backend = %self.backend, payload = data.kind_name(), "rendering");
        routine(&data, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn stub(data: &PlotData, _: &PlotOptions) -> Result<Figure> {
        Ok(Figure::Html(data.kind_name().to_string()))
    }

    #[test]
    fn test_context_rejects_unavailable() {
        let err = PlotContext::with_available(Backend::Html, vec![Backend::Svg]).unwrap_err();
        assert!(matches!(err, Error::BackendUnavailable { backend: Backend::Html, .. }));
    }

    #[test]
    fn test_set_backend_distinguishes_errors() {
        let mut ctx = PlotContext::with_available(Backend::Svg, vec![Backend::Svg, Backend::Bitmap]).unwrap();
        assert_eq!(ctx.set_backend("bitmap").unwrap(), Backend::Bitmap);
        assert!(matches!(ctx.set_backend("plotly"), Err(Error::UnknownBackend { .. })));
        assert!(matches!(ctx.set_backend("html"), Err(Error::BackendUnavailable { .. })));
        // failed setters leave the backend untouched
        assert_eq!(ctx.backend(), Backend::Bitmap);
    }

    #[test]
    fn test_render_with_custom_registry() {
        let mut registry = PlotRegistry::new();
        registry.register(PlotKind::Regime, Backend::Html, stub);
        let ctx = PlotContext::with_available(Backend::Html, vec![Backend::Html])
            .unwrap()
            .with_registry(Arc::new(registry));

        let fig = ctx
            .render(PlotKind::Regime, crate::data::RegimeChart::default(), &PlotOptions::default())
            .unwrap();
        assert_eq!(fig, Figure::Html("regime".to_string()));
        assert!(matches!(ctx.loader("kriging"), Err(Error::NoPlotRoutine { .. })));
    }
}
