//! Registry of rendering routines keyed by plot and backend

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use tracing::debug;

use crate::backend::{current_backend, Backend};
use crate::data::PlotData;
use crate::figure::{Figure, PlotOptions};
use crate::{Error, Result};

/// Logical plots produced by hydrobox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotKind {
    FlowDurationCurve,
    Regime,
    Variogram,
    Regression,
    Kriging,
}

impl PlotKind {
    pub const ALL: [PlotKind; 5] = [
        PlotKind::FlowDurationCurve,
        PlotKind::Regime,
        PlotKind::Variogram,
        PlotKind::Regression,
        PlotKind::Kriging,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FlowDurationCurve => "flow_duration_curve",
            Self::Regime => "regime",
            Self::Variogram => "variogram",
            Self::Regression => "regression",
            Self::Kriging => "kriging",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlotKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PlotKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| Error::NoPlotRoutine { name: s.to_string() })
    }
}

/// Signature of every rendering routine
pub type RenderFn = fn(&PlotData, &PlotOptions) -> Result<Figure>;

/// Mapping from `(plot, backend)` to a rendering routine
#[derive(Clone, Default)]
pub struct PlotRegistry {
    routines: HashMap<(PlotKind, Backend), RenderFn>,
}

impl fmt::Debug for PlotRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .routines
            .keys()
            .map(|(kind, backend)| format!("{kind}/{backend}"))
            .collect();
        keys.sort();
        f.debug_struct("PlotRegistry").field("routines", &keys).finish()
    }
}

impl PlotRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every routine compiled into this build
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::render::register_builtin(&mut registry);
        debug!(routines = registry.len(), "built-in plot registry populated");
        registry
    }

    /// Add or replace a routine, returning the previous one
    pub fn register(&mut self, kind: PlotKind, backend: Backend, routine: RenderFn) -> Option<RenderFn> {
        self.routines.insert((kind, backend), routine)
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    /// Backends with a routine for `kind`, in preference order
    pub fn backends_for(&self, kind: PlotKind) -> Vec<Backend> {
        Backend::ALL
            .into_iter()
            .filter(|b| self.routines.contains_key(&(kind, *b)))
            .collect()
    }

    /// Routine for `kind` under `backend`
    pub fn get(&self, kind: PlotKind, backend: Backend) -> Result<RenderFn> {
        if let Some(routine) = self.routines.get(&(kind, backend)) {
            return Ok(*routine);
        }
        if self.backends_for(kind).is_empty() {
            Err(Error::NoPlotRoutine {
                name: kind.name().to_string(),
            })
        } else {
            Err(Error::NoBackendRoutine {
                plot: kind.name().to_string(),
                backend,
            })
        }
    }

    /// Routine for the plot called `name` under `backend`
    pub fn load(&self, name: &str, backend: Backend) -> Result<RenderFn> {
        let kind: PlotKind = name.parse()?;
        self.get(kind, backend)
    }
}

lazy_static! {
    static ref DEFAULT_REGISTRY: PlotRegistry = PlotRegistry::with_builtin();
}

/// The registry populated with the built-in routines
pub fn default_registry() -> &'static PlotRegistry {
    &DEFAULT_REGISTRY
}

/// Resolve the routine for plot `name` under the process-wide backend
pub fn plot_function_loader(name: &str) -> Result<RenderFn> {
    default_registry().load(name, current_backend()?)
}
