//! Plotting backends and the process-wide backend selector
//!
//! The selector is process-wide state, not scoped to a call. It is a single
//! atomic: concurrent setters race and the last store wins. Callers that
//! need a different backend per call should build a
//! [`PlotContext`](crate::PlotContext) instead of mutating the global.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// Rendering targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Static raster image (plotters bitmap)
    Bitmap,
    /// Static vector image (plotters SVG)
    Svg,
    /// Interactive HTML page (charming / ECharts)
    Html,
}

impl Backend {
    /// The fixed set, in default-preference order
    pub const ALL: [Backend; 3] = [Backend::Bitmap, Backend::Svg, Backend::Html];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bitmap => "bitmap",
            Self::Svg => "svg",
            Self::Html => "html",
        }
    }

    /// Whether the renderer for this backend was compiled in
    pub fn is_compiled(&self) -> bool {
        match self {
            Self::Bitmap => cfg!(feature = "bitmap"),
            Self::Svg => cfg!(feature = "svg"),
            Self::Html => cfg!(feature = "html"),
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::Bitmap => 1,
            Self::Svg => 2,
            Self::Html => 3,
        }
    }

    fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Bitmap),
            2 => Some(Self::Svg),
            3 => Some(Self::Html),
            _ => None,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Backend::ALL
            .into_iter()
            .find(|b| b.name() == name)
            .ok_or_else(|| Error::UnknownBackend {
                name: s.to_string(),
                allowed: join(&Backend::ALL),
            })
    }
}

pub(crate) fn join(backends: &[Backend]) -> String {
    if backends.is_empty() {
        return "none".to_string();
    }
    backends
        .iter()
        .map(Backend::name)
        .collect::<Vec<_>>()
        .join(", ")
}

lazy_static! {
    static ref AVAILABLE: Vec<Backend> = {
        let found: Vec<Backend> = Backend::ALL.into_iter().filter(Backend::is_compiled).collect();
        debug!(backends = %join(&found), "detected plotting backends");
        found
    };
}

// 0 means unset; the first available backend is used then
static CURRENT: AtomicU8 = AtomicU8::new(0);

/// Backends compiled into this build, detected once
pub fn available_backends() -> &'static [Backend] {
    &AVAILABLE
}

/// Check that `backend` is one of `available`
pub fn ensure_available(backend: Backend, available: &[Backend]) -> Result<Backend> {
    if available.contains(&backend) {
        Ok(backend)
    } else {
        Err(Error::BackendUnavailable {
            backend,
            available: join(available),
        })
    }
}

/// Parse `name` and check it against `available`
pub fn resolve_backend(name: &str, available: &[Backend]) -> Result<Backend> {
    let backend: Backend = name.parse()?;
    ensure_available(backend, available)
}

/// The process-wide backend
pub fn current_backend() -> Result<Backend> {
    match Backend::from_u8(CURRENT.load(Ordering::Relaxed)) {
        Some(backend) => Ok(backend),
        None => available_backends()
            .first()
            .copied()
            .ok_or(Error::NoBackendEnabled),
    }
}

/// Get or set the process-wide backend.
///
/// With `None` the current backend is returned. With a name, the backend is
/// validated against the fixed set and the compiled-in renderers before it
/// replaces the current one; the new backend is returned.
pub fn plotting_backend(name: Option<&str>) -> Result<Backend> {
    match name {
        None => current_backend(),
        Some(name) => {
            let backend = resolve_backend(name, available_backends())?;
            store(backend);
            Ok(backend)
        }
    }
}

/// Typed setter for the process-wide backend
pub fn set_plotting_backend(backend: Backend) -> Result<Backend> {
    let backend = ensure_available(backend, available_backends())?;
    store(backend);
    Ok(backend)
}

fn store(backend: Backend) {
    let previous = CURRENT.swap(backend.to_u8(), Ordering::Relaxed);
    info!(
        backend = %backend,
        previous = ?Backend::from_u8(previous),
        "plotting backend changed"
    );
}
