//! TOML configuration
//!
//! ```toml
//! [plotting]
//! backend = "svg"
//! width = 1024
//! height = 768
//!
//! [io]
//! data_dir = "/data/gauges"
//! ```
//!
//! Every section and key is optional. `HB_PLOT_BACKEND` overrides
//! `plotting.backend`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use hydrobox_plotting::backend::resolve_backend;
use hydrobox_plotting::{available_backends, plotting_backend, Backend, PlotContext, PlotOptions};

use crate::{Error, Result};

/// Top-level hydrobox configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HydroboxConfig {
    /// Plotting settings.
    #[serde(default)]
    pub plotting: PlottingConfig,

    /// I/O settings.
    #[serde(default)]
    pub io: IoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlottingConfig {
    /// Backend name; the process-wide default is kept when unset
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}

impl Default for PlottingConfig {
    fn default() -> Self {
        Self {
            backend: None,
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoConfig {
    /// Directory that relative data paths are resolved against
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl HydroboxConfig {
    /// Parse TOML; `source_name` is used in error messages
    pub fn from_toml(toml_str: &str, source_name: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }

    /// Read and parse a TOML file, then apply the environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let toml_str = std::fs::read_to_string(path).map_err(|e| Error::Config {
            source_name: source_name.clone(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&toml_str, &source_name)?;
        debug!(path = %source_name, "configuration loaded");
        Ok(config.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Apply `HB_PLOT_BACKEND` as returned by `lookup`
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(backend) = lookup("HB_PLOT_BACKEND").filter(|b| !b.trim().is_empty()) {
            debug!(backend = %backend, "plotting backend overridden from the environment");
            self.plotting.backend = Some(backend);
        }
        self
    }

    /// The configured backend, validated against the compiled-in ones
    pub fn backend(&self) -> Result<Option<Backend>> {
        self.plotting
            .backend
            .as_deref()
            .map(|name| resolve_backend(name, available_backends()))
            .transpose()
            .map_err(Error::from)
    }

    pub fn plot_options(&self) -> PlotOptions {
        PlotOptions::default().with_size(self.plotting.width, self.plotting.height)
    }

    /// Explicit plotting context; falls back to the process-wide backend
    pub fn plot_context(&self) -> Result<PlotContext> {
        Ok(match self.backend()? {
            Some(backend) => PlotContext::new(backend)?,
            None => PlotContext::current()?,
        })
    }

    /// Make the configured backend the process-wide one
    pub fn apply(&self) -> Result<Backend> {
        Ok(plotting_backend(self.plotting.backend.as_deref())?)
    }

    /// `path` resolved against `io.data_dir` when it is relative
    pub fn data_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.io.data_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = HydroboxConfig::from_toml("", "empty").unwrap();
        assert_eq!(config, HydroboxConfig::default());
        assert_eq!(config.plot_options().width, 800);
        assert_eq!(config.data_path("q.csv"), PathBuf::from("q.csv"));
    }

    #[test]
    fn test_sections() {
        let config = HydroboxConfig::from_toml(
            "[plotting]\nbackend = \"html\"\nheight = 300\n\n[io]\ndata_dir = \"/data\"\n",
            "inline",
        )
        .unwrap();
        assert_eq!(config.plotting.backend.as_deref(), Some("html"));
        assert_eq!((config.plotting.width, config.plotting.height), (800, 300));
        assert_eq!(config.data_path("q.csv"), PathBuf::from("/data/q.csv"));
        assert_eq!(config.data_path("/abs/q.csv"), PathBuf::from("/abs/q.csv"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = HydroboxConfig::from_toml("[plotting]\ncolour = 1\n", "inline").unwrap_err();
        assert!(err.to_string().starts_with("Invalid configuration inline"));
    }

    #[test]
    fn test_env_override() {
        let config = HydroboxConfig::default().with_env_overrides(|name| {
            (name == "HB_PLOT_BACKEND").then(|| "bitmap".to_string())
        });
        assert_eq!(config.plotting.backend.as_deref(), Some("bitmap"));

        let config = HydroboxConfig::default().with_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.plotting.backend, None);
    }

    #[test]
    fn test_unknown_backend_name() {
        let mut config = HydroboxConfig::default();
        config.plotting.backend = Some("gnuplot".to_string());
        assert!(matches!(
            config.backend(),
            Err(Error::Plot(hydrobox_plotting::Error::UnknownBackend { .. }))
        ));
    }
}
