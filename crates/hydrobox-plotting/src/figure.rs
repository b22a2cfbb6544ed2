//! Rendered figures and rendering options

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::Backend;
use crate::Result;

/// Options shared by every renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    /// Base RGB color of the first series
    pub color: Option<(u8, u8, u8)>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: None,
            color: None,
        }
    }
}

impl PlotOptions {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_color(mut self, r: u8, g: u8, b: u8) -> Self {
        self.color = Some((r, g, b));
        self
    }
}

/// Output of a rendering routine
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    /// Packed RGB pixels, row major
    Bitmap {
        width: u32,
        height: u32,
        rgb: Vec<u8>,
    },
    /// SVG document
    Svg(String),
    /// Standalone HTML page
    Html(String),
}

impl Figure {
    /// Backend that produced this figure
    pub fn backend(&self) -> Backend {
        match self {
            Self::Bitmap { .. } => Backend::Bitmap,
            Self::Svg(_) => Backend::Svg,
            Self::Html(_) => Backend::Html,
        }
    }

    /// Document text for SVG and HTML figures
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Svg(s) | Self::Html(s) => Some(s),
            Self::Bitmap { .. } => None,
        }
    }

    /// Write the figure to `path`.
    ///
    /// Text figures are written as-is; bitmaps are written as binary PPM.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path)?;
        match self {
            Self::Svg(s) | Self::Html(s) => file.write_all(s.as_bytes())?,
            Self::Bitmap { width, height, rgb } => {
                write!(file, "P6\n{width} {height}\n255\n")?;
                file.write_all(rgb)?;
            }
        }
        debug!(path = %path.display(), backend = %self.backend(), "figure saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let opts = PlotOptions::default()
            .with_size(400, 300)
            .with_title("FDC")
            .with_color(10, 20, 30);
        assert_eq!(opts.width, 400);
        assert_eq!(opts.title.as_deref(), Some("FDC"));
        assert_eq!(opts.color, Some((10, 20, 30)));
    }

    #[test]
    fn test_figure_backend_and_text() {
        let fig = Figure::Svg("<svg/>".to_string());
        assert_eq!(fig.backend(), Backend::Svg);
        assert_eq!(fig.as_text(), Some("<svg/>"));

        let fig = Figure::Bitmap {
            width: 1,
            height: 1,
            rgb: vec![0, 0, 0],
        };
        assert!(fig.as_text().is_none());
    }

    #[test]
    fn test_save_bitmap_as_ppm() {
        let fig = Figure::Bitmap {
            width: 2,
            height: 1,
            rgb: vec![255, 0, 0, 0, 255, 0],
        };
        let path = std::env::temp_dir().join("hydrobox_plotting_test.ppm");
        fig.save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n2 1\n255\n"));
        assert_eq!(bytes.len(), 11 + 6);
        std::fs::remove_file(path).ok();
    }
}
