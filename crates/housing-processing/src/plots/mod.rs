//! Diagnostic charts rendered as SVG.
//!
//! Every routine takes an explicit [`PlotStyle`] and an optional output
//! directory. With a directory the chart is written under a fixed file name
//! and the path is returned; without one it is rendered in memory only.

mod correlation;
mod distribution;
mod prediction;

pub use correlation::{CorrelationMatrix, correlation_matrix, plot_correlation_heatmap};
pub use distribution::{HistogramBin, build_histogram, gaussian_kde, plot_price_distribution};
pub use prediction::plot_true_vs_pred;

use crate::error::{ProcessingError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const PRICE_DISTRIBUTION_FILE: &str = "price_distribution.svg";
pub const CORRELATION_HEATMAP_FILE: &str = "correlation_heatmap.svg";
pub const PREDICTION_VS_TRUE_FILE: &str = "prediction_vs_true.svg";

/// Fonts and resolution shared by all charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Font family written into the SVG text elements.
    pub font_family: String,
    pub title_font_size: u32,
    pub label_font_size: u32,
    pub tick_font_size: u32,
    /// Heatmap cell annotations.
    pub annotation_font_size: u32,
    /// Pixels per inch of figure size.
    pub pixels_per_inch: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            title_font_size: 20,
            label_font_size: 14,
            tick_font_size: 11,
            annotation_font_size: 10,
            pixels_per_inch: 100,
        }
    }
}

impl PlotStyle {
    /// Pixel dimensions of a `width` x `height` inch figure.
    pub fn figure_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width * self.pixels_per_inch, height * self.pixels_per_inch)
    }

    pub(crate) fn title_font(&self) -> TextStyle<'_> {
        (self.font_family.as_str(), self.title_font_size).into_font().into()
    }

    pub(crate) fn label_font(&self) -> TextStyle<'_> {
        (self.font_family.as_str(), self.label_font_size).into_font().into()
    }

    pub(crate) fn tick_font(&self) -> TextStyle<'_> {
        (self.font_family.as_str(), self.tick_font_size).into_font().into()
    }

    pub(crate) fn annotation_font(&self) -> TextStyle<'_> {
        (self.font_family.as_str(), self.annotation_font_size).into_font().into()
    }
}

pub(crate) fn plot_error(e: impl std::fmt::Display) -> ProcessingError {
    ProcessingError::Plot(e.to_string())
}

/// Render one chart to `save_dir/file_name`, or into a discarded string when
/// no directory is given.
pub(crate) fn render_svg<F>(
    save_dir: Option<&Path>,
    file_name: &str,
    size: (u32, u32),
    draw: F,
) -> Result<Option<PathBuf>>
where
    F: for<'b> FnOnce(&DrawingArea<SVGBackend<'b>, Shift>) -> Result<()>,
{
    match save_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let path = dir.join(file_name);
            {
                let root = SVGBackend::new(&path, size).into_drawing_area();
                root.fill(&WHITE).map_err(plot_error)?;
                draw(&root)?;
                root.present().map_err(plot_error)?;
            }
            info!("Chart saved: {}", path.display());
            Ok(Some(path))
        }
        None => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
                root.fill(&WHITE).map_err(plot_error)?;
                draw(&root)?;
                root.present().map_err(plot_error)?;
            }
            debug!("Rendered {} in memory ({} bytes)", file_name, svg.len());
            Ok(None)
        }
    }
}

/// Padded axis range; a degenerate range is widened to stay drawable.
pub(crate) fn padded_range(min: f64, max: f64, padding: f64) -> std::ops::Range<f64> {
    if (max - min).abs() < f64::EPSILON {
        let delta = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return (min - delta)..(max + delta);
    }
    let pad = (max - min) * padding;
    (min - pad)..(max + pad)
}
