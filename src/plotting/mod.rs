//! Plot generation
//!
//! - **resolver** - analysis results to [`RenderSpec`] (sorting, totals, change)
//! - **table** - table plot drawing on any plotters backend
//! - **trend** - multi-report progress line chart
//! - **styles** - colour palette and class colours
//! - **fonts** - runtime font registration for raster output
//!
//! Figures are written as PNG through the bitmap backend or as SVG,
//! depending on the configured image format.

pub mod fonts;
pub mod resolver;
pub mod styles;
pub mod table;
pub mod trend;

pub use resolver::{resolve, RenderRow, RenderSpec, ResolveInput};
pub use trend::{build_trend, TrendChart, TrendGrouping, TrendSeries};

use crate::config::{ImageFormat, PlotSettings};
use crate::errors::{AppError, AppResult};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

/// Something that can be laid out and drawn at a given pixel scale
pub trait Figure {
    /// Pixel size at `scale` (1.0 = 100 dpi)
    fn size(&self, scale: f64) -> (u32, u32);

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        scale: f64,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>;
}

fn render_error<E: std::fmt::Display>(err: E) -> AppError {
    AppError::Render(err.to_string())
}

/// Write a figure to `path` in the configured format
pub fn save_figure<F: Figure>(figure: &F, path: &Path, settings: &PlotSettings) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let scale = settings.scale();
    let size = figure.size(scale);

    match settings.image_format {
        ImageFormat::Png => {
            fonts::ensure_registered(settings.font_file.as_deref())?;
            let root = BitMapBackend::new(path, size).into_drawing_area();
            figure.draw(&root, scale).map_err(render_error)?;
            root.present().map_err(render_error)?;
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            figure.draw(&root, scale).map_err(render_error)?;
            root.present().map_err(render_error)?;
        }
    }

    info!("Plot saved to {}", path.display());
    Ok(())
}

/// Render a figure to an SVG document in memory
pub fn render_svg<F: Figure>(figure: &F, scale: f64) -> AppResult<String> {
    let size = figure.size(scale);
    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        figure.draw(&root, scale).map_err(render_error)?;
        root.present().map_err(render_error)?;
    }
    Ok(buffer)
}

/// Layout units (inches at 100 dpi) to pixels
pub(crate) fn px(units: f64, scale: f64) -> i32 {
    (units * 100.0 * scale).round() as i32
}

/// Point size to pixel font size
pub(crate) fn font_px(points: f64, scale: f64) -> f64 {
    points * scale * 100.0 / 72.0
}
