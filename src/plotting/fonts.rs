//! Font registration for the bitmap backend
//!
//! plotters is built without system font discovery, so raster output needs a
//! TTF registered under the `sans-serif` family once per process. SVG output
//! only names the family and needs no font data.

use crate::errors::{AppError, AppResult};
use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const FONT_FAMILY: &str = "sans-serif";

const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register a font on first use; later calls are no-ops
///
/// A configured font file must exist. Without one, well-known system
/// locations are tried and a missing font only fails once text is drawn.
pub fn ensure_registered(font_file: Option<&Path>) -> AppResult<()> {
    if REGISTERED.get().is_some() {
        return Ok(());
    }
    let registered = register_from(font_file)?;
    let _ = REGISTERED.set(registered);
    Ok(())
}

fn register_from(font_file: Option<&Path>) -> AppResult<Option<PathBuf>> {
    let candidates: Vec<PathBuf> = match font_file {
        Some(path) => vec![path.to_path_buf()],
        None => FALLBACK_FONTS.iter().map(PathBuf::from).collect(),
    };

    for candidate in candidates {
        match std::fs::read(&candidate) {
            Ok(data) => {
                let bytes: &'static [u8] = Box::leak(data.into_boxed_slice());
                for style in [
                    FontStyle::Normal,
                    FontStyle::Bold,
                    FontStyle::Italic,
                    FontStyle::Oblique,
                ] {
                    register_font(FONT_FAMILY, style, bytes).map_err(|_| {
                        AppError::Configuration(format!(
                            "not a usable font file: {}",
                            candidate.display()
                        ))
                    })?;
                }
                debug!("Registered plot font {}", candidate.display());
                return Ok(Some(candidate));
            }
            Err(e) if font_file.is_some() => {
                return Err(AppError::Configuration(format!(
                    "cannot read font file {}: {}",
                    candidate.display(),
                    e
                )));
            }
            Err(_) => continue,
        }
    }

    warn!("No font found; set output.font_file to render PNG plots");
    Ok(None)
}
