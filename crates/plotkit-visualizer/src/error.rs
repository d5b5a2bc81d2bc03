//! Error types for the preview renderer.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while rendering a toolpath preview.
///
/// Out-of-bed coordinates are diagnostics, not errors; they are reported in
/// the render report instead.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The command stream could not be opened.
    #[error("Cannot open toolpath {}: {source}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// Reading the stream or writing a preview failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The raster preview cannot be allocated at this size.
    #[error("Cannot allocate a {width}x{height} raster preview")]
    SurfaceSize {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The raster preview could not be encoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
