//! # plotkit
//!
//! A pen plotter toolchain. Raster images are traced into vector paths,
//! flattened into pen strokes, emitted as G-code for either a Cartesian
//! gantry or a two-pulley string plotter, and replayed into PNG/SVG previews.
//!
//! ## Architecture
//!
//! plotkit is organized as a workspace with multiple crates:
//!
//! 1. **plotkit-core** - Geometry, machine profiles, kinematics
//! 2. **plotkit-settings** - Configuration files and validation
//! 3. **plotkit-camtools** - Tracing, SVG import, path flattening, G-code emission
//! 4. **plotkit-visualizer** - G-code replay and preview surfaces
//! 5. **plotkit** - Pipeline and the command line binary

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineReport, PREVIEW_PIXELS_PER_UNIT};

pub use plotkit_core::{
    BedLimits, BoundingBox, CartesianParams, FilterConfig, InverseModel, Kinematics,
    KinematicsModel, MachineKind, MachineProfile, PathSegment, Point, StringPulleyParams,
    VectorPath,
};

pub use plotkit_camtools::{
    load_svg_paths, parse_svg_paths, PathFlattener, PotraceVectorizer, Toolpath,
    ToolpathEmitter, ToolpathStats, Vectorizer,
};

pub use plotkit_visualizer::{
    DrawingSurface, PreviewSurface, RenderOptions, RenderReport, RenderSession, ToolpathRenderer,
};

pub use plotkit_settings::{default_config_path, Config, OutputSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Logs go to stderr so `--json` output on stdout stays machine readable.
/// `RUST_LOG` adds directives on top of the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
