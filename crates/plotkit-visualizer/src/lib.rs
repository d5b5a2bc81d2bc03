//! # plotkit Visualizer
//!
//! Toolpath preview for plotkit. Parses emitted programs, replays them
//! through inverse kinematics and draws raster (PNG) and vector (SVG)
//! previews, flagging coordinates that leave the bed.

pub mod error;
pub mod parser;
pub mod renderer;
pub mod session;
pub mod surface;

pub use error::{RenderError, RenderResult};
pub use parser::{parse_line, remove_comments, ParsedLine, ZOperand};
pub use renderer::{OverflowFlags, RenderOptions, RenderReport, ToolpathRenderer, LIFT_MARKER_RADIUS};
pub use session::RenderSession;
pub use surface::{
    Color, DrawingSurface, PreviewSurface, RasterSurface, SvgSurface, PNG_PREVIEW_NAME,
    SVG_PREVIEW_NAME,
};
