//! # plotkit CAM Tools
//!
//! Toolpath generation for pen plotters: vector paths in, G-code out.
//!
//! ## Stages
//!
//! - **Vectorizer**: traces raster images with external tools and imports the SVG result
//! - **Path Flattener**: fits paths to the canvas, samples curves and decides pen lifts
//! - **Toolpath Emitter**: runs the preamble / segments / postamble state machine
//!   through the machine's forward kinematics
//! - **Machine commands**: the serialized command model shared with the previewer

pub mod command;
pub mod emitter;
pub mod error;
pub mod flattener;
pub mod svg_import;
pub mod vectorizer;

pub use command::{format_height, MachineCommand, COORDINATE_PRECISION};
pub use emitter::{EmitterState, Toolpath, ToolpathEmitter, ToolpathStats};
pub use error::{CamToolError, CamToolResult, FileFormatError, FileFormatResult, VectorizeError};
pub use flattener::{cubic_point, fit_scale, sample_cubic, FlatSegment, PathFlattener, SegmentKind};
pub use svg_import::{load_svg_paths, parse_svg_paths};
pub use vectorizer::{PotraceVectorizer, TraceTools, Vectorizer, TRACE_OUTPUT_NAME};
