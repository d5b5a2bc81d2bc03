//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for toolpath generation,
//! vector file import and the external bitmap tracer.

use plotkit_core::ProfileError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during CAM tool operations.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// The machine profile cannot be used for generation.
    #[error("Invalid machine profile: {0}")]
    Profile(#[from] ProfileError),

    /// An emitter operation was called out of order.
    #[error("Cannot {operation} while emitter is {state}")]
    InvalidState {
        /// The current emitter state.
        state: String,
        /// The attempted operation.
        operation: String,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Errors related to file format parsing and conversion.
#[derive(Error, Debug)]
pub enum FileFormatError {
    /// The SVG file could not be parsed.
    #[error("SVG parse error: {0}")]
    SvgParseError(String),

    /// The file is empty or contains no usable data.
    #[error("Empty file: {0}")]
    EmptyFile(String),

    /// I/O error during file reading.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Errors raised while turning a raster image into vector paths.
///
/// A tracer that ran successfully but found nothing to trace is not an
/// error; it yields an empty path set instead.
#[derive(Error, Debug)]
pub enum VectorizeError {
    /// The input image does not exist or is not a file.
    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    /// An external tool could not be started.
    #[error("Tool '{tool}' is unavailable: {source}")]
    ToolUnavailable {
        /// The executable name.
        tool: String,
        /// The spawn failure.
        #[source]
        source: io::Error,
    },

    /// An external tool exited unsuccessfully.
    #[error("Tool '{tool}' failed ({status}): {stderr}")]
    ToolFailed {
        /// The executable name.
        tool: String,
        /// Exit status description.
        status: String,
        /// Captured standard error output.
        stderr: String,
    },

    /// The traced output could not be read back.
    #[error("Trace output unreadable: {0}")]
    Output(#[from] FileFormatError),

    /// I/O error while preparing tracer files.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;

/// Result type alias for file format operations.
pub type FileFormatResult<T> = Result<T, FileFormatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cam_tool_error_display() {
        let err = CamToolError::InvalidState {
            state: "Idle".to_string(),
            operation: "emit segment".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot emit segment while emitter is Idle");
    }

    #[test]
    fn test_vectorize_error_display() {
        let err = VectorizeError::ImageNotFound(PathBuf::from("input/cat.jpg"));
        assert_eq!(err.to_string(), "Image not found: input/cat.jpg");

        let err = VectorizeError::ToolFailed {
            tool: "potrace".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "bad header".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Tool 'potrace' failed (exit status: 1): bad header"
        );
    }

    #[test]
    fn test_error_conversion() {
        let fmt_err = FileFormatError::EmptyFile("trace.svg".to_string());
        let vec_err: VectorizeError = fmt_err.into();
        assert!(matches!(vec_err, VectorizeError::Output(_)));

        let err: CamToolError = ProfileError::InvalidCanvas {
            width: 0.0,
            height: 0.0,
        }
        .into();
        assert!(matches!(err, CamToolError::Profile(_)));

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let vec_err: VectorizeError = io_err.into();
        assert!(matches!(vec_err, VectorizeError::IoError(_)));
    }
}
