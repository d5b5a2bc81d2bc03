//! Bitmap tracing filter options
//!
//! Passed to the vectorizer when a raster image is turned into vector paths.

use serde::{Deserialize, Serialize};

/// Filter settings for the bitmap tracer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// High-pass filter radius; `0` disables the filter
    pub highpass: f64,
    /// Blur radius; `0` disables blurring
    pub blur: f64,
    /// Corner threshold handed to the tracer (speckle suppression)
    pub corner_threshold: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            highpass: 15.0,
            blur: 0.0,
            corner_threshold: 20.0,
        }
    }
}

impl FilterConfig {
    /// True if the high-pass stage should run
    pub fn highpass_enabled(&self) -> bool {
        self.highpass > 0.0
    }

    /// True if the blur stage should run
    pub fn blur_enabled(&self) -> bool {
        self.blur > 0.0
    }
}
