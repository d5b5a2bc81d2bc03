//! Error handling for plotkit
//!
//! Errors raised while validating machine profiles. Crates further up the
//! pipeline wrap [`ProfileError`] in their own `thiserror` enums.

use thiserror::Error;

/// Machine profile error type
///
/// Raised when a profile cannot describe a drawable machine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// Canvas dimensions must be positive
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas {
        /// The configured canvas width.
        width: f64,
        /// The configured canvas height.
        height: f64,
    },

    /// A numeric field is outside its valid range
    #[error("Profile field '{field}' out of range: {value}")]
    OutOfRange {
        /// The field name.
        field: String,
        /// The offending value.
        value: f64,
    },

    /// Bed limits are inverted
    #[error("Bed limits inverted on {axis} axis: min {min} > max {max}")]
    InvertedBed {
        /// The axis name.
        axis: String,
        /// The configured minimum.
        min: f64,
        /// The configured maximum.
        max: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_error_display() {
        let err = ProfileError::OutOfRange {
            field: "feed_rate".to_string(),
            value: -1.0,
        };
        assert_eq!(err.to_string(), "Profile field 'feed_rate' out of range: -1");

        let err = ProfileError::InvertedBed {
            axis: "X".to_string(),
            min: 280.0,
            max: 125.0,
        };
        assert_eq!(
            err.to_string(),
            "Bed limits inverted on X axis: min 280 > max 125"
        );
    }
}
