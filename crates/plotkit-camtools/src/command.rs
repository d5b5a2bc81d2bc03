//! Machine command model
//!
//! The emitted program is a flat, forward-only list of [`MachineCommand`]s.
//! It is written out as one G-code line per command and is the only thing the
//! preview renderer ever sees, so every value that affects rendering is
//! serialized with a fixed precision.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places used for every coordinate and height
pub const COORDINATE_PRECISION: usize = 3;

/// One command of a toolpath program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MachineCommand {
    /// Absolute move in native machine coordinates
    Move { a: f64, b: f64 },
    /// Raise the pen to the lift height
    PenUp { z: f64 },
    /// Lower the pen to the touch height
    PenDown { z: f64 },
    /// Preamble/postamble line passed through verbatim
    Raw(String),
    /// Informational comment
    Comment(String),
}

impl MachineCommand {
    pub fn raw(line: impl Into<String>) -> Self {
        Self::Raw(line.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move { .. })
    }
}

impl fmt::Display for MachineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const P: usize = COORDINATE_PRECISION;
        match self {
            Self::Move { a, b } => write!(f, "G1 X{:.*} Y{:.*}", P, a, P, b),
            Self::PenUp { z } | Self::PenDown { z } => write!(f, "G1 Z{:.*}", P, z),
            Self::Raw(line) => f.write_str(line),
            Self::Comment(text) => write!(f, "; {}", text),
        }
    }
}

/// Format a height exactly as it appears in a `Z` operand
pub fn format_height(z: f64) -> String {
    format!("{:.*}", COORDINATE_PRECISION, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_formatting() {
        let cmd = MachineCommand::Move { a: 1.0, b: -2.34567 };
        assert_eq!(cmd.to_string(), "G1 X1.000 Y-2.346");
        assert!(cmd.is_move());
    }

    #[test]
    fn test_pen_formatting() {
        assert_eq!(MachineCommand::PenUp { z: 22.0 }.to_string(), "G1 Z22.000");
        assert_eq!(MachineCommand::PenDown { z: 20.0 }.to_string(), "G1 Z20.000");
        assert_eq!(format_height(22.0), "22.000");
    }

    #[test]
    fn test_raw_and_comment() {
        assert_eq!(MachineCommand::raw("M84 ; Motors off").to_string(), "M84 ; Motors off");
        assert_eq!(
            MachineCommand::comment("continue stroke").to_string(),
            "; continue stroke"
        );
    }
}
