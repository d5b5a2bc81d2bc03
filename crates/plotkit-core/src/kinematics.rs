//! Kinematics models
//!
//! Map drawing-plane points to the two native axes written into move commands,
//! and back again. For a Cartesian gantry the native axes are X/Y; for a
//! two-pulley string plotter they are the left and right string lengths.
//! The command format is the same text either way.

use crate::geometry::Point;
use crate::profile::{
    CartesianParams, InverseModel, MachineKind, MachineProfile, StringPulleyParams,
};
use tracing::debug;

/// Forward and inverse transform between the drawing plane and native axes
pub trait Kinematics {
    /// Native `(a, b)` axes for a drawing-plane point
    fn to_native(&self, point: Point) -> (f64, f64);

    /// Drawing-plane point for native `(a, b)` axes
    fn from_native(&self, a: f64, b: f64) -> Point;
}

/// Cartesian gantry: translation by the bed placement and head offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianKinematics {
    params: CartesianParams,
}

impl CartesianKinematics {
    pub fn new(params: CartesianParams) -> Self {
        Self { params }
    }

    fn shift_x(&self) -> f64 {
        self.params.offset_x + self.params.head_x_offset
    }
}

impl Kinematics for CartesianKinematics {
    fn to_native(&self, point: Point) -> (f64, f64) {
        (point.x + self.shift_x(), point.y + self.params.offset_y)
    }

    fn from_native(&self, a: f64, b: f64) -> Point {
        Point::new(a - self.shift_x(), b - self.params.offset_y)
    }
}

/// Two-pulley plotter: native axes are string lengths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StringPulleyKinematics {
    params: StringPulleyParams,
    distance_between_centers: f64,
    fallback: f64,
}

impl StringPulleyKinematics {
    /// Build from pulley parameters
    ///
    /// `distance_between_centers` is only consulted by
    /// [`InverseModel::CenterDistance`]; `fallback` replaces the recovered Y
    /// whenever the inverse triangle has no real solution.
    pub fn new(params: StringPulleyParams, distance_between_centers: f64, fallback: f64) -> Self {
        Self {
            params,
            distance_between_centers,
            fallback,
        }
    }

    /// X of the left string's anchor point in the drawing plane
    fn left_anchor_x(&self) -> f64 {
        -(self.params.left_offset + self.params.pulley_diameter / 2.0)
    }

    /// X of the right string's anchor point in the drawing plane
    fn right_anchor_x(&self) -> f64 {
        -(self.params.right_offset - self.params.pulley_diameter / 2.0)
    }

    /// Left and right string lengths for a drawing-plane point
    pub fn triangulate(&self, point: Point) -> (f64, f64) {
        let dy = point.y + self.params.droop;
        let left = dy.hypot(self.params.left_offset + self.params.pulley_diameter / 2.0 + point.x);
        let right =
            dy.hypot(self.params.right_offset - self.params.pulley_diameter / 2.0 + point.x);
        (left, right)
    }

    /// Solve the anchor triangle for a point
    fn untriangulate_anchored(&self, left: f64, right: f64) -> Point {
        let origin = self.left_anchor_x();
        let baseline = self.right_anchor_x() - origin;

        // Coincident anchors leave X undetermined; hang straight below.
        let along = if baseline.abs() > f64::EPSILON {
            (baseline * baseline + left * left - right * right) / (2.0 * baseline)
        } else {
            0.0
        };

        let radicand = left * left - along * along;
        let y = if radicand < 0.0 {
            debug!(
                "Infeasible string lengths L={:.3} R={:.3}, using fallback y={}",
                left, right, self.fallback
            );
            self.fallback
        } else {
            radicand.sqrt() - self.params.droop
        };

        Point::new(origin + along, y)
    }

    /// Older preview reconstruction against the pulley centre distance
    fn untriangulate_center_distance(&self, left: f64, right: f64) -> Point {
        let d = self.distance_between_centers;
        let x = if left > 0.0 {
            (d * d - right * right + left * left) / (2.0 * left)
        } else {
            0.0
        };

        let radicand = d * d - x * x;
        let y = if radicand < 0.0 {
            debug!(
                "Infeasible string lengths L={:.3} R={:.3} for D={:.3}, using fallback y={}",
                left, right, d, self.fallback
            );
            self.fallback
        } else {
            radicand.sqrt()
        };

        Point::new(x, y)
    }
}

impl Kinematics for StringPulleyKinematics {
    fn to_native(&self, point: Point) -> (f64, f64) {
        self.triangulate(point)
    }

    fn from_native(&self, a: f64, b: f64) -> Point {
        match self.params.inverse {
            InverseModel::Anchored => self.untriangulate_anchored(a, b),
            InverseModel::CenterDistance => self.untriangulate_center_distance(a, b),
        }
    }
}

/// Kinematics selected by a [`MachineProfile`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KinematicsModel {
    Cartesian(CartesianKinematics),
    StringPulley(StringPulleyKinematics),
}

impl KinematicsModel {
    pub fn from_profile(profile: &MachineProfile) -> Self {
        match profile.kind {
            MachineKind::Cartesian(params) => Self::Cartesian(CartesianKinematics::new(params)),
            MachineKind::StringPulley(params) => Self::StringPulley(StringPulleyKinematics::new(
                params,
                profile.distance_between_centers(),
                profile.degenerate_fallback,
            )),
        }
    }

    /// True when native axes are string lengths rather than X/Y
    pub fn is_string_pulley(&self) -> bool {
        matches!(self, Self::StringPulley(_))
    }
}

impl Kinematics for KinematicsModel {
    fn to_native(&self, point: Point) -> (f64, f64) {
        match self {
            Self::Cartesian(k) => k.to_native(point),
            Self::StringPulley(k) => k.to_native(point),
        }
    }

    fn from_native(&self, a: f64, b: f64) -> Point {
        match self {
            Self::Cartesian(k) => k.from_native(a, b),
            Self::StringPulley(k) => k.from_native(a, b),
        }
    }
}
