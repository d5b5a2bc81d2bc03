//! Machine profiles
//!
//! A [`MachineProfile`] bundles everything the pipeline needs to know about the
//! target plotter: canvas and bed bounds, pen heights, feed rates, flattening
//! heuristics and the kinematics variant with its geometric constants.
//!
//! Values derived from other fields (such as the pulley centre distance) are
//! computed on demand and never stored.

use crate::error::ProfileError;
use crate::kinematics::KinematicsModel;
use serde::{Deserialize, Serialize};

/// Proximity below which two segment endpoints continue the same stroke
pub const DEFAULT_LIFT_THRESHOLD: f64 = 30.0;
/// Parametric samples per cubic Bézier segment
pub const DEFAULT_CURVE_SAMPLES: usize = 10;
/// Y substituted when the inverse string-pulley triangle is infeasible
///
/// Historical value kept for compatibility; it carries no geometric meaning.
pub const DEFAULT_DEGENERATE_FALLBACK: f64 = 10.0;

/// Physical drawable area, in native machine units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BedLimits {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for BedLimits {
    fn default() -> Self {
        Self {
            min_x: 125.0,
            max_x: 280.0,
            min_y: 20.0,
            max_y: 280.0,
        }
    }
}

/// Cartesian gantry parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartesianParams {
    /// Offset from true zero introduced by the pen bracket
    pub head_x_offset: f64,
    /// X placement of the drawing on the bed
    pub offset_x: f64,
    /// Y placement of the drawing on the bed
    pub offset_y: f64,
}

impl Default for CartesianParams {
    fn default() -> Self {
        Self {
            head_x_offset: 50.0,
            offset_x: 75.0,
            offset_y: 20.0,
        }
    }
}

/// How string lengths are turned back into drawing-plane points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InverseModel {
    /// Law of cosines on the anchor positions used by the forward transform
    #[default]
    Anchored,
    /// Law of cosines against `distance_between_centers`, as older previews did
    CenterDistance,
}

/// Two-pulley suspended plotter parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringPulleyParams {
    /// X offset of the left pulley anchor
    pub left_offset: f64,
    /// X offset of the right pulley anchor
    pub right_offset: f64,
    pub pulley_diameter: f64,
    /// Vertical distance from the pulley axis down to the canvas origin
    pub droop: f64,
    pub inverse: InverseModel,
}

impl Default for StringPulleyParams {
    fn default() -> Self {
        Self {
            left_offset: -40.0,
            right_offset: 40.0,
            pulley_diameter: 45.0,
            droop: 60.0,
            inverse: InverseModel::default(),
        }
    }
}

/// Machine kinematics variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MachineKind {
    Cartesian(CartesianParams),
    StringPulley(StringPulleyParams),
}

impl Default for MachineKind {
    fn default() -> Self {
        Self::Cartesian(CartesianParams::default())
    }
}

impl std::fmt::Display for MachineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cartesian(_) => write!(f, "cartesian"),
            Self::StringPulley(_) => write!(f, "string-pulley"),
        }
    }
}

/// Path flattening heuristics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenSettings {
    /// Endpoint gap (per axis, source units) at which the pen is lifted
    pub lift_threshold: f64,
    /// Polyline points generated per cubic Bézier
    pub curve_samples: usize,
}

impl Default for FlattenSettings {
    fn default() -> Self {
        Self {
            lift_threshold: DEFAULT_LIFT_THRESHOLD,
            curve_samples: DEFAULT_CURVE_SAMPLES,
        }
    }
}

/// Complete description of a target plotter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineProfile {
    /// Drawing-plane width the input is fitted to
    pub canvas_width: f64,
    /// Drawing-plane height the input is fitted to
    pub canvas_height: f64,
    /// Z at which the pen touches the paper
    pub touch_height: f64,
    /// How far above `touch_height` a lifted pen sits
    pub raise_height: f64,
    /// Z the pen is parked at when the program ends
    pub park_height: f64,
    /// XY feed rate (units/min)
    pub feed_rate: f64,
    /// Feed rate used for the final park move
    pub park_feed_rate: f64,
    pub bed: BedLimits,
    pub kind: MachineKind,
    pub flatten: FlattenSettings,
    pub degenerate_fallback: f64,
    /// Whether previews mark pen lifts with numbered circles
    pub lift_markers: bool,
}

impl Default for MachineProfile {
    fn default() -> Self {
        Self {
            canvas_width: 300.0,
            canvas_height: 300.0,
            touch_height: 20.0,
            raise_height: 2.0,
            park_height: 75.0,
            feed_rate: 500.0,
            park_feed_rate: 7000.0,
            bed: BedLimits::default(),
            kind: MachineKind::default(),
            flatten: FlattenSettings::default(),
            degenerate_fallback: DEFAULT_DEGENERATE_FALLBACK,
            lift_markers: false,
        }
    }
}

impl MachineProfile {
    /// Default profile for a Cartesian gantry
    pub fn cartesian(params: CartesianParams) -> Self {
        Self {
            kind: MachineKind::Cartesian(params),
            ..Self::default()
        }
    }

    /// Default profile for a two-pulley string plotter
    pub fn string_pulley(params: StringPulleyParams) -> Self {
        Self {
            kind: MachineKind::StringPulley(params),
            ..Self::default()
        }
    }

    /// Shrink the canvas to the bed area a Cartesian shift can reach
    ///
    /// The default 300x300 canvas is the drawing plane of the stock
    /// machine and is wider than its bed once shifted, so full-canvas
    /// drawings are reported as overflowing. After this call a fitted
    /// drawing lands inside `bed`. Returns `false` and leaves the profile
    /// untouched for string-pulley machines, or when the shifted origin
    /// is not on the bed.
    pub fn fit_canvas_to_bed(&mut self) -> bool {
        let MachineKind::Cartesian(params) = &self.kind else {
            return false;
        };
        let origin_x = params.offset_x + params.head_x_offset;
        let origin_y = params.offset_y;
        if origin_x < self.bed.min_x || origin_y < self.bed.min_y {
            return false;
        }
        let width = self.bed.max_x - origin_x;
        let height = self.bed.max_y - origin_y;
        if width <= 0.0 || height <= 0.0 {
            return false;
        }
        self.canvas_width = width;
        self.canvas_height = height;
        true
    }

    /// Z height that marks a pen lift in the emitted program
    pub fn lift_height(&self) -> f64 {
        self.touch_height + self.raise_height
    }

    /// Distance between the two pulley centres
    ///
    /// Always derived from the current canvas width and pulley offsets.
    /// Cartesian profiles report the canvas width.
    pub fn distance_between_centers(&self) -> f64 {
        match &self.kind {
            MachineKind::StringPulley(p) => {
                p.left_offset.abs() + self.canvas_width + p.right_offset
            }
            MachineKind::Cartesian(_) => self.canvas_width,
        }
    }

    /// Kinematics model matching this profile
    pub fn kinematics(&self) -> KinematicsModel {
        KinematicsModel::from_profile(self)
    }

    /// Validate profile values
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(ProfileError::InvalidCanvas {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }

        let positive = [
            ("feed_rate", self.feed_rate),
            ("park_feed_rate", self.park_feed_rate),
            ("raise_height", self.raise_height),
            ("lift_threshold", self.flatten.lift_threshold),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ProfileError::OutOfRange {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.flatten.curve_samples == 0 {
            return Err(ProfileError::OutOfRange {
                field: "curve_samples".to_string(),
                value: 0.0,
            });
        }

        if self.bed.min_x > self.bed.max_x {
            return Err(ProfileError::InvertedBed {
                axis: "X".to_string(),
                min: self.bed.min_x,
                max: self.bed.max_x,
            });
        }
        if self.bed.min_y > self.bed.max_y {
            return Err(ProfileError::InvertedBed {
                axis: "Y".to_string(),
                min: self.bed.min_y,
                max: self.bed.max_y,
            });
        }

        if let MachineKind::StringPulley(p) = &self.kind {
            if p.pulley_diameter < 0.0 {
                return Err(ProfileError::OutOfRange {
                    field: "pulley_diameter".to_string(),
                    value: p.pulley_diameter,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::kinematics::Kinematics;

    #[test]
    fn test_default_profile_is_valid() {
        let profile = MachineProfile::default();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.lift_height(), 22.0);
        assert_eq!(profile.flatten.lift_threshold, 30.0);
        assert_eq!(profile.flatten.curve_samples, 10);
        assert_eq!(profile.degenerate_fallback, 10.0);
    }

    #[test]
    fn test_distance_between_centers_tracks_canvas() {
        let mut profile = MachineProfile::string_pulley(StringPulleyParams::default());
        assert_eq!(profile.distance_between_centers(), 40.0 + 300.0 + 40.0);

        profile.canvas_width = 500.0;
        assert_eq!(profile.distance_between_centers(), 580.0);

        if let MachineKind::StringPulley(p) = &mut profile.kind {
            p.right_offset = 10.0;
        }
        assert_eq!(profile.distance_between_centers(), 550.0);
    }

    #[test]
    fn test_fit_canvas_to_bed() {
        let mut profile = MachineProfile::default();
        assert!(profile.fit_canvas_to_bed());
        assert_eq!(profile.canvas_width, 155.0);
        assert_eq!(profile.canvas_height, 260.0);
        assert!(profile.validate().is_ok());

        // Canvas corners land on the bed corners
        let kinematics = profile.kinematics();
        let far = kinematics.to_native(Point::new(profile.canvas_width, profile.canvas_height));
        assert_eq!(far, (profile.bed.max_x, profile.bed.max_y));
        let near = kinematics.to_native(Point::new(0.0, 0.0));
        assert_eq!(near, (profile.bed.min_x, profile.bed.min_y));
    }

    #[test]
    fn test_fit_canvas_to_bed_refuses() {
        let mut profile = MachineProfile::string_pulley(StringPulleyParams::default());
        assert!(!profile.fit_canvas_to_bed());
        assert_eq!(profile.canvas_width, 300.0);

        let mut profile = MachineProfile::cartesian(CartesianParams {
            offset_x: 0.0,
            ..Default::default()
        });
        assert!(!profile.fit_canvas_to_bed());
        assert_eq!(profile.canvas_height, 300.0);
    }

    #[test]
    fn test_validation_failures() {
        let mut profile = MachineProfile::default();
        profile.canvas_width = 0.0;
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::InvalidCanvas { .. })
        ));

        let mut profile = MachineProfile::default();
        profile.flatten.curve_samples = 0;
        assert!(profile.validate().is_err());

        let mut profile = MachineProfile::default();
        profile.bed.min_y = 500.0;
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::InvertedBed { .. })
        ));
    }

    #[test]
    fn test_profile_serde_roundtrip() {
        let profile = MachineProfile::string_pulley(StringPulleyParams {
            inverse: InverseModel::CenterDistance,
            ..Default::default()
        });
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"type\":\"string_pulley\""));
        let back: MachineProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_partial_profile_uses_defaults() {
        let profile: MachineProfile =
            serde_json::from_str(r#"{"canvas_width": 200.0, "lift_markers": true}"#).unwrap();
        assert_eq!(profile.canvas_width, 200.0);
        assert!(profile.lift_markers);
        assert_eq!(profile.canvas_height, 300.0);
        assert_eq!(profile.kind, MachineKind::default());
    }
}
