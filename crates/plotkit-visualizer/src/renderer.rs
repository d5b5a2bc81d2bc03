//! Toolpath Renderer
//!
//! Replays an emitted toolpath in a single forward pass and draws it back in
//! drawing-plane coordinates through the profile's inverse kinematics. Pen
//! lifts are recognized by the lift-height sentinel the emitter writes, and
//! the native coordinate range is checked against the bed limits.

use crate::error::{RenderError, RenderResult};
use crate::parser::{parse_line, ParsedLine};
use crate::session::RenderSession;
use crate::surface::{DrawingSurface, BLACK, BLUE, RED};
use plotkit_core::{BedLimits, BoundingBox, Kinematics, KinematicsModel, MachineProfile, Point};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Radius of the circle marking a pen lift, in drawing units
pub const LIFT_MARKER_RADIUS: f64 = 0.5;
/// Decimal places used when matching the lift-height sentinel
const SENTINEL_PRECISION: usize = 3;

/// Optional diagnostics drawn around the toolpath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Outline the bed limits before the pass
    pub draw_bed: bool,
    /// Outline the realized coordinate range after the pass
    pub draw_bounds: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            draw_bed: true,
            draw_bounds: true,
        }
    }
}

/// Native coordinate range checks against the bed limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowFlags {
    pub x_overflow: bool,
    pub y_overflow: bool,
    pub x_underflow: bool,
    pub y_underflow: bool,
}

impl OverflowFlags {
    /// Compare `bounds` with `bed`; an axis that was never seen is not flagged
    pub fn check(bounds: &BoundingBox, bed: &BedLimits) -> Self {
        let has_x = bounds.min_x <= bounds.max_x;
        let has_y = bounds.min_y <= bounds.max_y;
        Self {
            x_overflow: has_x && bounds.max_x > bed.max_x,
            y_overflow: has_y && bounds.max_y > bed.max_y,
            x_underflow: has_x && bounds.min_x < bed.min_x,
            y_underflow: has_y && bounds.min_y < bed.min_y,
        }
    }

    pub fn any(&self) -> bool {
        self.x_overflow || self.y_overflow || self.x_underflow || self.y_underflow
    }
}

/// Outcome of one render pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderReport {
    /// Range of native coordinates seen
    pub bounds: BoundingBox,
    pub overflow: OverflowFlags,
    /// Line segments drawn
    pub strokes: usize,
    /// Lift sentinels encountered
    pub lifts: usize,
    /// Lines read from the stream
    pub lines: usize,
}

/// Replays toolpath programs onto a [`DrawingSurface`]
#[derive(Debug, Clone)]
pub struct ToolpathRenderer {
    bed: BedLimits,
    kinematics: KinematicsModel,
    lift_sentinel: String,
    options: RenderOptions,
}

impl ToolpathRenderer {
    pub fn new(profile: &MachineProfile) -> Self {
        Self {
            bed: profile.bed,
            kinematics: profile.kinematics(),
            lift_sentinel: format!("{:.*}", SENTINEL_PRECISION, profile.lift_height()),
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// True if `z` is the lift height as the emitter writes it
    pub fn is_lift(&self, z: f64) -> bool {
        format!("{:.*}", SENTINEL_PRECISION, z) == self.lift_sentinel
    }

    fn to_plane(&self, (a, b): (f64, f64)) -> Point {
        self.kinematics.from_native(a, b)
    }

    /// Draw the closed outline of a native-coordinate rectangle
    fn outline(&self, surface: &mut dyn DrawingSurface, min: (f64, f64), max: (f64, f64)) {
        let corners = [
            (min.0, min.1),
            (max.0, min.1),
            (max.0, max.1),
            (min.0, max.1),
        ]
        .map(|c| self.to_plane(c));
        for i in 0..corners.len() {
            surface.draw_line(corners[i], corners[(i + 1) % corners.len()]);
        }
    }

    /// Render a toolpath read from `reader`
    ///
    /// The surface is not cleared first. A read failure aborts the pass.
    pub fn render<R: BufRead>(
        &self,
        reader: R,
        surface: &mut dyn DrawingSurface,
        session: &mut RenderSession,
    ) -> RenderResult<RenderReport> {
        if self.options.draw_bed {
            surface.set_color(RED);
            self.outline(
                surface,
                (self.bed.min_x, self.bed.min_y),
                (self.bed.max_x, self.bed.max_y),
            );
        }
        surface.set_color(BLACK);

        let mut bounds = BoundingBox::new();
        let mut x: Option<f64> = None;
        let mut y: Option<f64> = None;
        let mut strokes = 0;
        let mut lifts = 0;
        let mut lines = 0;

        for line in reader.lines() {
            let line = line?;
            lines += 1;

            let ParsedLine::Move {
                x: new_x,
                y: new_y,
                z,
            } = parse_line(&line)
            else {
                continue;
            };

            let previous = x.zip(y);

            if let Some(value) = new_x {
                bounds.include_x(value);
                x = Some(value);
            }
            if let Some(value) = new_y {
                bounds.include_y(value);
                y = Some(value);
            }

            if z.as_ref().is_some_and(|z| self.is_lift(z.value)) {
                lifts += 1;
                if let (true, Some(prev)) = (session.lift_markers, previous) {
                    let at = self.to_plane(prev);
                    let label = session.next_label();
                    surface.draw_circle(at, LIFT_MARKER_RADIUS);
                    surface.draw_label(at, &label.to_string());
                }
                x = None;
                y = None;
                continue;
            }

            if let (Some(prev), Some(current)) = (previous, x.zip(y)) {
                if prev != current {
                    surface.draw_line(self.to_plane(prev), self.to_plane(current));
                    strokes += 1;
                }
            }
        }

        let overflow = OverflowFlags::check(&bounds, &self.bed);
        if bounds.is_empty() {
            debug!("Toolpath contained no complete coordinates");
        } else {
            info!(
                "Native range X [{:.3}, {:.3}] Y [{:.3}, {:.3}]",
                bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y
            );
            if self.options.draw_bounds {
                surface.set_color(BLUE);
                self.outline(
                    surface,
                    (bounds.min_x, bounds.min_y),
                    (bounds.max_x, bounds.max_y),
                );
                surface.set_color(BLACK);
            }
        }

        if overflow.x_overflow {
            warn!("X overflow: {:.3} > {:.3}", bounds.max_x, self.bed.max_x);
        }
        if overflow.y_overflow {
            warn!("Y overflow: {:.3} > {:.3}", bounds.max_y, self.bed.max_y);
        }
        if overflow.x_underflow {
            warn!("X underflow: {:.3} < {:.3}", bounds.min_x, self.bed.min_x);
        }
        if overflow.y_underflow {
            warn!("Y underflow: {:.3} < {:.3}", bounds.min_y, self.bed.min_y);
        }

        debug!(
            "Rendered {} lines: {} strokes, {} lifts",
            lines, strokes, lifts
        );
        Ok(RenderReport {
            bounds,
            overflow,
            strokes,
            lifts,
            lines,
        })
    }

    /// Render the toolpath stored at `path`
    pub fn render_file(
        &self,
        path: &Path,
        surface: &mut dyn DrawingSurface,
        session: &mut RenderSession,
    ) -> RenderResult<RenderReport> {
        let file = File::open(path).map_err(|source| RenderError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Rendering {}", path.display());
        self.render(BufReader::new(file), surface, session)
    }
}
