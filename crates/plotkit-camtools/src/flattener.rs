//! Path Flattener
//!
//! Walks vector paths segment by segment, decides where the pen has to be
//! lifted, and turns cubic Béziers into polylines. The motion format has no
//! curve primitive, so everything leaves here as straight moves.

use plotkit_core::{paths_bbox, FlattenSettings, PathSegment, Point, VectorPath};
use tracing::{debug, trace};

/// Shape a flattened segment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Line,
    Curve,
}

/// A segment reduced to a scaled polyline
#[derive(Debug, Clone, PartialEq)]
pub struct FlatSegment {
    pub kind: SegmentKind,
    /// Scaled start point
    pub start: Point,
    /// Scaled points after `start`, ending at the segment end
    pub points: Vec<Point>,
    /// Pen must rise and reposition before drawing this segment
    pub lift: bool,
}

impl FlatSegment {
    /// Last point of the polyline
    pub fn end(&self) -> Point {
        self.points.last().copied().unwrap_or(self.start)
    }
}

/// Evaluate a cubic Bézier at parameter `t`
///
/// Uses the power basis around `p0`, so a curve whose points all coincide
/// evaluates to exactly `p0` for every `t`.
pub fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let axis = |a: f64, b: f64, c: f64, d: f64| {
        let c1 = 3.0 * (b - a);
        let c2 = 3.0 * (c - 2.0 * b + a);
        let c3 = d - 3.0 * c + 3.0 * b - a;
        a + t * (c1 + t * (c2 + t * c3))
    };
    Point::new(
        axis(p0.x, p1.x, p2.x, p3.x),
        axis(p0.y, p1.y, p2.y, p3.y),
    )
}

/// Sample a cubic Bézier at `t = i / samples` for `i` in `1..=samples`
///
/// The start point is not included; the last sample is exactly `p3`.
pub fn sample_cubic(p0: Point, p1: Point, p2: Point, p3: Point, samples: usize) -> Vec<Point> {
    let samples = samples.max(1);
    (1..=samples)
        .map(|i| {
            if i == samples {
                p3
            } else {
                cubic_point(p0, p1, p2, p3, i as f64 / samples as f64)
            }
        })
        .collect()
}

/// Uniform scale that fits every path inside the canvas
///
/// Extents are measured from the origin to the far edge of the union of the
/// per-path bounding boxes. An axis with no positive extent does not
/// constrain the scale; with nothing to fit the scale is `1`.
pub fn fit_scale(paths: &[VectorPath], canvas_width: f64, canvas_height: f64) -> f64 {
    let bounds = paths_bbox(paths);
    if bounds.is_empty() {
        return 1.0;
    }

    let scale_x = (bounds.max_x > 0.0).then(|| canvas_width / bounds.max_x);
    let scale_y = (bounds.max_y > 0.0).then(|| canvas_height / bounds.max_y);

    let scale = match (scale_x, scale_y) {
        (Some(x), Some(y)) => x.min(y),
        (Some(s), None) | (None, Some(s)) => s,
        (None, None) => 1.0,
    };

    debug!(
        "Fit bounds x=[{:.2}, {:.2}] y=[{:.2}, {:.2}] -> scale {:.5}",
        bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y, scale
    );
    scale
}

/// Stateful flattener for one conversion run
///
/// The previous segment end is carried across paths, so a path starting close
/// to where the last one finished continues the same stroke.
#[derive(Debug, Clone)]
pub struct PathFlattener {
    settings: FlattenSettings,
    previous_end: Option<Point>,
}

impl PathFlattener {
    pub fn new(settings: FlattenSettings) -> Self {
        Self {
            settings,
            previous_end: None,
        }
    }

    /// True if a segment starting at `start` (source units) needs a pen lift
    ///
    /// Continuous only when both axis gaps are strictly below the threshold.
    pub fn needs_lift(&self, start: Point) -> bool {
        match self.previous_end {
            None => true,
            Some(prev) => {
                (start.x - prev.x).abs() >= self.settings.lift_threshold
                    || (start.y - prev.y).abs() >= self.settings.lift_threshold
            }
        }
    }

    /// Flatten a single segment, scaling its output by `scale`
    pub fn flatten_segment(&mut self, segment: &PathSegment, scale: f64) -> FlatSegment {
        let lift = self.needs_lift(segment.start());
        self.previous_end = Some(segment.end());

        match *segment {
            PathSegment::Line { start, end } => FlatSegment {
                kind: SegmentKind::Line,
                start: start.scaled(scale),
                points: vec![end.scaled(scale)],
                lift,
            },
            PathSegment::CubicBezier {
                start,
                control1,
                control2,
                end,
            } => {
                let points = sample_cubic(start, control1, control2, end, self.settings.curve_samples)
                    .into_iter()
                    .map(|p| p.scaled(scale))
                    .collect();
                FlatSegment {
                    kind: SegmentKind::Curve,
                    start: start.scaled(scale),
                    points,
                    lift,
                }
            }
        }
    }

    /// Flatten every segment of one path
    pub fn flatten_path(&mut self, path: &VectorPath, scale: f64) -> Vec<FlatSegment> {
        let flat: Vec<FlatSegment> = path
            .iter()
            .map(|segment| self.flatten_segment(segment, scale))
            .collect();
        trace!(
            "Flattened path: {} segments, {} lifts",
            flat.len(),
            flat.iter().filter(|s| s.lift).count()
        );
        flat
    }

    /// Flatten all paths in order
    pub fn flatten_all(&mut self, paths: &[VectorPath], scale: f64) -> Vec<FlatSegment> {
        paths
            .iter()
            .flat_map(|path| self.flatten_path(path, scale))
            .collect()
    }
}
