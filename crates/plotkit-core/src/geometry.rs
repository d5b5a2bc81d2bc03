//! Drawing-plane geometry
//!
//! Points, running bounding boxes and the vector paths handed over by the
//! vectorizer. Every coordinate is in logical canvas units, before any
//! machine-specific transform.

use lyon::geom::{point, CubicBezierSegment};
use serde::{Deserialize, Serialize};

/// A point in the drawing plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Multiply both coordinates by `factor`
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Euclidean distance to another point
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Running axis-aligned bounding box
///
/// Starts empty; `include` only ever widens it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox {
    pub fn new() -> Self {
        Self {
            min_x: f64::MAX,
            max_x: f64::MIN,
            min_y: f64::MAX,
            max_y: f64::MIN,
        }
    }

    /// Box covering exactly one point
    pub fn from_point(point: Point) -> Self {
        let mut bounds = Self::new();
        bounds.include(point);
        bounds
    }

    pub fn include(&mut self, point: Point) {
        self.include_x(point.x);
        self.include_y(point.y);
    }

    pub fn include_x(&mut self, x: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
    }

    pub fn include_y(&mut self, y: f64) {
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Widen this box to cover `other`
    pub fn union(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.include(Point::new(other.min_x, other.min_y));
        self.include(Point::new(other.max_x, other.max_y));
    }

    /// True until at least one point has been included on both axes
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    /// True if `other` lies entirely inside this box
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.is_empty()
            || (self.min_x <= other.min_x
                && self.max_x >= other.max_x
                && self.min_y <= other.min_y
                && self.max_y >= other.max_y)
    }
}

/// One segment of a vector path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathSegment {
    Line {
        start: Point,
        end: Point,
    },
    CubicBezier {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
}

impl PathSegment {
    pub fn start(&self) -> Point {
        match self {
            Self::Line { start, .. } | Self::CubicBezier { start, .. } => *start,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Self::Line { end, .. } | Self::CubicBezier { end, .. } => *end,
        }
    }

    /// Tight bounding box of the segment
    ///
    /// Curves are measured by their extrema, not their control points.
    pub fn bbox(&self) -> BoundingBox {
        let mut bounds = BoundingBox::new();
        match self {
            Self::Line { start, end } => {
                bounds.include(*start);
                bounds.include(*end);
            }
            Self::CubicBezier {
                start,
                control1,
                control2,
                end,
            } => {
                let curve = CubicBezierSegment {
                    from: point(start.x, start.y),
                    ctrl1: point(control1.x, control1.y),
                    ctrl2: point(control2.x, control2.y),
                    to: point(end.x, end.y),
                };
                let extent = curve.bounding_box();
                bounds.include(Point::new(extent.min.x, extent.min.y));
                bounds.include(Point::new(extent.max.x, extent.max.y));
            }
        }
        bounds
    }
}

/// An ordered sequence of path segments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorPath {
    pub segments: Vec<PathSegment>,
}

impl VectorPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathSegment> {
        self.segments.iter()
    }

    /// Axis-aligned bounding box of the whole path
    pub fn bbox(&self) -> BoundingBox {
        let mut bounds = BoundingBox::new();
        for segment in &self.segments {
            bounds.union(&segment.bbox());
        }
        bounds
    }
}

impl<'a> IntoIterator for &'a VectorPath {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Union of the bounding boxes of every path
pub fn paths_bbox(paths: &[VectorPath]) -> BoundingBox {
    let mut bounds = BoundingBox::new();
    for path in paths {
        bounds.union(&path.bbox());
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bbox() {
        let bounds = BoundingBox::new();
        assert!(bounds.is_empty());
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.height(), 0.0);
    }

    #[test]
    fn test_bbox_include_and_union() {
        let mut a = BoundingBox::from_point(Point::new(10.0, 20.0));
        a.include(Point::new(-5.0, 40.0));
        assert_eq!(a.min_x, -5.0);
        assert_eq!(a.max_x, 10.0);
        assert_eq!(a.min_y, 20.0);
        assert_eq!(a.max_y, 40.0);

        let mut b = BoundingBox::from_point(Point::new(100.0, 0.0));
        b.union(&a);
        assert_eq!(b.min_x, -5.0);
        assert_eq!(b.max_x, 100.0);
        assert_eq!(b.min_y, 0.0);
        assert_eq!(b.max_y, 40.0);

        let before = b;
        b.union(&BoundingBox::new());
        assert_eq!(b, before);
    }

    #[test]
    fn test_curve_bbox_follows_curve() {
        let segment = PathSegment::CubicBezier {
            start: Point::new(0.0, 0.0),
            control1: Point::new(0.0, 50.0),
            control2: Point::new(80.0, 50.0),
            end: Point::new(80.0, 0.0),
        };
        let bounds = segment.bbox();
        // Peak at t = 0.5 is 3/4 of the control height
        assert!((bounds.max_y - 37.5).abs() < 1e-9);
        assert!((bounds.max_x - 80.0).abs() < 1e-9);
        assert!(bounds.min_x.abs() < 1e-9);
        assert!(bounds.min_y.abs() < 1e-9);
    }

    #[test]
    fn test_curve_bbox_reaches_past_endpoints() {
        // S-curve whose x overshoots both endpoints
        let segment = PathSegment::CubicBezier {
            start: Point::new(0.0, 0.0),
            control1: Point::new(-30.0, 10.0),
            control2: Point::new(130.0, 20.0),
            end: Point::new(100.0, 30.0),
        };
        let bounds = segment.bbox();
        assert!(bounds.min_x < 0.0 && bounds.min_x > -30.0);
        assert!(bounds.max_x > 100.0 && bounds.max_x < 130.0);
        assert_eq!(bounds.max_y, 30.0);
    }

    #[test]
    fn test_paths_bbox() {
        let paths = vec![
            VectorPath::new(vec![PathSegment::Line {
                start: Point::new(0.0, 0.0),
                end: Point::new(10.0, 10.0),
            }]),
            VectorPath::new(vec![PathSegment::Line {
                start: Point::new(50.0, 5.0),
                end: Point::new(60.0, 90.0),
            }]),
        ];
        let bounds = paths_bbox(&paths);
        assert_eq!(bounds.max_x, 60.0);
        assert_eq!(bounds.max_y, 90.0);
        assert_eq!(bounds.min_x, 0.0);
    }
}
