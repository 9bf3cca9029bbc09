//! Path geometry shared by the compiler stages.
//!
//! Source documents are reduced to [`DrawablePath`]s: contiguous runs of
//! analytic primitives (lines, quadratic and cubic Béziers). Curves stay
//! analytic until densification so they can be sampled at fixed wall-space
//! intervals after fitting.

use lyon::geom::{Box2D, CubicBezierSegment, LineSegment, Point, QuadraticBezierSegment, Transform};

/// A point in wall space (mm, origin upper-left, Y down).
///
/// Source-space points use the same representation.
pub type WallPoint = Point<f64>;

/// One analytic primitive of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(LineSegment<f64>),
    Quadratic(QuadraticBezierSegment<f64>),
    Cubic(CubicBezierSegment<f64>),
}

impl Segment {
    pub fn from(&self) -> WallPoint {
        match self {
            Self::Line(s) => s.from,
            Self::Quadratic(s) => s.from,
            Self::Cubic(s) => s.from,
        }
    }

    pub fn to(&self) -> WallPoint {
        match self {
            Self::Line(s) => s.to,
            Self::Quadratic(s) => s.to,
            Self::Cubic(s) => s.to,
        }
    }

    /// Tight axis-aligned bounds of the primitive.
    pub fn bounding_box(&self) -> Box2D<f64> {
        match self {
            Self::Line(s) => Box2D::new(s.from.min(s.to), s.from.max(s.to)),
            Self::Quadratic(s) => s.bounding_box(),
            Self::Cubic(s) => s.bounding_box(),
        }
    }

    /// Apply an affine transform. Béziers stay exact under affine maps.
    pub fn transformed(&self, transform: &Transform<f64>) -> Self {
        match self {
            Self::Line(s) => Self::Line(LineSegment {
                from: transform.transform_point(s.from),
                to: transform.transform_point(s.to),
            }),
            Self::Quadratic(s) => Self::Quadratic(s.transformed(transform)),
            Self::Cubic(s) => Self::Cubic(s.transformed(transform)),
        }
    }

    /// Visit a polyline approximation of the primitive, excluding its start
    /// point. Lines report only their end point.
    pub fn for_each_flattened<F: FnMut(WallPoint)>(&self, tolerance: f64, callback: &mut F) {
        match self {
            Self::Line(s) => callback(s.to),
            Self::Quadratic(s) => s.for_each_flattened(tolerance, &mut |line: &LineSegment<f64>| {
                callback(line.to)
            }),
            Self::Cubic(s) => s.for_each_flattened(tolerance, &mut |line: &LineSegment<f64>| {
                callback(line.to)
            }),
        }
    }
}

/// A contiguous stroke extracted from the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawablePath {
    /// Primitives in drawing order; each starts where the previous one ends.
    pub segments: Vec<Segment>,
    /// Stroke color token as written in the document (or the default stroke).
    pub stroke: String,
    /// Element the path came from, for diagnostics (e.g. `path#outline`).
    pub origin: String,
}

impl DrawablePath {
    pub fn new(
        segments: Vec<Segment>,
        stroke: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            segments,
            stroke: stroke.into(),
            origin: origin.into(),
        }
    }

    /// First point of the stroke, if it has any geometry.
    pub fn start(&self) -> Option<WallPoint> {
        self.segments.first().map(Segment::from)
    }

    pub fn end(&self) -> Option<WallPoint> {
        self.segments.last().map(Segment::to)
    }

    pub fn bounding_box(&self) -> Option<Box2D<f64>> {
        self.segments
            .iter()
            .map(Segment::bounding_box)
            .reduce(merge_boxes)
    }

    pub fn transformed(&self, transform: &Transform<f64>) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|s| s.transformed(transform))
                .collect(),
            stroke: self.stroke.clone(),
            origin: self.origin.clone(),
        }
    }
}

/// Bounding box of a whole set of paths, `None` when there is no geometry.
pub fn bounds_of(paths: &[DrawablePath]) -> Option<Box2D<f64>> {
    paths
        .iter()
        .filter_map(DrawablePath::bounding_box)
        .reduce(merge_boxes)
}

/// Union of two boxes that keeps zero-height or zero-width boxes, which a
/// single straight stroke produces.
pub fn merge_boxes(a: Box2D<f64>, b: Box2D<f64>) -> Box2D<f64> {
    Box2D::new(a.min.min(b.min), a.max.max(b.max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon::geom::point;

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::Line(LineSegment {
            from: point(x0, y0),
            to: point(x1, y1),
        })
    }

    #[test]
    fn test_line_bounds_handle_reversed_endpoints() {
        let b = line(10.0, 5.0, -2.0, 1.0).bounding_box();
        assert_eq!(b.min, point(-2.0, 1.0));
        assert_eq!(b.max, point(10.0, 5.0));
    }

    #[test]
    fn test_cubic_bounds_include_extrema() {
        let seg = Segment::Cubic(CubicBezierSegment {
            from: point(0.0, 0.0),
            ctrl1: point(0.0, 10.0),
            ctrl2: point(10.0, 10.0),
            to: point(10.0, 0.0),
        });
        let b = seg.bounding_box();
        // Peak of this symmetric curve is at t = 0.5: y = 7.5
        assert!((b.max.y - 7.5).abs() < 1e-9);
        assert!(b.min.y.abs() < 1e-9);
    }

    #[test]
    fn test_bounds_of_multiple_paths() {
        let paths = vec![
            DrawablePath::new(vec![line(0.0, 0.0, 1.0, 1.0)], "#000000", "line"),
            DrawablePath::new(vec![line(5.0, -3.0, 6.0, 2.0)], "#000000", "line"),
        ];
        let b = bounds_of(&paths).unwrap();
        assert_eq!(b.min, point(0.0, -3.0));
        assert_eq!(b.max, point(6.0, 2.0));
        assert!(bounds_of(&[]).is_none());
    }

    #[test]
    fn test_flat_boxes_survive_merging() {
        let paths = vec![
            DrawablePath::new(vec![line(0.0, 0.0, 100.0, 0.0)], "#000000", "line"),
            DrawablePath::new(vec![line(50.0, 20.0, 50.0, 40.0)], "#000000", "line"),
        ];
        let b = bounds_of(&paths).unwrap();
        assert_eq!(b.min, point(0.0, 0.0));
        assert_eq!(b.max, point(100.0, 40.0));
    }

    #[test]
    fn test_transformed_path_keeps_metadata() {
        let path = DrawablePath::new(vec![line(1.0, 2.0, 3.0, 4.0)], "red", "path#a");
        let t = Transform::scale(2.0, 2.0).then_translate(lyon::geom::vector(10.0, 0.0));
        let moved = path.transformed(&t);
        assert_eq!(moved.start(), Some(point(12.0, 4.0)));
        assert_eq!(moved.end(), Some(point(16.0, 8.0)));
        assert_eq!(moved.stroke, "red");
        assert_eq!(moved.origin, "path#a");
    }

    #[test]
    fn test_flattening_ends_on_curve_end() {
        let seg = Segment::Quadratic(QuadraticBezierSegment {
            from: point(0.0, 0.0),
            ctrl: point(5.0, 10.0),
            to: point(10.0, 0.0),
        });
        let mut pts = Vec::new();
        seg.for_each_flattened(0.01, &mut |p| pts.push(p));
        assert!(pts.len() > 2);
        let last = *pts.last().unwrap();
        assert!((last - point(10.0, 0.0)).length() < 1e-9);
    }
}
