//! Fitting source geometry onto the wall.
//!
//! A single uniform scale maps the source bounding box so that its larger
//! dimension becomes `fit_fraction × span`, and a translation centers it on
//! the wall's working square `[0, span] × [0, span]`.

use lyon::geom::{point, Box2D, Transform, Vector};
use tracing::{debug, warn};
use wallkit_core::{bounds_of, DrawablePath, WallPoint};

/// Source extents below this are treated as degenerate and not scaled.
pub const MIN_SOURCE_EXTENT: f64 = 1e-9;

/// Uniform scale followed by a translation, source space to wall space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub scale: f64,
    pub offset: Vector<f64>,
}

impl FitTransform {
    pub fn apply(&self, p: WallPoint) -> WallPoint {
        point(p.x * self.scale + self.offset.x, p.y * self.scale + self.offset.y)
    }

    /// The same mapping as a lyon transform, for transforming segments.
    pub fn to_transform(&self) -> Transform<f64> {
        Transform::scale(self.scale, self.scale).then_translate(self.offset)
    }
}

/// Result of fitting a document onto the wall.
#[derive(Debug, Clone, PartialEq)]
pub struct FitLayout {
    pub transform: FitTransform,
    /// Bounding box of the source geometry.
    pub source_bounds: Box2D<f64>,
    /// The source bounding box after fitting.
    pub wall_bounds: Box2D<f64>,
}

impl FitLayout {
    /// Fitted bounding-box corners: top-left, top-right, bottom-right,
    /// bottom-left.
    pub fn corners(&self) -> [WallPoint; 4] {
        let b = &self.wall_bounds;
        [
            b.min,
            point(b.max.x, b.min.y),
            b.max,
            point(b.min.x, b.max.y),
        ]
    }

    /// Map paths into wall space.
    pub fn apply(&self, paths: &[DrawablePath]) -> Vec<DrawablePath> {
        let transform = self.transform.to_transform();
        paths.iter().map(|p| p.transformed(&transform)).collect()
    }
}

/// Computes the fit of a document for a given wall.
#[derive(Debug, Clone, Copy)]
pub struct GeometryFitter {
    span: f64,
    fraction: f64,
}

impl GeometryFitter {
    pub fn new(span: f64, fraction: f64) -> Self {
        Self { span, fraction }
    }

    /// Fit the paths, or `None` when they contain no finite geometry.
    pub fn fit(&self, paths: &[DrawablePath]) -> Option<FitLayout> {
        let source_bounds = bounds_of(paths)?;
        let (min, max) = (source_bounds.min, source_bounds.max);
        if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
            warn!("Drawing has non-finite coordinates; nothing to place");
            return None;
        }

        // Halved so that extents near f64::MAX stay finite.
        let half_width = max.x / 2.0 - min.x / 2.0;
        let half_height = max.y / 2.0 - min.y / 2.0;
        let half_extent = half_width.max(half_height);
        let half = self.span / 2.0;

        let scale = if half_extent < MIN_SOURCE_EXTENT / 2.0 {
            warn!(
                "Drawing has no extent ({:.3e} x {:.3e}); placing it unscaled",
                2.0 * half_width,
                2.0 * half_height
            );
            1.0
        } else {
            self.fraction * half / half_extent
        };

        let center = point(min.x / 2.0 + max.x / 2.0, min.y / 2.0 + max.y / 2.0);
        let offset = Vector::new(half - center.x * scale, half - center.y * scale);
        let transform = FitTransform { scale, offset };

        let wall_bounds = Box2D::new(
            transform.apply(source_bounds.min),
            transform.apply(source_bounds.max),
        );
        debug!(
            "Fit scale {:.6}, wall bounds ({:.3}, {:.3})-({:.3}, {:.3})",
            scale, wall_bounds.min.x, wall_bounds.min.y, wall_bounds.max.x, wall_bounds.max.y
        );

        Some(FitLayout {
            transform,
            source_bounds,
            wall_bounds,
        })
    }
}
