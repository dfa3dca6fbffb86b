//! Draw commands emitted for accepted shapes.
use glam::DVec2;

use crate::color::Color;
use crate::shape::polygon::even_odd_contains;

/// Geometry of one filled path.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawGeometry {
    Circle { center: DVec2, radius: f64 },
    Polygon { points: Vec<DVec2> },
}

impl DrawGeometry {
    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (DVec2, DVec2) {
        match self {
            DrawGeometry::Circle { center, radius } => {
                (*center - DVec2::splat(*radius), *center + DVec2::splat(*radius))
            }
            DrawGeometry::Polygon { points } => points.iter().fold(
                (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
                |(lo, hi), p| (lo.min(*p), hi.max(*p)),
            ),
        }
    }

    /// Whether `p` falls inside the filled path (even-odd rule for polygons).
    pub fn contains(&self, p: DVec2) -> bool {
        match self {
            DrawGeometry::Circle { center, radius } => {
                center.distance_squared(p) <= radius * radius
            }
            DrawGeometry::Polygon { points } => {
                let edges = points
                    .iter()
                    .zip(points.iter().cycle().skip(1))
                    .map(|(a, b)| (*a, *b));
                even_odd_contains(edges, p)
            }
        }
    }
}

/// A filled path and its color.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub geometry: DrawGeometry,
    pub color: Color,
}

impl DrawCommand {
    pub fn new(geometry: DrawGeometry, color: Color) -> Self {
        Self { geometry, color }
    }
}
