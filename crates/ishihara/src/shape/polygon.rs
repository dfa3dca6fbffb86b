//! Convex and simple polygons with a movable center and fixed local vertices.
use std::f64::consts::TAU;

use glam::DVec2;

/// A polygon stored as vertex offsets from its center.
///
/// `local_vertices` are fixed at creation with the rotation already applied;
/// `rotation` records the angle that was used.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub center: DVec2,
    pub local_vertices: Vec<DVec2>,
    pub rotation: f64,
}

impl Polygon {
    pub fn new(center: DVec2, local_vertices: Vec<DVec2>, rotation: f64) -> Self {
        Self {
            center,
            local_vertices,
            rotation,
        }
    }

    /// Regular polygon with `sides` vertices at distance `radius`, rotated by `rotation` radians.
    pub fn regular(center: DVec2, radius: f64, sides: u32, rotation: f64) -> Self {
        let local_vertices = (0..sides)
            .map(|i| {
                let theta = TAU * (i as f64 / sides as f64);
                rotate(DVec2::new(theta.cos(), theta.sin()) * radius, rotation)
            })
            .collect();
        Self::new(center, local_vertices, rotation)
    }

    pub fn len(&self) -> usize {
        self.local_vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local_vertices.is_empty()
    }

    /// Vertices in canvas coordinates.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = DVec2> + Clone + '_ {
        self.local_vertices.iter().map(move |v| self.center + *v)
    }

    /// Edges in canvas coordinates, closing back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.local_vertices.len();
        (0..n).map(move |i| {
            (
                self.center + self.local_vertices[i],
                self.center + self.local_vertices[(i + 1) % n],
            )
        })
    }

    /// Largest vertex distance from the center.
    pub fn circumradius(&self) -> f64 {
        self.local_vertices
            .iter()
            .map(|v| v.length())
            .fold(0.0, f64::max)
    }

    /// Even-odd point containment.
    pub fn contains_point(&self, p: DVec2) -> bool {
        even_odd_contains(self.edges(), p)
    }

    /// True if any pair of edges crosses or either center lies inside the other polygon.
    pub fn intersects(&self, other: &Polygon) -> bool {
        let reach = self.circumradius() + other.circumradius();
        if self.center.distance_squared(other.center) >= reach * reach {
            return false;
        }

        for (a1, a2) in self.edges() {
            for (b1, b2) in other.edges() {
                if segments_intersect(a1, a2, b1, b2) {
                    return true;
                }
            }
        }

        other.contains_point(self.center) || self.contains_point(other.center)
    }
}

/// Even-odd rule over a closed ring given as its edges.
pub(crate) fn even_odd_contains(
    edges: impl IntoIterator<Item = (DVec2, DVec2)>,
    p: DVec2,
) -> bool {
    let mut inside = false;
    for (a, b) in edges {
        if (a.y > p.y) != (b.y > p.y) {
            let t = (p.y - a.y) / (b.y - a.y);
            if p.x < a.x + t * (b.x - a.x) {
                inside = !inside;
            }
        }
    }
    inside
}

#[inline]
fn rotate(v: DVec2, angle: f64) -> DVec2 {
    let (s, c) = angle.sin_cos();
    DVec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

#[inline]
fn orientation(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

#[inline]
fn on_segment(a: DVec2, b: DVec2, p: DVec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed segment intersection, collinear overlaps included.
pub(crate) fn segments_intersect(p1: DVec2, p2: DVec2, q1: DVec2, q2: DVec2) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}
