//! Candidate generation, collision, classification, and drawing for each shape variant.
//!
//! [`ShapeFactory`] captures the parts of a [`PackingConfig`] and [`CanvasSize`]
//! that shape generation needs. Classification ([`ShapeFactory::overlaps_image`])
//! probes a small fixed set of points instead of integrating coverage over the
//! shape's area; shapes whose dark region falls between probes can be misclassified.
use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;

use crate::color::Color;
use crate::config::{CanvasSize, PackingConfig, ShapeKind};
use crate::mask::CoverageSampler;
use crate::sampling::{rand01, rand_range};
use crate::shape::{Circle, DrawCommand, DrawGeometry, Polygon, Shape};

/// Diagonal probe offset, as a fraction of the radius, applied on each axis.
pub const CIRCLE_DIAGONAL_PROBE: f64 = 0.93;

/// Generates shapes of one variant within a canvas.
#[derive(Clone, Debug)]
pub struct ShapeFactory {
    kind: ShapeKind,
    min_radius: f64,
    max_radius: f64,
    sides: u32,
    circular_area: bool,
    canvas: CanvasSize,
}

impl ShapeFactory {
    /// Captures generation parameters. `config` is expected to be validated
    /// against `canvas`.
    pub fn new(config: &PackingConfig, canvas: CanvasSize) -> Self {
        debug_assert!(config.validate_for_canvas(canvas).is_ok());
        Self {
            kind: config.shape_kind,
            min_radius: config.min_radius,
            max_radius: config.max_radius,
            sides: config.sides,
            circular_area: config.circular_area,
            canvas,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn canvas_center(&self) -> DVec2 {
        DVec2::new(
            self.canvas.width as f64 * 0.5,
            self.canvas.height as f64 * 0.5,
        )
    }

    /// Draws a random candidate shape.
    ///
    /// The radius is uniform in `[min_radius, max_radius]`. In circular mode the
    /// anchor lies at a uniform angle and a uniform distance in
    /// `[0, circular_area_radius - radius]` from the canvas center; otherwise
    /// each coordinate is uniform in `[radius, dimension - radius]`. Polygons
    /// get a uniform rotation in `[0, 2π)`.
    pub fn generate(&self, rng: &mut dyn Rng) -> Shape {
        let radius = rand_range(rng, self.min_radius, self.max_radius);
        let center = self.sample_anchor(radius, rng);

        match self.kind {
            ShapeKind::Circle => Shape::Circle(Circle::new(center, radius)),
            ShapeKind::RegularPolygon => {
                let rotation = rand01(rng) * TAU;
                Shape::Polygon(Polygon::regular(center, radius, self.sides, rotation))
            }
        }
    }

    fn sample_anchor(&self, radius: f64, rng: &mut dyn Rng) -> DVec2 {
        if self.circular_area {
            let angle = rand01(rng) * TAU;
            let distance = rand01(rng) * (self.canvas.circular_area_radius() - radius);
            let (sin, cos) = angle.sin_cos();
            self.canvas_center() + DVec2::new(cos, sin) * distance
        } else {
            let w = self.canvas.width as f64;
            let h = self.canvas.height as f64;
            DVec2::new(
                radius + rand01(rng) * (w - radius * 2.0),
                radius + rand01(rng) * (h - radius * 2.0),
            )
        }
    }

    /// Whether any probe point of `shape` lands on a dark mask pixel.
    ///
    /// Circles probe the center, the four axis points at `r`, and four diagonal
    /// points offset by `0.93 r` on both axes. Polygons probe every vertex and
    /// the center. Pure in `(mask, shape)`.
    pub fn overlaps_image(mask: &dyn CoverageSampler, shape: &Shape) -> bool {
        match shape {
            Shape::Circle(c) => circle_probes(c)
                .into_iter()
                .any(|p| mask.is_covered(p.x, p.y)),
            Shape::Polygon(p) => p
                .vertices()
                .chain(std::iter::once(p.center))
                .any(|v| mask.is_covered(v.x, v.y)),
        }
    }

    /// Collision test between two shapes.
    ///
    /// Circle pairs use strict center distance, polygon pairs use edge crossing
    /// and center containment. A mixed pair compares the circle against the
    /// polygon's circumscribing circle.
    pub fn intersects(a: &Shape, b: &Shape) -> bool {
        match (a, b) {
            (Shape::Circle(a), Shape::Circle(b)) => a.intersects(b),
            (Shape::Polygon(a), Shape::Polygon(b)) => a.intersects(b),
            _ => a.bounding_circle().intersects(&b.bounding_circle()),
        }
    }

    /// Draw command for `shape` scaled by `draw_ratio` about its anchor.
    pub fn draw(shape: &Shape, draw_ratio: f64, color: Color) -> DrawCommand {
        let geometry = match shape {
            Shape::Circle(c) => DrawGeometry::Circle {
                center: c.center,
                radius: c.radius * draw_ratio,
            },
            Shape::Polygon(p) => DrawGeometry::Polygon {
                points: p
                    .local_vertices
                    .iter()
                    .map(|v| p.center + *v * draw_ratio)
                    .collect(),
            },
        };
        DrawCommand::new(geometry, color)
    }
}

fn circle_probes(c: &Circle) -> [DVec2; 9] {
    let DVec2 { x, y } = c.center;
    let r = c.radius;
    let d = r * CIRCLE_DIAGONAL_PROBE;
    [
        DVec2::new(x, y),
        DVec2::new(x, y - r),
        DVec2::new(x, y + r),
        DVec2::new(x - r, y),
        DVec2::new(x + r, y),
        DVec2::new(x - d, y + d),
        DVec2::new(x - d, y - d),
        DVec2::new(x + d, y + d),
        DVec2::new(x + d, y - d),
    ]
}
