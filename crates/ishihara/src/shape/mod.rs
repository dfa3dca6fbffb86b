//! Shapes placed on the canvas and the factory that generates, tests, and draws them.
//!
//! The shape set is closed: [`Shape::Circle`] and [`Shape::Polygon`]. Every
//! per-variant operation is an exhaustive `match`, see [`factory::ShapeFactory`].
use glam::DVec2;

use crate::config::ShapeKind;

pub mod draw;
pub mod factory;
pub mod polygon;

pub use draw::{DrawCommand, DrawGeometry};
pub use factory::ShapeFactory;
pub use polygon::Polygon;

/// A disk given by its center and radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Strict overlap: circles that merely touch do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) < reach * reach
    }
}

/// A generated shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
}

impl Shape {
    /// Reference point used for spatial indexing.
    #[inline]
    pub fn anchor(&self) -> DVec2 {
        match self {
            Shape::Circle(c) => c.center,
            Shape::Polygon(p) => p.center,
        }
    }

    /// Radius for circles, circumscribing radius for polygons.
    pub fn effective_radius(&self) -> f64 {
        match self {
            Shape::Circle(c) => c.radius,
            Shape::Polygon(p) => p.circumradius(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Polygon(_) => ShapeKind::RegularPolygon,
        }
    }

    /// Moves the shape. Only valid before it is placed.
    pub fn translate(&mut self, offset: DVec2) {
        match self {
            Shape::Circle(c) => c.center += offset,
            Shape::Polygon(p) => p.center += offset,
        }
    }

    /// Circle for circles, circumscribing circle for polygons.
    pub fn bounding_circle(&self) -> Circle {
        Circle::new(self.anchor(), self.effective_radius())
    }
}
