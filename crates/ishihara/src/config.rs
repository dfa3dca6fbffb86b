//! Run configuration for the packing engine.
//!
//! A [`PackingConfig`] is validated once when a run starts and is immutable for the
//! run's duration. [`CanvasSize`] carries the target surface dimensions.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fraction of the smaller canvas dimension used as the radius of the circular area.
pub const CIRCULAR_AREA_FRACTION: f64 = 0.48;

/// Default number of consecutive rejected attempts after which a run is exhausted.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 10_000;

/// Default attempts per scheduling tick.
pub const DEFAULT_BATCH_SIZE: u32 = 100;

pub const MIN_POLYGON_SIDES: u32 = 3;
pub const MAX_POLYGON_SIDES: u32 = 12;

/// Shape variant produced by a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeKind {
    #[default]
    Circle,
    RegularPolygon,
}

/// Pixel dimensions of the canvas being filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns an error if either dimension is zero.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidCanvas {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn min_dimension(&self) -> f64 {
        self.width.min(self.height) as f64
    }

    /// Radius of the disk shapes are confined to when `circular_area` is set.
    pub fn circular_area_radius(&self) -> f64 {
        self.min_dimension() * CIRCULAR_AREA_FRACTION
    }
}

/// Configuration snapshot for one generation run.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackingConfig {
    /// Smallest shape radius, in canvas pixels.
    pub min_radius: f64,
    /// Largest shape radius, in canvas pixels.
    pub max_radius: f64,
    /// Which shape variant to generate.
    pub shape_kind: ShapeKind,
    /// Polygon side count, only meaningful for [`ShapeKind::RegularPolygon`].
    pub sides: u32,
    /// Confine shapes to a centered disk instead of the full rectangle.
    pub circular_area: bool,
    /// Swap the on/off palettes.
    pub invert_colors: bool,
    /// Visual inset applied when drawing, in [0, 1].
    pub draw_ratio: f64,
    /// Index into the palette table.
    pub style: usize,
    /// Attempts per scheduling tick.
    pub batch_size: u32,
    /// Consecutive rejections that end the run.
    pub failure_threshold: u32,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            min_radius: 3.0,
            max_radius: 12.0,
            shape_kind: ShapeKind::Circle,
            sides: 4,
            circular_area: true,
            invert_colors: false,
            draw_ratio: 1.0,
            style: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

impl PackingConfig {
    /// Creates a configuration with the given radius range and defaults elsewhere.
    pub fn new(min_radius: f64, max_radius: f64) -> Self {
        Self {
            min_radius,
            max_radius,
            ..Default::default()
        }
    }

    /// Defaults scaled to a canvas: radii of `(w + h) / 600` and `(w + h) / 150`.
    pub fn for_canvas(canvas: CanvasSize) -> Self {
        let span = canvas.width as f64 + canvas.height as f64;
        Self::new(span / 600.0, span / 150.0)
    }

    pub fn with_radius_range(mut self, min_radius: f64, max_radius: f64) -> Self {
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self
    }

    pub fn with_shape_kind(mut self, shape_kind: ShapeKind) -> Self {
        self.shape_kind = shape_kind;
        self
    }

    /// Switches to regular polygons with the given side count.
    pub fn with_polygon(mut self, sides: u32) -> Self {
        self.shape_kind = ShapeKind::RegularPolygon;
        self.sides = sides;
        self
    }

    pub fn with_circular_area(mut self, circular_area: bool) -> Self {
        self.circular_area = circular_area;
        self
    }

    pub fn with_invert_colors(mut self, invert_colors: bool) -> Self {
        self.invert_colors = invert_colors;
        self
    }

    pub fn with_draw_ratio(mut self, draw_ratio: f64) -> Self {
        self.draw_ratio = draw_ratio;
        self
    }

    pub fn with_style(mut self, style: usize) -> Self {
        self.style = style;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_failure_threshold(mut self, failure_threshold: u32) -> Self {
        self.failure_threshold = failure_threshold;
        self
    }

    /// Validates the configuration on its own, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.min_radius.is_finite() || !self.max_radius.is_finite() {
            return Err(Error::InvalidConfig("radii must be finite".into()));
        }
        if self.min_radius <= 0.0 {
            return Err(Error::InvalidConfig("min_radius must be > 0".into()));
        }
        if self.min_radius > self.max_radius {
            return Err(Error::InvalidConfig(format!(
                "min_radius ({}) must be <= max_radius ({})",
                self.min_radius, self.max_radius
            )));
        }
        if self.shape_kind == ShapeKind::RegularPolygon
            && !(MIN_POLYGON_SIDES..=MAX_POLYGON_SIDES).contains(&self.sides)
        {
            return Err(Error::InvalidConfig(format!(
                "sides must be in [{MIN_POLYGON_SIDES}, {MAX_POLYGON_SIDES}] for regular polygons, got {}",
                self.sides
            )));
        }
        if !(0.0..=1.0).contains(&self.draw_ratio) {
            return Err(Error::InvalidConfig(format!(
                "draw_ratio must be in [0, 1], got {}",
                self.draw_ratio
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".into()));
        }
        if self.failure_threshold == 0 {
            return Err(Error::InvalidConfig("failure_threshold must be > 0".into()));
        }
        Ok(())
    }

    /// Validates the configuration against the canvas it will fill.
    ///
    /// Shapes must fit the sampling region: inside the centered disk in circular
    /// mode, inside the rectangle otherwise.
    pub fn validate_for_canvas(&self, canvas: CanvasSize) -> Result<()> {
        self.validate()?;
        canvas.validate()?;
        if self.circular_area {
            let area = canvas.circular_area_radius();
            if self.max_radius > area {
                return Err(Error::InvalidConfig(format!(
                    "max_radius ({}) exceeds the circular area radius ({area})",
                    self.max_radius
                )));
            }
        } else if self.max_radius * 2.0 > canvas.min_dimension() {
            return Err(Error::InvalidConfig(format!(
                "shapes of max_radius {} do not fit a {}x{} canvas",
                self.max_radius, canvas.width, canvas.height
            )));
        }
        Ok(())
    }

    /// Number of nearest neighbors tested per candidate.
    ///
    /// Grows with the radius ratio since one large neighbor can reach a candidate
    /// past many closer small ones. This bounds the work per attempt but is not a
    /// completeness proof: extreme ratios can still admit an overlap with a shape
    /// outside the checked set.
    pub fn check_nearest(&self) -> usize {
        let hi = self.min_radius.max(self.max_radius);
        let lo = self.min_radius.min(self.max_radius);
        (hi / lo * 2.0).ceil() as usize
    }
}
