//! Read-only coverage masks sampled to classify shapes.
//!
//! - Implement [`CoverageSampler`] for procedural masks.
//! - Use [`ImageMask`] for an RGBA8 pixel snapshot.
//!
//! Coordinates are canvas pixels. A probe outside the mask returns `None`, which
//! callers treat as "no coverage".

/// Threshold below which weighted luminance counts as covered.
pub const DARK_THRESHOLD: f64 = 127.0;

/// One RGBA8 texel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channel sum scaled by opacity: `(r + g + b) * (a / 255)`.
    #[inline]
    pub fn weighted_luminance(&self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) * (self.a as f64 / 255.0)
    }

    /// Whether this texel counts as foreground coverage.
    #[inline]
    pub fn is_dark(&self) -> bool {
        self.weighted_luminance() < DARK_THRESHOLD
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Trait for masks sampled at integer pixel positions.
pub trait CoverageSampler: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Texel at `(x, y)`, or `None` when out of bounds.
    fn coverage_at(&self, x: i64, y: i64) -> Option<Rgba>;

    /// Whether the pixel containing the continuous point `(x, y)` is covered.
    ///
    /// Out-of-bounds points are never covered.
    #[inline]
    fn is_covered(&self, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        self.coverage_at(x.floor() as i64, y.floor() as i64)
            .is_some_and(|texel| texel.is_dark())
    }
}

/// Immutable RGBA8 snapshot of a mask, row-major, 4 bytes per pixel.
#[derive(Clone, Debug)]
pub struct ImageMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageMask {
    /// Wraps an RGBA8 buffer. `data.len()` must equal `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> crate::error::Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(crate::error::Error::InvalidMask(format!(
                "expected {expected} bytes for {width}x{height} RGBA8, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A mask with every texel set to `texel`.
    pub fn filled(width: u32, height: u32, texel: Rgba) -> Self {
        let len = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(len * 4);
        for _ in 0..len {
            data.extend_from_slice(&[texel.r, texel.g, texel.b, texel.a]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// An all-white mask: nothing is covered.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::WHITE)
    }

    /// Builds a mask by evaluating `f` at every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for y in 0..height {
            for x in 0..width {
                let t = f(x, y);
                data.extend_from_slice(&[t.r, t.g, t.b, t.a]);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }
}

impl CoverageSampler for ImageMask {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn coverage_at(&self, x: i64, y: i64) -> Option<Rgba> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some(Rgba::new(px[0], px[1], px[2], px[3]))
    }
}
