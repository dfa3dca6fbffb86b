use std::path::Path;

use anyhow::Context;
use glam::DVec2;
use image::imageops::FilterType;
use image::{Rgba as ImageRgba, RgbaImage};
use ishihara::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber honoring `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Event sink that fills every placed shape into an RGBA raster.
///
/// Pixels are sampled at their centers; no antialiasing.
pub struct RasterSink {
    image: RgbaImage,
}

impl RasterSink {
    pub fn new(canvas: CanvasSize, background: Color) -> Self {
        let [r, g, b] = background.to_array();
        Self {
            image: RgbaImage::from_pixel(canvas.width, canvas.height, ImageRgba([r, g, b, 255])),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn fill(&mut self, command: &DrawCommand) {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return;
        }
        let (lo, hi) = command.geometry.bounds();
        let x0 = lo.x.floor().max(0.0) as u32;
        let y0 = lo.y.floor().max(0.0) as u32;
        let x1 = (hi.x.ceil().max(0.0) as u32).min(w - 1);
        let y1 = (hi.y.ceil().max(0.0) as u32).min(h - 1);

        let [r, g, b] = command.color.to_array();
        let pixel = ImageRgba([r, g, b, 255]);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                if command.geometry.contains(center) {
                    self.image.put_pixel(x, y, pixel);
                }
            }
        }
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        self.image
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}.", path.display());
        Ok(())
    }
}

impl EventSink for RasterSink {
    fn send(&mut self, event: PackingEvent) {
        if let PackingEvent::ShapePlaced { command, .. } = event {
            self.fill(&command);
        }
    }

    fn wants(&self, kind: PackingEventKind) -> bool {
        kind == PackingEventKind::ShapePlaced
    }
}

/// Loads a PNG as a coverage mask and returns it with the matching canvas.
///
/// With `fit`, the image is scaled to the largest size inside `fit` that keeps
/// its aspect ratio.
pub fn load_png_mask(
    path: impl AsRef<Path>,
    fit: Option<(u32, u32)>,
) -> anyhow::Result<(ImageMask, CanvasSize)> {
    let path = path.as_ref();
    let mut img = image::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .to_rgba8();

    if let Some((max_w, max_h)) = fit {
        let (w, h) = img.dimensions();
        let ratio = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
        let nw = ((w as f64 * ratio) as u32).max(1);
        let nh = ((h as f64 * ratio) as u32).max(1);
        if (nw, nh) != (w, h) {
            img = image::imageops::resize(&img, nw, nh, FilterType::Triangle);
        }
    }

    let (w, h) = img.dimensions();
    let mask = ImageMask::from_rgba8(w, h, img.into_raw())?;
    Ok((mask, CanvasSize::new(w, h)))
}

/// Black annulus centered on the canvas, white elsewhere.
pub fn ring_mask(canvas: CanvasSize, inner: f64, outer: f64) -> ImageMask {
    let center = DVec2::new(canvas.width as f64, canvas.height as f64) * 0.5;
    ImageMask::from_fn(canvas.width, canvas.height, |x, y| {
        let d = DVec2::new(x as f64 + 0.5, y as f64 + 0.5).distance(center);
        if (inner..=outer).contains(&d) {
            Rgba::BLACK
        } else {
            Rgba::WHITE
        }
    })
}
