#![forbid(unsafe_code)]
//! ishihara: Ishihara-style plate generation by randomized shape packing.
//!
//! Modules:
//! - shape: circles and regular polygons, candidate generation, mask probing, draw commands
//! - spatial: incremental 2-D k-d tree for nearest-neighbor queries over placed shapes
//! - color: palette table and on/off color selection
//! - mask: coverage sampling over RGBA images
//! - engine: batch-driven placement state machine, events and sinks
//!
//! For examples, see the `ishihara_examples` crate.
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod mask;
pub mod sampling;
pub mod shape;
pub mod spatial;

/// Convenient re-exports for common types. Import with `use ishihara::prelude::*;`.
pub mod prelude {
    pub use crate::color::{Color, ColorSelector, PaletteTable, StylePalettes};
    pub use crate::config::{CanvasSize, PackingConfig, ShapeKind};
    pub use crate::engine::events::{
        EventSink, FilterSink, FnSink, MultiSink, PackingEvent, PackingEventKind, VecSink,
    };
    pub use crate::engine::{
        EngineState, EngineStatus, FnScheduler, FrameScheduler, PackingEngine, RunOutcome,
        RunSummary, StopHandle, TickOutcome,
    };
    pub use crate::error::{Error, Result};
    pub use crate::mask::{CoverageSampler, ImageMask, Rgba};
    pub use crate::shape::{Circle, DrawCommand, DrawGeometry, Polygon, Shape, ShapeFactory};
    pub use crate::spatial::{Neighbor, SpatialIndex};
}
