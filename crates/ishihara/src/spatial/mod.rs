//! Spatial indexing of placed shapes.
//!
//! [`SpatialIndex`] answers bounded k-nearest queries over shape anchors so each
//! placement attempt is tested against a handful of neighbors instead of every
//! shape placed so far.
pub mod kdtree;

pub use kdtree::{Neighbor, SpatialIndex};
