//! Point-in-Polygon (PIP) hazard lookup.
//!
//! Holds the polygon layers in an R-tree per layer and resolves, for one
//! point, the covering or nearest polygon of every layer.

mod classifier;
pub mod geodesy;
mod index;
mod layer;
mod resolver;
mod service;

pub use classifier::{classify_layer, covers, LayerMatch};
pub use index::LayerIndex;
pub use layer::{Layer, LayerSource, LayerStore, StaticLayer};
pub use resolver::{resolve_nearest, NearestMatch, MIN_WINDOW};
pub use service::{Classification, HazardService};
