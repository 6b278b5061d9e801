//! Hazardpip - multi-layer hazard classification for geographic points
//!
//! Given preloaded polygon layers (seismic parameters, wind zones,
//! inspection areas), finds each layer's covering or nearest polygon for a
//! point and reports its value, unit, source and distance.

pub mod config;
pub mod error;
pub mod models;
pub mod pip;
pub mod response;

pub use config::{ClassifierConfig, Config};
pub use error::ClassifyError;
pub use models::{
    ClassificationResult, DebugTrace, FieldValue, GeoPoint, PolygonRecord, SelectionMethod, Unit,
};
pub use pip::{Classification, HazardService, LayerSource, LayerStore, StaticLayer};
