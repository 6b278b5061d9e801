//! Core data models for the classification engine.

pub mod point;
pub mod record;
pub mod result;

pub use point::GeoPoint;
pub use record::{FieldValue, PolygonRecord, RecordDefect, Unit};
pub use result::{ClassificationResult, DebugTrace, SelectionMethod};
