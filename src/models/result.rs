//! Per-layer classification output.

use serde::{Deserialize, Serialize};

use super::{FieldValue, GeoPoint, Unit};

/// How the polygon for a field was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    /// The point is inside the polygon or on its boundary
    Covers,
    /// Nearest polygon, certified before the whole layer was examined
    NearestOfCandidates,
    /// Nearest polygon after examining every record of the layer
    NearestOfLayer,
}

impl SelectionMethod {
    pub fn is_nearest(&self) -> bool {
        !matches!(self, SelectionMethod::Covers)
    }
}

/// Result for one (point, layer) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub value: FieldValue,
    pub unit: Unit,
    pub source: String,
    /// 0 when covered, otherwise great-circle km to the nearest boundary point (unrounded)
    pub distance_km: f64,
    pub selection: SelectionMethod,
    /// Position of the chosen record within its layer
    pub record_index: usize,
}

/// Diagnostic details about the polygon chosen for a field.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugTrace {
    pub field: String,
    pub selection: SelectionMethod,
    pub inside_or_on_boundary: bool,
    pub distance_km: f64,
    pub centroid: Option<GeoPoint>,
    /// First few exterior vertices, in ring order
    pub vertex_sample: Vec<GeoPoint>,
    pub source: String,
    pub value: FieldValue,
}
