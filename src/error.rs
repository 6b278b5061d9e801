//! Error types for layer loading and classification.

use thiserror::Error;

/// Errors surfaced by the classification core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// Latitude or longitude outside the valid range.
    #[error("invalid point: lat={lat}, lon={lon} (expected lat in [-90, 90], lon in [-180, 180])")]
    InvalidPoint { lat: f64, lon: f64 },

    /// No layer loaded at all; the service must not start.
    #[error("no layers loaded")]
    EmptyLayerSet,
}
