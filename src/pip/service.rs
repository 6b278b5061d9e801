//! Hazard lookup service: classifies one point against every layer.

use std::collections::BTreeMap;

use geo::Centroid;
use rayon::prelude::*;
use tracing::debug;

use super::classifier::{classify_layer, LayerMatch};
use super::layer::{Layer, LayerStore};
use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::models::{ClassificationResult, DebugTrace, GeoPoint};

/// Output of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub point: GeoPoint,
    pub nearest_enabled: bool,
    /// Field name -> result; fields without a result are absent
    pub values: BTreeMap<String, ClassificationResult>,
    /// Per-layer traces in layer order, when requested
    pub debug: Option<Vec<DebugTrace>>,
}

/// Multi-layer lookup service
pub struct HazardService {
    store: LayerStore,
    config: ClassifierConfig,
}

impl HazardService {
    /// Create a new service from a loaded layer store
    pub fn new(store: LayerStore, config: ClassifierConfig) -> Self {
        Self { store, config }
    }

    /// Validate `(lat, lon)` and classify it against every layer.
    ///
    /// With `nearest_enabled` off, only layers whose polygons cover the point
    /// appear in the result.
    pub fn classify(
        &self,
        lat: f64,
        lon: f64,
        nearest_enabled: bool,
        debug_enabled: bool,
    ) -> Result<Classification, ClassifyError> {
        let point = GeoPoint::validated(lat, lon)?;
        Ok(self.classify_point(point, nearest_enabled, debug_enabled))
    }

    /// Classify an already validated point.
    pub fn classify_point(
        &self,
        point: GeoPoint,
        nearest_enabled: bool,
        debug_enabled: bool,
    ) -> Classification {
        let mut values = BTreeMap::new();
        let mut traces = Vec::new();

        for layer in self.store.layers() {
            let Some(m) =
                classify_layer(layer, point, nearest_enabled, self.config.initial_window)
            else {
                continue;
            };

            let record = layer.record(m.record_index);
            values.insert(
                layer.field.clone(),
                ClassificationResult {
                    value: record.value.clone(),
                    unit: record.unit.clone(),
                    source: record.source.clone(),
                    distance_km: m.distance_km,
                    selection: m.selection,
                    record_index: m.record_index,
                },
            );

            if debug_enabled {
                traces.push(self.trace(layer, &m));
            }
        }

        debug!(
            "Lookup at ({}, {}): {} of {} layers matched",
            point.lat,
            point.lon,
            values.len(),
            self.store.len()
        );

        Classification {
            point,
            nearest_enabled,
            values,
            debug: debug_enabled.then_some(traces),
        }
    }

    /// Classify many points in parallel. Results keep input order.
    pub fn classify_batch(
        &self,
        points: &[(f64, f64)],
        nearest_enabled: bool,
        debug_enabled: bool,
    ) -> Vec<Result<Classification, ClassifyError>> {
        points
            .par_iter()
            .map(|&(lat, lon)| self.classify(lat, lon, nearest_enabled, debug_enabled))
            .collect()
    }

    fn trace(&self, layer: &Layer, m: &LayerMatch) -> DebugTrace {
        let record = layer.record(m.record_index);
        let centroid = record.geometry.centroid().map(|c| GeoPoint {
            lat: c.y(),
            lon: c.x(),
        });
        let vertex_sample = record
            .geometry
            .exterior()
            .coords()
            .take(self.config.vertex_sample)
            .map(|c| GeoPoint { lat: c.y, lon: c.x })
            .collect();

        DebugTrace {
            field: layer.field.clone(),
            selection: m.selection,
            inside_or_on_boundary: m.inside_or_on_boundary,
            distance_km: m.distance_km,
            centroid,
            vertex_sample,
            source: record.source.clone(),
            value: record.value.clone(),
        }
    }
}
