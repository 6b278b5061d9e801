//! Serialized response shape for a single lookup.
//!
//! This is the only place values are rounded: kilometres to 3 decimals,
//! coordinates to 6.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{
    ClassificationResult, DebugTrace, FieldValue, GeoPoint, SelectionMethod, Unit,
};
use crate::pip::Classification;

const KM_DECIMALS: i32 = 3;
const DEGREE_DECIMALS: i32 = 6;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // Avoid serializing -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub input: QueryInput,
    pub values: BTreeMap<String, FieldResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Vec<DebugEntry>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryInput {
    pub lat: f64,
    pub lon: f64,
    pub nearest: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldResponse {
    pub value: FieldValue,
    pub unit: Unit,
    pub source: String,
    pub distance_km: f64,
}

impl From<&ClassificationResult> for FieldResponse {
    fn from(r: &ClassificationResult) -> Self {
        Self {
            value: r.value.clone(),
            unit: r.unit.clone(),
            source: r.source.clone(),
            distance_km: round_to(r.distance_km, KM_DECIMALS),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeoPoint> for LatLon {
    fn from(p: GeoPoint) -> Self {
        Self {
            lat: round_to(p.lat, DEGREE_DECIMALS),
            lon: round_to(p.lon, DEGREE_DECIMALS),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugEntry {
    pub field: String,
    pub picked_from: String,
    pub value: FieldValue,
    pub selection: SelectionMethod,
    pub inside_or_on_boundary: bool,
    pub distance_km: f64,
    pub polygon_centroid_latlon: Option<LatLon>,
    /// `[lat, lon]` pairs
    pub polygon_sample_latlon: Vec<[f64; 2]>,
}

impl From<&DebugTrace> for DebugEntry {
    fn from(t: &DebugTrace) -> Self {
        Self {
            field: t.field.clone(),
            picked_from: t.source.clone(),
            value: t.value.clone(),
            selection: t.selection,
            inside_or_on_boundary: t.inside_or_on_boundary,
            distance_km: round_to(t.distance_km, KM_DECIMALS),
            polygon_centroid_latlon: t.centroid.map(LatLon::from),
            polygon_sample_latlon: t
                .vertex_sample
                .iter()
                .map(|p| {
                    [
                        round_to(p.lat, DEGREE_DECIMALS),
                        round_to(p.lon, DEGREE_DECIMALS),
                    ]
                })
                .collect(),
        }
    }
}

impl Classification {
    pub fn to_response(&self) -> QueryResponse {
        QueryResponse {
            input: QueryInput {
                lat: self.point.lat,
                lon: self.point.lon,
                nearest: self.nearest_enabled,
            },
            values: self
                .values
                .iter()
                .map(|(field, r)| (field.clone(), FieldResponse::from(r)))
                .collect(),
            debug: self
                .debug
                .as_ref()
                .map(|traces| traces.iter().map(DebugEntry::from).collect()),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_response())
    }
}
