//! Polygon records and the values they carry.

use std::sync::OnceLock;

use geo_types::{Coord, LineString, Polygon};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value attached to a polygon: numeric for hazard parameters, text for zone names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Parse a raw attribute string the way boundary files write them.
    ///
    /// The first numeric token wins (`"0.45 g"` -> `0.45`); otherwise the
    /// trimmed text is kept. Blank input yields `None`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        static NUMBER: OnceLock<Regex> = OnceLock::new();
        let number = NUMBER
            .get_or_init(|| Regex::new(r"[-+]?\d*\.?\d+").expect("static number pattern"));

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        number
            .find(trimmed)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(FieldValue::Number)
            .or_else(|| Some(FieldValue::Text(trimmed.to_string())))
    }
}

/// Unit of a field value. Textual values use the `"string"` unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    Physical(String),
    Text,
}

impl Unit {
    /// Default unit for the hazard fields the service knows about.
    pub fn for_field(field: &str) -> Option<Self> {
        match field {
            "pga" | "ss" | "s1" | "cr1" | "crs" => Some(Unit::Physical("g".to_string())),
            "tl" => Some(Unit::Physical("s".to_string())),
            "v" => Some(Unit::Physical("m/s".to_string())),
            "inspection_area" => Some(Unit::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Unit::Physical(s) => s,
            Unit::Text => "string",
        }
    }
}

impl From<String> for Unit {
    fn from(s: String) -> Self {
        if s == "string" {
            Unit::Text
        } else {
            Unit::Physical(s)
        }
    }
}

impl From<&str> for Unit {
    fn from(s: &str) -> Self {
        Unit::from(s.to_string())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.as_str().to_string()
    }
}

/// Reason a record is unusable for classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordDefect {
    #[error("exterior ring has {0} distinct vertices (need at least 3)")]
    Degenerate(usize),
    #[error("vertex ({lat}, {lon}) is outside the valid coordinate range")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// A single boundary polygon with its value.
///
/// Geometry is stored x = lon, y = lat.
#[derive(Debug, Clone)]
pub struct PolygonRecord {
    pub geometry: Polygon<f64>,
    pub value: FieldValue,
    pub unit: Unit,
    /// Originating layer file / feed
    pub source: String,
}

impl PolygonRecord {
    pub fn new(
        geometry: Polygon<f64>,
        value: FieldValue,
        unit: Unit,
        source: impl Into<String>,
    ) -> Self {
        Self {
            geometry,
            value,
            unit,
            source: source.into(),
        }
    }

    /// Build a record from `(lat, lon)` rings. Rings are closed automatically.
    pub fn from_lat_lon_rings(
        exterior: &[(f64, f64)],
        holes: &[Vec<(f64, f64)>],
        value: FieldValue,
        unit: Unit,
        source: impl Into<String>,
    ) -> Self {
        let ring = |pts: &[(f64, f64)]| {
            LineString::new(
                pts.iter()
                    .map(|&(lat, lon)| Coord { x: lon, y: lat })
                    .collect(),
            )
        };
        let geometry = Polygon::new(ring(exterior), holes.iter().map(|h| ring(h)).collect());
        Self::new(geometry, value, unit, source)
    }

    /// Check that the geometry can take part in containment and distance queries.
    pub fn validate(&self) -> Result<(), RecordDefect> {
        let rings = std::iter::once(self.geometry.exterior()).chain(self.geometry.interiors());
        for coord in rings.flat_map(|r| r.0.iter()) {
            let ok = coord.x.is_finite()
                && coord.y.is_finite()
                && (-180.0..=180.0).contains(&coord.x)
                && (-90.0..=90.0).contains(&coord.y);
            if !ok {
                return Err(RecordDefect::InvalidCoordinate {
                    lat: coord.y,
                    lon: coord.x,
                });
            }
        }

        let distinct = distinct_vertex_count(self.geometry.exterior());
        if distinct < 3 {
            return Err(RecordDefect::Degenerate(distinct));
        }
        Ok(())
    }
}

/// Vertices in a ring, ignoring consecutive repeats and the closing point.
fn distinct_vertex_count(ring: &LineString<f64>) -> usize {
    let mut coords: Vec<Coord<f64>> = ring.0.clone();
    coords.dedup();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    coords.len()
}
