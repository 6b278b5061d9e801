//! Query point type.

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;

/// Geographic point (lat/lon, degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Build a point, rejecting anything outside lat [-90, 90] / lon [-180, 180].
    ///
    /// Out-of-range input is an error, never clamped.
    pub fn validated(lat: f64, lon: f64) -> Result<Self, ClassifyError> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lon_ok = lon.is_finite() && (-180.0..=180.0).contains(&lon);
        if lat_ok && lon_ok {
            Ok(Self { lat, lon })
        } else {
            Err(ClassifyError::InvalidPoint { lat, lon })
        }
    }

    /// Planar `[x, y]` key used by the R-tree (x = lon, y = lat).
    pub fn to_xy(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl From<GeoPoint> for geo::Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Coord { x: p.lon, y: p.lat }
    }
}
