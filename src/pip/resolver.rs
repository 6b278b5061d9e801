//! Exact nearest-polygon resolution on top of the planar index.
//!
//! The index ranks records by planar bbox distance in degrees, which is only
//! a rough ordering of kilometres. The resolver pulls candidates from that
//! ranking in doubling windows and evaluates each exactly with
//! [`boundary_distance_km`]. It stops once the best exact distance beats a
//! kilometre lower bound covering every record not yet pulled, or once the
//! whole layer has been pulled. Either way the answer is the one a
//! full-layer scan would give.

use geo::Coord;
use tracing::debug;

use super::geodesy::{boundary_distance_km, envelope_lower_bound_km, planar_lower_bound_km};
use super::index::LayerIndex;
use crate::models::{GeoPoint, PolygonRecord};

/// Smallest allowed initial candidate window.
pub const MIN_WINDOW: usize = 8;

/// Float slack applied when comparing exact distances against lower bounds.
const BOUND_SLACK_KM: f64 = 1e-6;

/// Nearest record found by [`resolve_nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestMatch {
    pub record_index: usize,
    pub distance_km: f64,
    /// Every record of the layer was pulled from the index
    pub exhausted: bool,
    /// Records pulled from the index
    pub pulled: usize,
    /// Records evaluated exactly (after envelope pruning)
    pub evaluated: usize,
}

/// Find the record whose boundary is nearest to `point`.
///
/// Ties on distance go to the lower record index. Returns `None` only for an
/// empty index.
pub fn resolve_nearest(
    point: GeoPoint,
    records: &[PolygonRecord],
    index: &LayerIndex,
    initial_window: usize,
) -> Option<NearestMatch> {
    let total = index.len();
    if total == 0 {
        return None;
    }

    let p: Coord<f64> = point.into();
    let mut candidates = index.nearest_iter(point);

    let mut best_km = f64::INFINITY;
    let mut best_index = usize::MAX;
    let mut taken = 0usize;
    let mut evaluated = 0usize;
    let mut frontier_deg = 0.0;
    let mut window = initial_window.max(MIN_WINDOW);
    let mut exhausted = false;

    loop {
        let target = window.min(total);
        while taken < target {
            let Some((idx, planar_deg)) = candidates.next() else {
                break;
            };
            taken += 1;
            frontier_deg = planar_deg;

            if envelope_lower_bound_km(p, index.envelope(idx)) > best_km + BOUND_SLACK_KM {
                continue;
            }
            evaluated += 1;
            let d = boundary_distance_km(p, &records[idx].geometry);
            if d < best_km || (d == best_km && idx < best_index) {
                best_km = d;
                best_index = idx;
            }
        }

        if taken >= target && taken < total {
            // Every record not pulled yet is at least `frontier_deg` away in the plane
            if best_km + BOUND_SLACK_KM < planar_lower_bound_km(p, frontier_deg) {
                break;
            }
            window = window.saturating_mul(2);
        } else {
            exhausted = true;
            break;
        }
    }

    debug!(
        "Nearest at ({}, {}): record {} at {:.3} km ({} pulled, {} evaluated, exhausted={})",
        point.lat, point.lon, best_index, best_km, taken, evaluated, exhausted
    );

    Some(NearestMatch {
        record_index: best_index,
        distance_km: best_km,
        exhausted,
        pulled: taken,
        evaluated,
    })
}
