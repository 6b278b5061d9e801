//! Per-layer point classification: containment first, nearest second.

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Area, Coord, Polygon};
use tracing::debug;

use super::layer::Layer;
use super::resolver::resolve_nearest;
use crate::models::{GeoPoint, SelectionMethod};

/// Which record of a layer owns a point, and how it was chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerMatch {
    pub record_index: usize,
    pub selection: SelectionMethod,
    pub distance_km: f64,
    pub inside_or_on_boundary: bool,
}

/// Inclusive point-in-polygon: boundary points (outer ring or hole edge) count as inside.
pub fn covers(polygon: &Polygon<f64>, coord: Coord<f64>) -> bool {
    matches!(
        polygon.coordinate_position(&coord),
        CoordPos::Inside | CoordPos::OnBoundary
    )
}

/// Planar positions of `point`. Longitudes +180 and -180 name the same meridian.
fn meridian_positions(point: GeoPoint) -> impl Iterator<Item = GeoPoint> {
    let mirrored = (point.lon.abs() == 180.0).then_some(GeoPoint {
        lat: point.lat,
        lon: -point.lon,
    });
    std::iter::once(point).chain(mirrored)
}

/// Pick one of several covering records: smallest planar area, then lowest index.
fn tie_break(layer: &Layer, covering: &[usize]) -> Option<usize> {
    covering.iter().copied().min_by(|&a, &b| {
        let area_a = layer.record(a).geometry.unsigned_area();
        let area_b = layer.record(b).geometry.unsigned_area();
        area_a.total_cmp(&area_b).then(a.cmp(&b))
    })
}

/// Classify `point` against one layer.
///
/// Returns `None` for a layer without polygons, or when nothing covers the
/// point and `nearest_enabled` is off.
pub fn classify_layer(
    layer: &Layer,
    point: GeoPoint,
    nearest_enabled: bool,
    initial_window: usize,
) -> Option<LayerMatch> {
    let index = layer.index()?;

    let mut covering: Vec<usize> = Vec::new();
    for position in meridian_positions(point) {
        let coord: Coord<f64> = position.into();
        covering.extend(
            index
                .containment_candidates(position)
                .into_iter()
                .filter(|&i| covers(&layer.record(i).geometry, coord)),
        );
    }
    covering.sort_unstable();
    covering.dedup();

    if covering.len() > 1 {
        debug!(
            "Layer '{}': {} polygons cover ({}, {}), applying tie-break",
            layer.field,
            covering.len(),
            point.lat,
            point.lon
        );
    }

    if let Some(record_index) = tie_break(layer, &covering) {
        return Some(LayerMatch {
            record_index,
            selection: SelectionMethod::Covers,
            distance_km: 0.0,
            inside_or_on_boundary: true,
        });
    }

    if !nearest_enabled {
        return None;
    }

    let nearest = resolve_nearest(point, layer.records(), index, initial_window)?;
    Some(LayerMatch {
        record_index: nearest.record_index,
        selection: if nearest.exhausted {
            SelectionMethod::NearestOfLayer
        } else {
            SelectionMethod::NearestOfCandidates
        },
        distance_km: nearest.distance_km,
        inside_or_on_boundary: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldValue, PolygonRecord, Unit};

    fn rect(lat: f64, lon: f64, h: f64, w: f64, value: f64) -> PolygonRecord {
        PolygonRecord::from_lat_lon_rings(
            &[(lat, lon), (lat, lon + w), (lat + h, lon + w), (lat + h, lon)],
            &[],
            FieldValue::Number(value),
            Unit::from("g"),
            "pga-earthquake.kml",
        )
    }

    fn pt(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }

    #[test]
    fn test_inside_covers() {
        let layer = Layer::build("pga", vec![rect(10.0, 10.0, 1.0, 1.0, 5.0)]);
        let m = classify_layer(&layer, pt(10.5, 10.5), true, 8).unwrap();
        assert_eq!(m.selection, SelectionMethod::Covers);
        assert_eq!(m.distance_km, 0.0);
        assert!(m.inside_or_on_boundary);
    }

    #[test]
    fn test_boundary_vertex_and_edge_cover() {
        let layer = Layer::build("pga", vec![rect(10.0, 10.0, 1.0, 1.0, 5.0)]);
        for p in [pt(10.0, 10.0), pt(11.0, 11.0), pt(10.0, 10.3), pt(10.7, 11.0)] {
            let m = classify_layer(&layer, p, false, 8).unwrap();
            assert_eq!(m.selection, SelectionMethod::Covers);
            assert_eq!(m.distance_km, 0.0);
        }
    }

    #[test]
    fn test_hole_excludes_interior() {
        let holed = PolygonRecord::from_lat_lon_rings(
            &[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)],
            &[vec![(4.0, 4.0), (4.0, 6.0), (6.0, 6.0), (6.0, 4.0)]],
            FieldValue::Text("ring".to_string()),
            Unit::Text,
            "Inspection Areas.kml",
        );
        let layer = Layer::build("inspection_area", vec![holed]);

        assert!(classify_layer(&layer, pt(5.0, 5.0), false, 8).is_none());
        let on_hole_edge = classify_layer(&layer, pt(4.0, 5.0), false, 8).unwrap();
        assert_eq!(on_hole_edge.selection, SelectionMethod::Covers);

        let nearest = classify_layer(&layer, pt(5.0, 5.0), true, 8).unwrap();
        assert!(nearest.selection.is_nearest());
        assert!(nearest.distance_km > 100.0 && nearest.distance_km < 112.0);
    }

    #[test]
    fn test_overlap_prefers_smaller_area() {
        let layer = Layer::build(
            "pga",
            vec![rect(0.0, 0.0, 4.0, 4.0, 1.0), rect(1.0, 1.0, 1.0, 1.0, 2.0)],
        );
        for _ in 0..3 {
            let m = classify_layer(&layer, pt(1.5, 1.5), true, 8).unwrap();
            assert_eq!(m.record_index, 1);
        }
    }

    #[test]
    fn test_overlap_equal_area_prefers_lower_index() {
        let layer = Layer::build(
            "pga",
            vec![rect(0.0, 0.0, 2.0, 2.0, 7.0), rect(0.0, 0.0, 2.0, 2.0, 9.0)],
        );
        let m = classify_layer(&layer, pt(1.0, 1.0), true, 8).unwrap();
        assert_eq!(m.record_index, 0);
    }

    #[test]
    fn test_outside_strict_mode_yields_nothing() {
        let layer = Layer::build("pga", vec![rect(10.0, 10.0, 1.0, 1.0, 5.0)]);
        assert!(classify_layer(&layer, pt(12.0, 10.5), false, 8).is_none());
    }

    #[test]
    fn test_outside_small_layer_is_nearest_of_layer() {
        let layer = Layer::build("pga", vec![rect(10.0, 10.0, 1.0, 1.0, 5.0)]);
        let m = classify_layer(&layer, pt(12.0, 10.5), true, 8).unwrap();
        assert_eq!(m.selection, SelectionMethod::NearestOfLayer);
        assert!(!m.inside_or_on_boundary);
        assert!(m.distance_km > 111.0 && m.distance_km < 111.5);
    }

    #[test]
    fn test_antimeridian_edge_covers_from_either_side() {
        let west = Layer::build("pga", vec![rect(0.0, -180.0, 1.0, 1.0, 1.0)]);
        let east = Layer::build("pga", vec![rect(0.0, 179.0, 1.0, 1.0, 2.0)]);

        for (layer, lon) in [(&west, 180.0), (&west, -180.0), (&east, -180.0), (&east, 180.0)] {
            for nearest in [false, true] {
                let m = classify_layer(layer, pt(0.5, lon), nearest, 8).unwrap();
                assert_eq!(m.selection, SelectionMethod::Covers);
                assert_eq!(m.record_index, 0);
                assert_eq!(m.distance_km, 0.0);
                assert!(m.inside_or_on_boundary);
            }
        }
    }

    #[test]
    fn test_antimeridian_overlap_uses_tie_break() {
        let layer = Layer::build(
            "pga",
            vec![rect(0.0, 179.0, 1.0, 1.0, 1.0), rect(0.0, -180.0, 1.0, 0.5, 2.0)],
        );
        let m = classify_layer(&layer, pt(0.5, 180.0), false, 8).unwrap();
        assert_eq!(m.record_index, 1);
    }

    #[test]
    fn test_empty_layer_has_no_match() {
        let layer = Layer::build("tl", vec![]);
        assert!(classify_layer(&layer, pt(0.0, 0.0), true, 8).is_none());
    }
}
