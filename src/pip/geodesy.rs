//! Great-circle distance helpers.
//!
//! Everything here works on `geo::Coord` with x = lon, y = lat in degrees.
//! Distances are kilometres on a sphere of radius [`EARTH_RADIUS_KM`].

use geo::{Coord, LineString, Polygon};
use rstar::AABB;

/// Mean Earth radius (IUGG), km.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance between two coordinates.
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let (lat1, lat2) = (a.y.to_radians(), b.y.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.x - a.x).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Segments spanning more than this many degrees get their closest point
/// refined on the sphere.
const REFINE_SPAN_DEG: f64 = 1.0;

/// Golden-section search stops once the bracket is this narrow, in degrees.
const REFINE_TOLERANCE_DEG: f64 = 1e-7;

/// Evenly spaced samples taken before narrowing.
const REFINE_SCAN_STEPS: u32 = 16;

const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Distance from `p` to the segment `a`-`b`.
///
/// The closest point on the segment is first estimated in an equirectangular
/// frame centred on `p`. Long segments are then searched along their length
/// for the haversine minimum.
/// The result is never larger than the estimate or either endpoint distance.
/// The segment is shifted by whole turns so it sits on the same side of the
/// antimeridian as `p`.
pub fn point_segment_km(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let shift = ((p.x - (a.x + b.x) / 2.0) / 360.0).round() * 360.0;
    let a = Coord { x: a.x + shift, y: a.y };
    let b = Coord { x: b.x + shift, y: b.y };

    let k = p.y.to_radians().cos();
    let (au, av) = ((a.x - p.x) * k, a.y - p.y);
    let (du, dv) = ((b.x - a.x) * k, b.y - a.y);
    let len2 = du * du + dv * dv;

    let t = if len2 > 0.0 {
        (-(au * du + av * dv) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let along = |t: f64| {
        haversine_km(
            p,
            Coord {
                x: a.x + t * (b.x - a.x),
                y: a.y + t * (b.y - a.y),
            },
        )
    };

    let mut best = along(t)
        .min(haversine_km(p, a))
        .min(haversine_km(p, b));

    let span = (b.x - a.x).abs().max((b.y - a.y).abs());
    if span > REFINE_SPAN_DEG {
        best = best.min(golden_section_min(along, span));
    }
    best
}

/// Smallest value of `f` over `t` in [0, 1]: a coarse scan picks the bracket,
/// golden-section search narrows it.
fn golden_section_min(f: impl Fn(f64) -> f64, span_deg: f64) -> f64 {
    let step = 1.0 / f64::from(REFINE_SCAN_STEPS);
    let (best_step, best_value) = (0..=REFINE_SCAN_STEPS)
        .map(|i| (i, f(f64::from(i) * step)))
        .fold((0, f64::INFINITY), |acc, (i, v)| if v < acc.1 { (i, v) } else { acc });

    let mut lo = (f64::from(best_step) - 1.0).max(0.0) * step;
    let mut hi = (f64::from(best_step) + 1.0).min(f64::from(REFINE_SCAN_STEPS)) * step;
    let mut x1 = hi - INV_PHI * (hi - lo);
    let mut x2 = lo + INV_PHI * (hi - lo);
    let (mut f1, mut f2) = (f(x1), f(x2));

    while (hi - lo) * span_deg > REFINE_TOLERANCE_DEG {
        if f1 <= f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_PHI * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_PHI * (hi - lo);
            f2 = f(x2);
        }
    }
    best_value.min(f1).min(f2)
}

fn ring_distance_km(p: Coord<f64>, ring: &LineString<f64>) -> f64 {
    ring.lines()
        .map(|line| point_segment_km(p, line.start, line.end))
        .fold(f64::INFINITY, f64::min)
}

/// Minimum distance from `p` to any edge of the polygon, holes included.
///
/// This ignores containment: a point inside the polygon still gets its
/// distance to the nearest edge.
pub fn boundary_distance_km(p: Coord<f64>, polygon: &Polygon<f64>) -> f64 {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring_distance_km(p, ring))
        .fold(f64::INFINITY, f64::min)
}

/// Longitude difference folded into [0, 180].
fn wrapped_lon_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Exact distance from `p` to the meridian arc at `lon` between `lat_lo` and `lat_hi`.
fn meridian_arc_km(p: Coord<f64>, lon: f64, lat_lo: f64, lat_hi: f64) -> f64 {
    let phi = p.y.to_radians();
    let dlon = (lon - p.x).to_radians();
    // Latitude maximising cos(d) along the full meridian
    let alpha = phi.sin().atan2(phi.cos() * dlon.cos()).to_degrees();

    let at = |lat: f64| haversine_km(p, Coord { x: lon, y: lat });
    let mut best = at(lat_lo).min(at(lat_hi));
    if (lat_lo..=lat_hi).contains(&alpha) {
        best = best.min(at(alpha));
    }
    best
}

/// Exact minimum great-circle distance from `p` to a lon/lat rectangle.
///
/// Every point of a record lies inside its envelope, so no record can be
/// closer than this.
pub fn envelope_lower_bound_km(p: Coord<f64>, envelope: &AABB<[f64; 2]>) -> f64 {
    let [lon_lo, lat_lo] = envelope.lower();
    let [lon_hi, lat_hi] = envelope.upper();

    if (lon_lo..=lon_hi).contains(&p.x) {
        let gap = if p.y < lat_lo {
            lat_lo - p.y
        } else if p.y > lat_hi {
            p.y - lat_hi
        } else {
            0.0
        };
        return EARTH_RADIUS_KM * gap.to_radians();
    }

    // For a fixed latitude, distance grows with the folded longitude gap, so
    // the nearest point lies on the closer meridian edge.
    let edge = if wrapped_lon_delta(p.x, lon_lo) <= wrapped_lon_delta(p.x, lon_hi) {
        lon_lo
    } else {
        lon_hi
    };
    meridian_arc_km(p, edge, lat_lo, lat_hi)
}

/// Lower bound on the great-circle distance from `p` to any valid coordinate
/// whose planar (lon, lat) distance from `p` is at least `planar_deg`.
///
/// Such a coordinate differs from `p` by at least `planar_deg / sqrt(2)` in
/// latitude or in raw longitude. Both cases are bounded separately; the
/// longitude case accounts for wrap-around and convergence at the poles.
pub fn planar_lower_bound_km(p: Coord<f64>, planar_deg: f64) -> f64 {
    if planar_deg <= 0.0 {
        return 0.0;
    }
    let s = planar_deg / std::f64::consts::SQRT_2;

    let lat_case = EARTH_RADIUS_KM * s.to_radians();

    // Raw longitude gap >= s folds to at least min(s, 180 - |lon|)
    let folded = s.min(180.0 - p.x.abs()).clamp(0.0, 90.0);
    let cross_track = (p.y.to_radians().cos() * folded.to_radians().sin()).clamp(0.0, 1.0);
    let lon_case = EARTH_RADIUS_KM * cross_track.asin();

    lat_case.min(lon_case)
}
