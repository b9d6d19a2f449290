//! Spherical geometry helpers for route previews and summaries.

use crate::models::{Cartesian3, GeoPoint};

/// Mars mean radius in meters.
pub const MARS_RADIUS_M: f64 = 3_390_000.0;

/// Calculate the great-circle distance between two points on Mars (Haversine).
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * MARS_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Unit vector on the sphere for a lon/lat point.
pub fn to_unit_vector(point: GeoPoint) -> Cartesian3 {
    let lon = point.lon().to_radians();
    let lat = point.lat().to_radians();
    Cartesian3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
}

fn from_unit_vector(v: Cartesian3) -> Option<GeoPoint> {
    let lat = v.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = v.y.atan2(v.x).to_degrees();
    GeoPoint::new(lon, lat).ok()
}

/// Central angle between two points, in radians.
pub fn central_angle(a: GeoPoint, b: GeoPoint) -> f64 {
    to_unit_vector(a)
        .dot(to_unit_vector(b))
        .clamp(-1.0, 1.0)
        .acos()
}

/// Point a fraction `t` of the way along the great circle from `a` to `b`.
///
/// Falls back to `a` for coincident or antipodal endpoints, where the great
/// circle is undefined.
pub fn interpolate_great_circle(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    let omega = central_angle(a, b);
    let sin_omega = omega.sin();
    if sin_omega.abs() < 1e-12 {
        return a;
    }
    let wa = ((1.0 - t) * omega).sin() / sin_omega;
    let wb = (t * omega).sin() / sin_omega;
    let va = to_unit_vector(a).scale(wa);
    let vb = to_unit_vector(b).scale(wb);
    let v = Cartesian3::new(va.x + vb.x, va.y + vb.y, va.z + vb.z);
    from_unit_vector(v).unwrap_or(a)
}

/// Insert great-circle samples so consecutive points are at most
/// `max_step_deg` of arc apart. Input points are always kept.
pub fn densify_great_circle(points: &[GeoPoint], max_step_deg: f64) -> Vec<GeoPoint> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    let step_rad = max_step_deg.max(1e-6).to_radians();
    let mut out = vec![*first];
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let segments = (central_angle(a, b) / step_rad).ceil().max(1.0) as usize;
        for i in 1..segments {
            out.push(interpolate_great_circle(a, b, i as f64 / segments as f64));
        }
        out.push(b);
    }
    out
}
