use crate::models::{BoundingBox, Coordinate};

/// Earth's mean radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Meters per degree of latitude on a sphere of `EARTH_RADIUS_METERS`
const METERS_PER_DEGREE: f64 = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;

/// Great-circle distance between two points in meters (spherical law of cosines)
///
/// The `acos` argument is clamped to `[-1, 1]`: for nearly identical points
/// rounding can push it slightly above 1.0, which would otherwise yield NaN.
///
/// # Arguments
/// * `a` - First point
/// * `b` - Second point
///
/// # Returns
/// Distance in meters, never NaN for valid coordinates
#[inline]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    // sin² + cos² may round to just under 1.0, so identical points would land a few cm apart
    if a == b {
        return 0.0;
    }

    cos_central_angle(a, b).clamp(-1.0, 1.0).acos() * EARTH_RADIUS_METERS
}

/// Unclamped cosine of the angle between `a` and `b` as seen from the earth's center
fn cos_central_angle(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_lambda = (b.longitude - a.longitude).abs().to_radians();

    phi1.sin() * phi2.sin() + phi1.cos() * phi2.cos() * delta_lambda.cos()
}

/// Calculate a bounding box around a center point
///
/// Cheaper than the exact distance for pre-filtering; every point within
/// `radius_m` of `center` lies inside the box.
pub fn calculate_bounding_box(center: Coordinate, radius_m: f64) -> BoundingBox {
    let lat_delta = radius_m / METERS_PER_DEGREE;

    // Longitude degrees shrink with latitude; near the poles the box spans all longitudes
    let cos_lat = center.latitude.to_radians().cos().abs();
    let lon_delta = if cos_lat < 1e-9 {
        180.0
    } else {
        (radius_m / (METERS_PER_DEGREE * cos_lat)).min(180.0)
    };

    BoundingBox {
        min_lat: (center.latitude - lat_delta).max(-90.0),
        max_lat: (center.latitude + lat_delta).min(90.0),
        min_lon: center.longitude - lon_delta,
        max_lon: center.longitude + lon_delta,
    }
}

/// Check if a point is within a bounding box
///
/// Boxes crossing the antimeridian are handled by also testing the point
/// shifted by a full turn.
#[inline]
pub fn is_within_bounding_box(point: Coordinate, bbox: &BoundingBox) -> bool {
    if point.latitude < bbox.min_lat || point.latitude > bbox.max_lat {
        return false;
    }

    let lon = point.longitude;
    (lon >= bbox.min_lon && lon <= bbox.max_lon)
        || (lon + 360.0 >= bbox.min_lon && lon + 360.0 <= bbox.max_lon)
        || (lon - 360.0 >= bbox.min_lon && lon - 360.0 <= bbox.max_lon)
}

/// Exact radius check with a bounding-box short circuit
#[inline]
pub fn is_within_radius(center: Coordinate, point: Coordinate, radius_m: f64, bbox: &BoundingBox) -> bool {
    is_within_bounding_box(point, bbox) && distance_meters(center, point) <= radius_m
}
