//! Spherical-earth math for separation checks and trajectory projection.
//!
//! All horizontal distances are in nautical miles, headings in degrees
//! (0 = north, clockwise), speeds in knots.

/// Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Great-circle distance between two points via the Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in nautical miles
pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Dead-reckon a position forward along a great circle, assuming constant
/// true airspeed and heading for `delta_s` seconds.
///
/// Uses the standard spherical forward formula rather than a flat-earth
/// offset, so projections stay accurate at high latitudes and across the
/// antimeridian. Longitude is normalized into [-180, 180).
///
/// # Returns
/// `(lat, lon)` in degrees
pub fn project_position(lat: f64, lon: f64, tas_kt: f64, heading_deg: f64, delta_s: f64) -> (f64, f64) {
    let distance_nm = tas_kt * delta_s / 3600.0;
    if distance_nm.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let heading_rad = heading_deg.to_radians();
    let angular_distance = distance_nm / EARTH_RADIUS_NM;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * heading_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = heading_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}
