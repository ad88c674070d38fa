//! Geographic calculations for feature annotation
//!
//! Angle wrapping helpers used throughout the crate, plus the geodesy used
//! to annotate terrain features relative to an observer: great-circle
//! bearing, haversine distance, and the visual elevation angle of a summit
//! corrected for Earth curvature and atmospheric refraction.

use libm::{asin, atan2, atan2f, cos, sin, sqrt};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Standard atmospheric refraction coefficient
///
/// Light bends slightly toward the Earth, lifting distant summits above
/// their geometric position. 0.13 is the conventional surveying value.
pub const REFRACTION_K: f64 = 0.13;

/// Geographic position of the observer or a catalogued feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    /// Latitude in degrees (-90 to +90)
    pub lat_deg: f64,
    /// Longitude in degrees (-180 to +180)
    pub lon_deg: f64,
    /// Altitude above sea level in meters
    pub alt_m: f32,
}

impl GeoPosition {
    /// Create a new position at sea level
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            lat_deg,
            lon_deg,
            alt_m: 0.0,
        }
    }

    /// Create a new position with altitude
    pub fn with_altitude(lat_deg: f64, lon_deg: f64, alt_m: f32) -> Self {
        Self {
            lat_deg,
            lon_deg,
            alt_m,
        }
    }
}

/// Normalize an angle in degrees to [0, 360).
///
/// Tolerates arbitrarily negative and >360 inputs (e.g. a smoothed heading
/// plus a large negative calibration bias).
pub fn wrap_360(deg: f32) -> f32 {
    ((deg % 360.0) + 360.0) % 360.0
}

/// Normalize an angle in degrees to (-180, 180].
pub fn wrap_180(deg: f32) -> f32 {
    let wrapped = wrap_360(deg);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Great-circle distance between two positions in kilometers (haversine).
pub fn calculate_distance(from: &GeoPosition, to: &GeoPosition) -> f32 {
    let lat1 = from.lat_deg.to_radians();
    let lat2 = to.lat_deg.to_radians();
    let dlat = (to.lat_deg - from.lat_deg).to_radians();
    let dlon = (to.lon_deg - from.lon_deg).to_radians();

    let a = sin(dlat / 2.0) * sin(dlat / 2.0)
        + cos(lat1) * cos(lat2) * sin(dlon / 2.0) * sin(dlon / 2.0);
    let c = 2.0 * asin(sqrt(a));

    (EARTH_RADIUS_M * c / 1000.0) as f32
}

/// Initial great-circle bearing from one position to another, degrees [0, 360).
pub fn calculate_bearing(from: &GeoPosition, to: &GeoPosition) -> f32 {
    let lat1 = from.lat_deg.to_radians();
    let lat2 = to.lat_deg.to_radians();
    let dlon = (to.lon_deg - from.lon_deg).to_radians();

    let y = sin(dlon) * cos(lat2);
    let x = cos(lat1) * sin(lat2) - sin(lat1) * cos(lat2) * cos(dlon);

    wrap_360(atan2(y, x).to_degrees() as f32)
}

/// Visual elevation angle of a feature in radians.
///
/// The angle at which a summit of `feature_alt_m` appears from an observer
/// at `observer_alt_m` over `distance_km`, after subtracting the Earth
/// curvature drop reduced by standard refraction. Negative when the summit
/// sits below the observer's horizontal.
pub fn visual_elevation(observer_alt_m: f32, feature_alt_m: f32, distance_km: f32) -> f32 {
    let d = distance_km as f64 * 1000.0;
    if d <= 0.0 {
        return 0.0;
    }
    let rise = (feature_alt_m - observer_alt_m) as f64;
    let curvature_drop = d * d / (2.0 * EARTH_RADIUS_M) * (1.0 - REFRACTION_K);
    atan2f((rise - curvature_drop) as f32, d as f32)
}
