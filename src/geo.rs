//! Geographic points and great-circle distance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers, used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both coordinates are finite numbers.
    ///
    /// Distance calculation assumes finite inputs; callers validate with this
    /// before invoking it.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Great-circle (haversine) distance to another point, in kilometers.
    ///
    /// Deterministic, no side effects. The result is clamped to be
    /// non-negative before any tier lookup.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        (EARTH_RADIUS_KM * c).max(0.0)
    }

    /// Google Maps URL pointing at this location.
    pub fn maps_url(&self) -> String {
        format!("https://www.google.com/maps?q={},{}", self.lat, self.lng)
    }
}

/// A geolocation fix captured from the customer's device.
///
/// Immutable once captured; superseded wholesale by a later capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedLocation {
    /// The captured coordinates.
    pub point: GeoPoint,
    /// Reported accuracy in meters, when the device provides one.
    pub accuracy: Option<f64>,
    /// When the fix was captured.
    pub captured_at: DateTime<Utc>,
}

impl CapturedLocation {
    /// Capture a location fix at the current time.
    pub fn now(point: GeoPoint) -> Self {
        Self {
            point,
            accuracy: None,
            captured_at: Utc::now(),
        }
    }

    /// Attach a device-reported accuracy.
    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy = Some(meters);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(18.976240, 73.023252);
        assert!(p.distance_km(&p) < 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoPoint::new(18.976240, 73.023252);
        let b = GeoPoint::new(19.076090, 72.877426);
        let ab = a.distance_km(&b);
        let ba = b.distance_km(&a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        // Panvel-area restaurant to Mumbai CST is roughly 18-19 km as the
        // crow flies.
        let origin = GeoPoint::new(18.976240, 73.023252);
        let cst = GeoPoint::new(18.940000, 72.835500);
        let d = origin.distance_km(&cst);
        assert!(d > 15.0 && d < 25.0, "got {d}");
    }

    #[test]
    fn test_distance_deterministic() {
        let a = GeoPoint::new(18.5, 73.0);
        let b = GeoPoint::new(19.0, 73.5);
        assert_eq!(a.distance_km(&b), a.distance_km(&b));
    }

    #[test]
    fn test_is_finite() {
        assert!(GeoPoint::new(18.9, 73.0).is_finite());
        assert!(!GeoPoint::new(f64::NAN, 73.0).is_finite());
        assert!(!GeoPoint::new(18.9, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_maps_url() {
        let p = GeoPoint::new(18.97624, 73.023252);
        assert_eq!(
            p.maps_url(),
            "https://www.google.com/maps?q=18.97624,73.023252"
        );
    }
}
