use serde::{Deserialize, Serialize};
use std::fmt;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Unchecked wire form, validated through [`GeoPoint::new`]
#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = String;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lng
            ));
        }
        Ok(GeoPoint { lat, lng })
    }

    /// Great-circle distance using the Haversine formula, in kilometers
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Same as [`GeoPoint::distance_to`], in meters
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        self.distance_to(other) * 1000.0
    }

    /// Round coordinates to specified decimal places for caching
    pub fn round(&self, decimal_places: u32) -> Self {
        let multiplier = 10_f64.powi(decimal_places as i32);
        GeoPoint {
            lat: (self.lat * multiplier).round() / multiplier,
            lng: (self.lng * multiplier).round() / multiplier,
        }
    }

    /// `"lat,lng"` as expected by the Maps web services
    pub fn to_query_param(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(48.8566, 2.3522).is_ok());
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 181.0).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_deserialize_checks_range() {
        let ok: GeoPoint = serde_json::from_str(r#"{"lat": 40.4, "lng": -3.7}"#).unwrap();
        assert_eq!(ok, GeoPoint::new(40.4, -3.7).unwrap());

        assert!(serde_json::from_str::<GeoPoint>(r#"{"lat": 95.0, "lng": 0.0}"#).is_err());
        assert!(serde_json::from_str::<GeoPoint>(r#"{"lat": 0.0, "lng": -200.0}"#).is_err());
    }

    #[test]
    fn test_distance_calculation() {
        let paris = GeoPoint::new(48.8566, 2.3522).unwrap();
        let london = GeoPoint::new(51.5074, -0.1278).unwrap();

        let distance = paris.distance_to(&london);
        // Paris to London is approximately 344 km
        assert!((distance - 344.0).abs() < 10.0);
        assert!((paris.distance_m(&london) - distance * 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let madrid = GeoPoint::new(40.4168, -3.7038).unwrap();
        assert_eq!(madrid.distance_to(&madrid), 0.0);
    }

    #[test]
    fn test_rounding() {
        let coords = GeoPoint::new(48.856614, 2.352222).unwrap();
        let rounded = coords.round(4);
        assert_eq!(rounded.lat, 48.8566);
        assert_eq!(rounded.lng, 2.3522);
    }

    #[test]
    fn test_display_and_query_param() {
        let p = GeoPoint::new(40.5, -3.25).unwrap();
        assert_eq!(p.to_query_param(), "40.5,-3.25");
        assert_eq!(p.to_string(), "40.50000, -3.25000");
    }
}
