//! Seams to the paid mapping services.
//!
//! The planner only talks to these traits; [`GoogleMapsClient`] implements
//! all of them over HTTP and tests substitute in-process fakes.
//!
//! [`GoogleMapsClient`]: crate::services::google_maps::GoogleMapsClient

use crate::error::Result;
use crate::models::{GeoPoint, GeocodeResult, PlaceResult, PlaceType};
use crate::services::geometry::join_paths;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: String,
    pub destination: String,
    pub waypoints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    pub distance_meters: f64,
    /// Fine-grained driving path of this leg
    pub path: Vec<GeoPoint>,
}

impl RouteLeg {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }
}

/// The route selected from the provider's alternatives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionsRoute {
    /// One leg per consecutive pair of origin, waypoints and destination
    pub legs: Vec<RouteLeg>,
}

impl DirectionsRoute {
    pub fn distance_km(&self) -> f64 {
        self.legs.iter().map(RouteLeg::distance_km).sum()
    }

    /// All leg paths joined into one
    pub fn path(&self) -> Vec<GeoPoint> {
        join_paths(self.legs.iter().map(|leg| leg.path.as_slice()))
    }
}

#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Places of `place_type` around `location`, ranked by prominence
    async fn nearby_search(
        &self,
        location: &GeoPoint,
        radius_m: f64,
        place_type: PlaceType,
    ) -> Result<Vec<PlaceResult>>;
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, location: &GeoPoint) -> Result<Vec<GeocodeResult>>;
}

#[async_trait]
pub trait Directions: Send + Sync {
    /// Driving route through all waypoints, in order
    async fn route(&self, request: &DirectionsRequest) -> Result<DirectionsRoute>;

    /// Driving distance (meters) of the first leg from a free-text origin
    async fn routed_distance_m(&self, origin: &str, destination: &GeoPoint) -> Result<f64>;
}
