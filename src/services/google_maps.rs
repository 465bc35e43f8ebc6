use crate::constants::MAPS_REQUEST_TIMEOUT_SECONDS;
use crate::error::{AppError, Result};
use crate::models::{GeoPoint, GeocodeResult, PlaceResult, PlaceType};
use crate::services::geometry::join_paths;
use crate::services::providers::{
    Directions, DirectionsRequest, DirectionsRoute, PlaceSearch, ReverseGeocoder, RouteLeg,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Client for the Google Maps web services used by the planner:
/// Directions, Places nearby search and reverse Geocoding.
#[derive(Clone)]
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleMapsClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, MAPS_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(MAPS_REQUEST_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_default();

        GoogleMapsClient {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}/json", self.base_url, service);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", &self.api_key)])
            .send()
            .await
            .map_err(|e| AppError::MapsApi(format!("{} request failed: {}", service, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                service,
                "Maps API HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::MapsApi(format!(
                "{} HTTP {}: {}",
                service, status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::MapsApi(format!("Failed to parse {} response: {}", service, e)))
    }
}

/// `OK` and `ZERO_RESULTS` are successes; everything else is an API error
fn check_status(service: &str, status: &str, error_message: Option<&str>) -> Result<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(AppError::MapsApi(format!(
            "{} returned {}: {}",
            service,
            other,
            error_message.unwrap_or("no details")
        ))),
    }
}

#[async_trait]
impl PlaceSearch for GoogleMapsClient {
    async fn nearby_search(
        &self,
        location: &GeoPoint,
        radius_m: f64,
        place_type: PlaceType,
    ) -> Result<Vec<PlaceResult>> {
        let response: PlacesApiResponse = self
            .get_json(
                "place/nearbysearch",
                &[
                    ("location", location.to_query_param()),
                    ("radius", format!("{:.0}", radius_m)),
                    ("type", place_type.as_str().to_string()),
                    ("rankby", "prominence".to_string()),
                ],
            )
            .await?;
        check_status(
            "Places",
            &response.status,
            response.error_message.as_deref(),
        )?;

        let results: Vec<PlaceResult> = response
            .results
            .into_iter()
            .filter_map(ApiPlace::into_place)
            .collect();

        tracing::debug!(
            place_type = %place_type,
            radius_m,
            results = results.len(),
            "Nearby search around {} returned {} results",
            location, results.len()
        );
        Ok(results)
    }
}

#[async_trait]
impl ReverseGeocoder for GoogleMapsClient {
    async fn reverse_geocode(&self, location: &GeoPoint) -> Result<Vec<GeocodeResult>> {
        let response: GeocodeApiResponse = self
            .get_json("geocode", &[("latlng", location.to_query_param())])
            .await?;
        check_status(
            "Geocoding",
            &response.status,
            response.error_message.as_deref(),
        )?;
        Ok(response.results)
    }
}

#[async_trait]
impl Directions for GoogleMapsClient {
    async fn route(&self, request: &DirectionsRequest) -> Result<DirectionsRoute> {
        let mut params = vec![
            ("origin", request.origin.clone()),
            ("destination", request.destination.clone()),
            ("mode", "driving".to_string()),
            ("alternatives", "true".to_string()),
        ];
        if !request.waypoints.is_empty() {
            params.push(("waypoints", request.waypoints.join("|")));
        }

        tracing::debug!(
            waypoints = request.waypoints.len(),
            "Directions request: {} -> {} via {} waypoints",
            request.origin, request.destination, request.waypoints.len()
        );

        let response: DirectionsApiResponse = self.get_json("directions", &params).await?;
        if matches!(response.status.as_str(), "ZERO_RESULTS" | "NOT_FOUND") {
            return Err(AppError::NoRoute(format!(
                "{} -> {} ({})",
                request.origin, request.destination, response.status
            )));
        }
        check_status(
            "Directions",
            &response.status,
            response.error_message.as_deref(),
        )?;

        let mut routes = response
            .routes
            .into_iter()
            .map(ApiRoute::into_route)
            .collect::<Result<Vec<_>>>()?;

        // Of the alternatives offered, drive the shortest
        routes.sort_by(|a, b| {
            a.distance_km()
                .partial_cmp(&b.distance_km())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let route = routes
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NoRoute("Directions returned no routes".to_string()))?;

        tracing::debug!(
            distance_km = %format!("{:.1}", route.distance_km()),
            legs = route.legs.len(),
            "Directions response: {:.1}km over {} legs",
            route.distance_km(), route.legs.len()
        );
        Ok(route)
    }

    async fn routed_distance_m(&self, origin: &str, destination: &GeoPoint) -> Result<f64> {
        let response: DirectionsApiResponse = self
            .get_json(
                "directions",
                &[
                    ("origin", origin.to_string()),
                    ("destination", destination.to_query_param()),
                    ("mode", "driving".to_string()),
                ],
            )
            .await?;
        check_status(
            "Directions",
            &response.status,
            response.error_message.as_deref(),
        )?;

        response
            .routes
            .first()
            .and_then(|route| route.legs.first())
            .map(|leg| leg.distance.value)
            .ok_or_else(|| AppError::NoRoute(format!("{} -> {}", origin, destination)))
    }
}

/// Decodes a Google encoded polyline (precision 1e5)
pub fn decode_polyline(encoded: &str) -> Result<Vec<GeoPoint>> {
    let line = polyline::decode_polyline(encoded, 5)
        .map_err(|e| AppError::MapsApi(format!("Invalid polyline: {}", e)))?;
    // x is the longitude, y the latitude
    line.coords()
        .map(|c| GeoPoint::new(c.y, c.x).map_err(AppError::MapsApi))
        .collect()
}

// Google API response types

#[derive(Debug, Deserialize)]
struct PlacesApiResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<ApiPlace>,
}

#[derive(Debug, Deserialize)]
struct ApiPlace {
    name: String,
    geometry: ApiGeometry,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<u32>,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    business_status: Option<String>,
}

impl ApiPlace {
    fn into_place(self) -> Option<PlaceResult> {
        let location = GeoPoint::new(self.geometry.location.lat, self.geometry.location.lng).ok()?;
        Some(PlaceResult {
            name: self.name,
            location,
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            vicinity: self.vicinity,
            business_status: self.business_status,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiGeometry {
    location: ApiLatLng,
}

#[derive(Debug, Deserialize)]
struct ApiLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodeApiResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct DirectionsApiResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    legs: Vec<ApiLeg>,
}

impl ApiRoute {
    fn into_route(self) -> Result<DirectionsRoute> {
        let legs = self
            .legs
            .into_iter()
            .map(ApiLeg::into_leg)
            .collect::<Result<Vec<_>>>()?;
        Ok(DirectionsRoute { legs })
    }
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    distance: ApiValue,
    start_location: ApiLatLng,
    end_location: ApiLatLng,
    #[serde(default)]
    steps: Vec<ApiStep>,
}

impl ApiLeg {
    fn into_leg(self) -> Result<RouteLeg> {
        let step_paths = self
            .steps
            .iter()
            .map(|step| decode_polyline(&step.polyline.points))
            .collect::<Result<Vec<_>>>()?;

        let path = if step_paths.is_empty() {
            [self.start_location, self.end_location]
                .iter()
                .filter_map(|p| GeoPoint::new(p.lat, p.lng).ok())
                .collect()
        } else {
            join_paths(step_paths.iter().map(Vec::as_slice))
        };

        Ok(RouteLeg {
            distance_meters: self.distance.value,
            path,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiStep {
    polyline: ApiPolyline,
}

#[derive(Debug, Deserialize)]
struct ApiPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct ApiValue {
    value: f64,
}
