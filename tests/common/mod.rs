use async_trait::async_trait;
use roadtrip::cache::{GeocodeCache, MemoryStore, PersistentStore};
use roadtrip::config::PlannerConfig;
use roadtrip::models::{
    AddressComponent, ExtraDaysMap, GeoPoint, GeocodeResult, ManualWaypoints, PlaceResult,
    PlaceType, PlanRequest,
};
use roadtrip::services::providers::{
    Directions, DirectionsRequest, DirectionsRoute, PlaceSearch, ReverseGeocoder, RouteLeg,
};
use roadtrip::services::resolver::PlaceResolver;
use roadtrip::services::trip_planner::TripPlanner;
use roadtrip::{AppError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use time::macros::date;

/// 1 km in degrees of latitude on the 6371 km sphere
pub const KM_IN_DEG: f64 = 1.0 / 111.194_926_644_558_73;

pub const START_LAT: f64 = 36.0;
pub const ROUTE_LNG: f64 = -4.0;

/// In-process stand-in for the Maps web services.
///
/// Routes run due north from (36, -4) with a vertex every 10 km; the total
/// length is split evenly over the legs. Nearby search names a town after
/// the rounded latitude; reverse geocoding does the same with another prefix.
pub struct FakeMaps {
    pub route_km: f64,
    pub directions_calls: AtomicUsize,
    pub place_calls: AtomicUsize,
    pub geocode_calls: AtomicUsize,
    pub routed_calls: AtomicUsize,
    pub fail_route: AtomicBool,
    pub fail_places: AtomicBool,
    pub fail_geocode: AtomicBool,
    pub fail_routed: AtomicBool,
    pub place_delay: Option<Duration>,
}

#[allow(dead_code)]
impl FakeMaps {
    pub fn new(route_km: f64) -> Self {
        FakeMaps {
            route_km,
            directions_calls: AtomicUsize::new(0),
            place_calls: AtomicUsize::new(0),
            geocode_calls: AtomicUsize::new(0),
            routed_calls: AtomicUsize::new(0),
            fail_route: AtomicBool::new(false),
            fail_places: AtomicBool::new(false),
            fail_geocode: AtomicBool::new(false),
            fail_routed: AtomicBool::new(false),
            place_delay: None,
        }
    }

    pub fn with_place_delay(mut self, delay: Duration) -> Self {
        self.place_delay = Some(delay);
        self
    }

    pub fn remote_calls(&self) -> usize {
        self.place_calls.load(Ordering::SeqCst) + self.geocode_calls.load(Ordering::SeqCst)
    }

    fn leg(start_lat: f64, km: f64) -> RouteLeg {
        let steps = (km / 10.0).round().max(1.0) as usize;
        let step_deg = km * KM_IN_DEG / steps as f64;
        RouteLeg {
            distance_meters: km * 1000.0,
            path: (0..=steps)
                .map(|i| GeoPoint::new(start_lat + i as f64 * step_deg, ROUTE_LNG).unwrap())
                .collect(),
        }
    }
}

pub fn town_name(location: &GeoPoint) -> String {
    format!("Town {:.2}", location.lat)
}

#[async_trait]
impl Directions for FakeMaps {
    async fn route(&self, request: &DirectionsRequest) -> Result<DirectionsRoute> {
        self.directions_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_route.load(Ordering::SeqCst) {
            return Err(AppError::NoRoute(format!(
                "{} -> {}",
                request.origin, request.destination
            )));
        }

        let leg_count = request.waypoints.len() + 1;
        let leg_km = self.route_km / leg_count as f64;
        let mut legs = Vec::with_capacity(leg_count);
        let mut start_lat = START_LAT;
        for _ in 0..leg_count {
            let leg = Self::leg(start_lat, leg_km);
            start_lat = leg.path.last().map(|p| p.lat).unwrap_or(start_lat);
            legs.push(leg);
        }
        Ok(DirectionsRoute { legs })
    }

    async fn routed_distance_m(&self, _origin: &str, destination: &GeoPoint) -> Result<f64> {
        self.routed_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_routed.load(Ordering::SeqCst) {
            return Err(AppError::MapsApi("UNKNOWN_ERROR".to_string()));
        }
        let origin = GeoPoint::new(START_LAT, ROUTE_LNG).unwrap();
        Ok(origin.distance_m(destination) * 1.1)
    }
}

#[async_trait]
impl PlaceSearch for FakeMaps {
    async fn nearby_search(
        &self,
        location: &GeoPoint,
        _radius_m: f64,
        place_type: PlaceType,
    ) -> Result<Vec<PlaceResult>> {
        self.place_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.place_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_places.load(Ordering::SeqCst) {
            return Err(AppError::MapsApi("OVER_QUERY_LIMIT".to_string()));
        }

        match place_type {
            PlaceType::Locality => Ok(vec![
                PlaceResult {
                    rating: Some(4.2),
                    user_ratings_total: Some(300),
                    ..PlaceResult::new(town_name(location), *location)
                },
                PlaceResult {
                    rating: Some(4.8),
                    user_ratings_total: Some(20),
                    ..PlaceResult::new(
                        "Village nearby",
                        GeoPoint::new(location.lat, location.lng + 0.05).unwrap(),
                    )
                },
            ]),
            PlaceType::Lodging => Ok(vec![]),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for FakeMaps {
    async fn reverse_geocode(&self, location: &GeoPoint) -> Result<Vec<GeocodeResult>> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_geocode.load(Ordering::SeqCst) {
            return Err(AppError::MapsApi("REQUEST_DENIED".to_string()));
        }
        let name = format!("Reverse {:.2}", location.lat);
        Ok(vec![GeocodeResult {
            address_components: vec![AddressComponent {
                long_name: name.clone(),
                short_name: name.clone(),
                types: vec!["locality".to_string()],
            }],
            formatted_address: format!("{}, Spain", name),
        }])
    }
}

#[allow(dead_code)]
pub fn memory_cache() -> Arc<GeocodeCache> {
    cache_over(Arc::new(MemoryStore::new()))
}

#[allow(dead_code)]
pub fn cache_over(store: Arc<dyn PersistentStore>) -> Arc<GeocodeCache> {
    Arc::new(GeocodeCache::new(store, Duration::from_secs(30 * 86_400), 1_000))
}

#[allow(dead_code)]
pub fn test_planner_config() -> PlannerConfig {
    PlannerConfig {
        debounce_ms: 20,
        ..PlannerConfig::default()
    }
}

#[allow(dead_code)]
pub fn planner(maps: &Arc<FakeMaps>, cache: Arc<GeocodeCache>) -> TripPlanner {
    let config = test_planner_config();
    let resolver = Arc::new(PlaceResolver::new(
        maps.clone(),
        maps.clone(),
        cache,
        &config,
    ));
    TripPlanner::new(maps.clone(), resolver, config)
}

#[allow(dead_code)]
pub fn plan_request(max_km_per_day: f64) -> PlanRequest {
    PlanRequest {
        origin: "Málaga, Spain".to_string(),
        destination: "Santander, Spain".to_string(),
        waypoints: ManualWaypoints::new(),
        max_km_per_day,
        start_date: date!(2026 - 06 - 01),
        extra_days: ExtraDaysMap::new(),
    }
}
