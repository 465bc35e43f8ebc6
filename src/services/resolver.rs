//! Naming an overnight stop.
//!
//! Each stop goes through a fallback chain where the first success wins:
//! nearby localities, then nearby lodging that is still operating, then a
//! reverse geocode of the stop itself. Every remote lookup is served from the
//! [`GeocodeCache`] when possible. Lookup errors never fail the stop; they are
//! logged and the chain moves on.

use crate::cache::GeocodeCache;
use crate::config::PlannerConfig;
use crate::models::{Alternative, GeoPoint, PlaceResult, PlaceType, StopPoint};
use crate::services::providers::{PlaceSearch, ReverseGeocoder};
use crate::services::waypoints::match_manual;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const REVERSE_GEOCODE_QUERY: &str = "reverse_geocode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Locality,
    Lodging,
    ReverseGeocode,
    Unresolved,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionSource::Locality => "locality",
            ResolutionSource::Lodging => "lodging",
            ResolutionSource::ReverseGeocode => "reverse_geocode",
            ResolutionSource::Unresolved => "unresolved",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub city_name: Option<String>,
    pub city_coords: Option<GeoPoint>,
    pub is_manual: bool,
    /// Empty for manual stops
    pub alternatives: Vec<Alternative>,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn apply_to(self, stop: &mut StopPoint) {
        stop.city_name = self.city_name;
        stop.city_coords = self.city_coords;
        stop.is_manual_waypoint = self.is_manual;
        stop.alternatives = self.alternatives;
    }
}

pub struct PlaceResolver {
    places: Arc<dyn PlaceSearch>,
    geocoder: Arc<dyn ReverseGeocoder>,
    cache: Arc<GeocodeCache>,
    alternative_pool: usize,
    alternatives_kept: usize,
}

impl PlaceResolver {
    pub fn new(
        places: Arc<dyn PlaceSearch>,
        geocoder: Arc<dyn ReverseGeocoder>,
        cache: Arc<GeocodeCache>,
        config: &PlannerConfig,
    ) -> Self {
        Self {
            places,
            geocoder,
            cache,
            alternative_pool: config.alternative_pool,
            alternatives_kept: config.alternatives_kept,
        }
    }

    #[instrument(skip(self, stop, waypoints), fields(day = stop.day_index))]
    pub async fn resolve<S: AsRef<str>>(
        &self,
        stop: &StopPoint,
        radius_m: f64,
        waypoints: &[S],
    ) -> Resolution {
        let location = stop.location();
        let localities = self
            .nearby(&location, radius_m, PlaceType::Locality)
            .await
            .unwrap_or_default();

        let (chosen, source) = match localities.first() {
            Some(place) => (Some(place.clone()), ResolutionSource::Locality),
            None => self.fallback(&location, radius_m).await,
        };

        let city_name = chosen.as_ref().map(|p| p.name.clone());
        let city_coords = chosen.as_ref().map(|p| p.location);

        let is_manual = stop.is_manual_waypoint
            || city_name
                .as_deref()
                .map(|name| match_manual(name, waypoints).is_manual())
                .unwrap_or(false);

        let alternatives = if is_manual {
            Vec::new()
        } else {
            self.rank_alternatives(stop, &localities)
        };

        match &city_name {
            Some(name) => debug!(
                source = %source,
                manual = is_manual,
                alternatives = alternatives.len(),
                "Stop {} resolved to {}",
                stop.day_index, name
            ),
            None => warn!(
                "Every lookup failed for stop {} at {}",
                stop.day_index, location
            ),
        }

        Resolution {
            city_name,
            city_coords,
            is_manual,
            alternatives,
            source,
        }
    }

    async fn fallback(
        &self,
        location: &GeoPoint,
        radius_m: f64,
    ) -> (Option<PlaceResult>, ResolutionSource) {
        let lodging = self
            .nearby(location, radius_m, PlaceType::Lodging)
            .await
            .unwrap_or_default()
            .into_iter()
            .find(PlaceResult::is_operational);
        if let Some(place) = lodging {
            return (Some(place), ResolutionSource::Lodging);
        }

        match self.reverse(location).await.and_then(|r| r.into_iter().next()) {
            Some(place) => (Some(place), ResolutionSource::ReverseGeocode),
            None => (None, ResolutionSource::Unresolved),
        }
    }

    /// Cached nearby search; `None` when the remote call failed
    async fn nearby(
        &self,
        location: &GeoPoint,
        radius_m: f64,
        place_type: PlaceType,
    ) -> Option<Vec<PlaceResult>> {
        let query = format!("nearby:{}:{:.0}", place_type, radius_m);
        if let Some(cached) = self.cache.get(&query, location).await {
            return Some(cached);
        }

        match self.places.nearby_search(location, radius_m, place_type).await {
            Ok(results) => {
                self.cache.put(&query, location, &results).await;
                Some(results)
            }
            Err(e) => {
                warn!(
                    place_type = %place_type,
                    "Nearby search around {} failed: {}",
                    location, e
                );
                None
            }
        }
    }

    /// Cached reverse geocode, reduced to at most one settlement
    async fn reverse(&self, location: &GeoPoint) -> Option<Vec<PlaceResult>> {
        if let Some(cached) = self.cache.get(REVERSE_GEOCODE_QUERY, location).await {
            return Some(cached);
        }

        match self.geocoder.reverse_geocode(location).await {
            Ok(results) => {
                let settlement: Vec<PlaceResult> = results
                    .iter()
                    .find_map(|r| r.settlement_name())
                    .map(|name| PlaceResult::new(name, *location))
                    .into_iter()
                    .collect();
                self.cache
                    .put(REVERSE_GEOCODE_QUERY, location, &settlement)
                    .await;
                Some(settlement)
            }
            Err(e) => {
                warn!("Reverse geocode of {} failed: {}", location, e);
                None
            }
        }
    }

    /// Scores the raw locality results around a stop, best first
    fn rank_alternatives(&self, stop: &StopPoint, localities: &[PlaceResult]) -> Vec<Alternative> {
        let location = stop.location();
        let mut alternatives: Vec<Alternative> = localities
            .iter()
            .take(self.alternative_pool)
            .map(|place| {
                let from_stop_km = location.distance_to(&place.location);
                let rating = place.rating.unwrap_or(0.0);
                let review_count = place.user_ratings_total.unwrap_or(0);
                Alternative {
                    name: place.name.clone(),
                    lat: place.location.lat,
                    lng: place.location.lng,
                    rating,
                    review_count,
                    vicinity: place.vicinity.clone(),
                    distance_from_origin_km: stop.distance_from_origin_km + from_stop_km,
                    score: Alternative::score(rating, review_count, from_stop_km),
                }
            })
            .collect();

        alternatives.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        alternatives.truncate(self.alternatives_kept);
        alternatives
    }
}
