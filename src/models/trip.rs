use crate::constants::{
    ALTERNATIVE_MIN_DISTANCE_KM, MAX_KM_PER_DAY, MAX_MANUAL_WAYPOINTS, MIN_KM_PER_DAY,
};
use crate::models::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use time::Date;
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Heuristic check applied to free-text addresses before any remote call:
/// at least 5 characters and a comma ("City, Country").
pub fn is_plausible_address(address: &str) -> bool {
    let trimmed = address.trim();
    trimmed.chars().count() >= 5 && trimmed.contains(',')
}

/// One day of the coarse plan produced from the directions route
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseDayPlan {
    pub day_index: u32,
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_coords: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_coords: Option<GeoPoint>,
}

/// Candidate overnight city offered instead of the resolved one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alternative {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: f64,
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    pub distance_from_origin_km: f64,
    pub score: f64,
}

impl Alternative {
    /// `rating × reviews / max(distance, 0.1)`; unreviewed places score 0
    pub fn score(rating: f64, review_count: u32, distance_from_stop_km: f64) -> f64 {
        if review_count == 0 {
            return 0.0;
        }
        rating * f64::from(review_count) / distance_from_stop_km.max(ALTERNATIVE_MIN_DISTANCE_KM)
    }
}

/// A day boundary along the route.
///
/// Created by the segmentation walker; name, alternatives and routed
/// distance are filled in later, by index, by the resolution pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopPoint {
    pub lat: f64,
    pub lng: f64,
    pub day_index: u32,
    /// Path distance driven since the previous stop
    pub segment_distance_km: f64,
    /// Tactical distance from the trip origin, accumulated by the walker
    #[serde(default)]
    pub distance_from_origin_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_coords: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routed_distance_from_origin_km: Option<f64>,
    #[serde(default)]
    pub is_manual_waypoint: bool,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

impl StopPoint {
    pub fn new(
        location: GeoPoint,
        day_index: u32,
        segment_distance_km: f64,
        distance_from_origin_km: f64,
    ) -> Self {
        StopPoint {
            lat: location.lat,
            lng: location.lng,
            day_index,
            segment_distance_km,
            distance_from_origin_km,
            city_name: None,
            city_coords: None,
            routed_distance_from_origin_km: None,
            is_manual_waypoint: false,
            alternatives: Vec::new(),
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }

    /// Resolved city name, or `Day N` when every lookup failed
    pub fn label(&self) -> String {
        match &self.city_name {
            Some(name) => name.clone(),
            None => format!("Day {}", self.day_index),
        }
    }
}

/// Ordered, user-editable list of mandatory overnight stops
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ManualWaypoints(Vec<String>);

impl ManualWaypoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, place: impl Into<String>) -> Result<(), String> {
        let place = place.into();
        if place.trim().is_empty() {
            return Err("Waypoint cannot be empty".to_string());
        }
        if self.0.len() >= MAX_MANUAL_WAYPOINTS {
            return Err(format!(
                "At most {} waypoints are allowed",
                MAX_MANUAL_WAYPOINTS
            ));
        }
        self.0.push(place);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    /// Returns `false` when the entry is already first (or out of range)
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.0.len() {
            return false;
        }
        self.0.swap(index - 1, index);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.0.len() {
            return false;
        }
        self.0.swap(index, index + 1);
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.0.len() > MAX_MANUAL_WAYPOINTS {
            return Err(format!(
                "At most {} waypoints are allowed, got {}",
                MAX_MANUAL_WAYPOINTS,
                self.0.len()
            ));
        }
        if self.0.iter().any(|w| w.trim().is_empty()) {
            return Err("Waypoints cannot be empty".to_string());
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for ManualWaypoints {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ManualWaypoints(iter.into_iter().map(Into::into).collect())
    }
}

/// Extra stay days requested per city. Only ever grows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ExtraDaysMap(BTreeMap<String, u32>);

impl ExtraDaysMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one stay day and returns the new count for that city
    pub fn increment(&mut self, city: impl Into<String>) -> u32 {
        let count = self.0.entry(city.into()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn get(&self, city: &str) -> u32 {
        self.0.get(city).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for ExtraDaysMap {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        ExtraDaysMap(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Driving,
    Stay,
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayType::Driving => write!(f, "driving"),
            DayType::Stay => write!(f, "stay"),
        }
    }
}

/// One calendar day of the final itinerary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DynamicDay {
    pub day_number: u32,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(rename = "type")]
    pub day_type: DayType,
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub city_name: String,
    pub is_manual_waypoint: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<GeoPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub waypoints: ManualWaypoints,
    pub max_km_per_day: f64,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(default)]
    pub extra_days: ExtraDaysMap,
}

impl PlanRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !is_plausible_address(&self.origin) {
            return Err(format!(
                "Origin '{}' must look like 'City, Country'",
                self.origin
            ));
        }
        if !is_plausible_address(&self.destination) {
            return Err(format!(
                "Destination '{}' must look like 'City, Country'",
                self.destination
            ));
        }
        if !(MIN_KM_PER_DAY..=MAX_KM_PER_DAY).contains(&self.max_km_per_day) {
            return Err(format!(
                "max_km_per_day must be between {} and {}",
                MIN_KM_PER_DAY, MAX_KM_PER_DAY
            ));
        }
        self.waypoints.validate()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub id: Uuid,
    pub generation: u64,
    pub search_radius_m: f64,
    pub total_distance_km: f64,
    pub base_plan: Vec<BaseDayPlan>,
    pub stops: Vec<StopPoint>,
    pub days: Vec<DynamicDay>,
}

/// Re-assembly request: no remote lookups, only the pure assembler
#[derive(Debug, Clone, Deserialize)]
pub struct ItineraryRequest {
    pub origin: String,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    pub base_plan: Vec<BaseDayPlan>,
    #[serde(default)]
    pub stops: Vec<StopPoint>,
    #[serde(default)]
    pub extra_days: ExtraDaysMap,
}

impl ItineraryRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !is_plausible_address(&self.origin) {
            return Err(format!(
                "Origin '{}' must look like 'City, Country'",
                self.origin
            ));
        }
        for stop in &self.stops {
            GeoPoint::new(stop.lat, stop.lng)
                .map_err(|e| format!("Stop for day {}: {}", stop.day_index, e))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItineraryResponse {
    pub days: Vec<DynamicDay>,
}
