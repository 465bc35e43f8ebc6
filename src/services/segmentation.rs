//! Cutting a driving path into day-sized segments.
//!
//! Plain mode walks the path vertex by vertex and cuts every `max_km_per_day`,
//! so each stop is a literal vertex of the road geometry. Hybrid mode (manual
//! waypoints present) follows the base day plan instead: automatic stops are
//! snapped onto the nearest path vertex, manual stops keep the coordinates
//! the directions provider gave for them.

use crate::config::PlannerConfig;
use crate::models::{BaseDayPlan, DistanceKm, DistanceMeters, GeoPoint, StopPoint};
use crate::services::geometry::{nearest_vertex, path_length};
use crate::services::waypoints::is_manual;
use tracing::{debug, instrument, warn};

/// A vertex where a day ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cut {
    pub index: usize,
    /// Distance since the previous cut (or the path start)
    pub segment: DistanceMeters,
    /// Distance from the path start
    pub cumulative: DistanceMeters,
}

/// Vertices at which accumulated distance first reaches the daily limit.
///
/// The final vertex is the destination and is never a cut.
pub fn cut_points(path: &[GeoPoint], max_km_per_day: f64) -> Vec<Cut> {
    if path.len() < 2 || !max_km_per_day.is_finite() || max_km_per_day <= 0.0 {
        return Vec::new();
    }

    let threshold = DistanceKm(max_km_per_day).to_meters();
    let last = path.len() - 1;
    let mut cuts = Vec::new();
    let mut since_cut = DistanceMeters::default();
    let mut cumulative = DistanceMeters::default();

    for i in 1..last {
        let edge = DistanceMeters(path[i - 1].distance_m(&path[i]));
        since_cut += edge;
        cumulative += edge;

        if since_cut >= threshold {
            cuts.push(Cut {
                index: i,
                segment: since_cut,
                cumulative,
            });
            since_cut = DistanceMeters::default();
        }
    }

    cuts
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Intermediate overnight stops; the destination is not included
    pub stops: Vec<StopPoint>,
    pub total_distance_km: f64,
}

impl Segmentation {
    /// Distance of the last day, from the last stop to the destination
    pub fn final_leg_km(&self) -> f64 {
        let driven = self
            .stops
            .last()
            .map(|s| s.distance_from_origin_km)
            .unwrap_or(0.0);
        (self.total_distance_km - driven).max(0.0)
    }
}

/// Plain mode: one stop every `max_km_per_day` along the path
#[instrument(skip(path), fields(points = path.len()))]
pub fn segment_path(path: &[GeoPoint], max_km_per_day: f64) -> Segmentation {
    let stops: Vec<StopPoint> = cut_points(path, max_km_per_day)
        .into_iter()
        .enumerate()
        .map(|(day, cut)| {
            StopPoint::new(
                path[cut.index],
                day as u32 + 1,
                cut.segment.to_km().as_km(),
                cut.cumulative.to_km().as_km(),
            )
        })
        .collect();

    let total = path_length(path).to_km();
    debug!(
        stops = stops.len(),
        total_km = %total,
        "Cut {} stops along {}",
        stops.len(),
        total
    );

    Segmentation {
        stops,
        total_distance_km: total.as_km(),
    }
}

/// Hybrid mode: one stop per non-final base plan day.
///
/// Entries whose `to` matches a manual waypoint keep the provider's
/// coordinates; every other stop is snapped to the nearest path vertex.
#[instrument(skip_all, fields(days = base_plan.len(), waypoints = waypoints.len()))]
pub fn segment_hybrid<S: AsRef<str>>(
    base_plan: &[BaseDayPlan],
    path: &[GeoPoint],
    waypoints: &[S],
) -> Segmentation {
    let total_distance_km: f64 = base_plan.iter().map(|d| d.distance_km).sum();
    let driving_days = base_plan.len().saturating_sub(1);
    let mut stops = Vec::with_capacity(driving_days);
    let mut cumulative_km = 0.0;

    for day in &base_plan[..driving_days] {
        cumulative_km += day.distance_km;

        let Some(target) = day.to_coords else {
            warn!(
                day = day.day_index,
                to = %day.to,
                "Base plan day has no coordinates, no stop created"
            );
            continue;
        };

        let manual = is_manual(&day.to, waypoints);
        let location = if manual {
            target
        } else {
            nearest_vertex(path, &target)
                .map(|(_, vertex)| vertex)
                .unwrap_or(target)
        };

        let mut stop = StopPoint::new(location, day.day_index, day.distance_km, cumulative_km);
        stop.is_manual_waypoint = manual;
        stops.push(stop);
    }

    debug!(
        stops = stops.len(),
        manual = stops.iter().filter(|s| s.is_manual_waypoint).count(),
        "Hybrid segmentation produced {} stops",
        stops.len()
    );

    Segmentation {
        stops,
        total_distance_km,
    }
}

/// Place-search radius in meters, scaled with the daily distance
pub fn search_radius_m(max_km_per_day: f64, config: &PlannerConfig) -> f64 {
    (max_km_per_day * config.search_radius_factor)
        .clamp(config.min_search_radius_m, config.max_search_radius_m)
}
