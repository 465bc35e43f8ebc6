use crate::models::{BaseDayPlan, GeoPoint};
use crate::services::providers::DirectionsRoute;
use crate::services::segmentation::cut_points;
use tracing::debug;

/// Day-by-day plan along a directions route.
///
/// Every leg ends at a manual waypoint (or the destination for the last leg)
/// and is further split every `max_km_per_day` with the segmentation walker.
/// Days ending at an intermediate cut are named by their coordinates until
/// the resolver finds a city for them.
pub fn build_base_plan<S: AsRef<str>>(
    route: &DirectionsRoute,
    origin: &str,
    destination: &str,
    waypoints: &[S],
    max_km_per_day: f64,
) -> Vec<BaseDayPlan> {
    let mut plan = Vec::new();
    let mut from = origin.to_string();
    let leg_count = route.legs.len();

    for (i, leg) in route.legs.iter().enumerate() {
        let leg_end = if i + 1 == leg_count {
            destination.to_string()
        } else {
            waypoints
                .get(i)
                .map(|w| w.as_ref().to_string())
                .unwrap_or_else(|| destination.to_string())
        };

        let mut from_coords = leg.path.first().copied();
        let mut driven_km = 0.0;

        for cut in cut_points(&leg.path, max_km_per_day) {
            let vertex: GeoPoint = leg.path[cut.index];
            let to = vertex.to_string();
            plan.push(BaseDayPlan {
                day_index: plan.len() as u32 + 1,
                from: from.clone(),
                to: to.clone(),
                distance_km: cut.segment.to_km().as_km(),
                from_coords,
                to_coords: Some(vertex),
            });
            driven_km = cut.cumulative.to_km().as_km();
            from = to;
            from_coords = Some(vertex);
        }

        plan.push(BaseDayPlan {
            day_index: plan.len() as u32 + 1,
            from: from.clone(),
            to: leg_end.clone(),
            distance_km: (leg.distance_km() - driven_km).max(0.0),
            from_coords,
            to_coords: leg.path.last().copied(),
        });
        from = leg_end;
    }

    debug!(
        legs = leg_count,
        days = plan.len(),
        "Base plan: {} days over {} legs",
        plan.len(),
        leg_count
    );

    plan
}
