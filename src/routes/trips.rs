use crate::error::{AppError, Result};
use crate::models::{ItineraryRequest, ItineraryResponse, PlanRequest, PlanResponse};
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /trips/plan
/// Route, split into days, name every overnight stop and lay out the calendar
pub async fn plan_trip(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanResponse>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    tracing::info!(
        origin = %request.origin,
        destination = %request.destination,
        waypoints = request.waypoints.len(),
        max_km_per_day = request.max_km_per_day,
        "Trip plan request: {} -> {}, {} waypoints, {:.0}km/day",
        request.origin, request.destination,
        request.waypoints.len(), request.max_km_per_day
    );

    let response = state.planner.plan_once(&request).await?;

    tracing::info!(
        stops = response.stops.len(),
        days = response.days.len(),
        "Trip planned: {} stops, {} days, {:.1}km",
        response.stops.len(),
        response.days.len(),
        response.total_distance_km
    );

    Ok(Json(response))
}

/// POST /trips/itinerary
/// Re-lay the calendar of an existing plan, e.g. after adding stay days
pub async fn build_itinerary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ItineraryRequest>,
) -> Json<ItineraryResponse> {
    let days = state.planner.reassemble(&request);
    tracing::debug!(
        days = days.len(),
        extra_days = request.extra_days.total(),
        "Itinerary reassembled"
    );
    Json(ItineraryResponse { days })
}
