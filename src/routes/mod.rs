pub mod debug;
pub mod trips;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/trips/plan", post(trips::plan_trip))
        .route("/trips/itinerary", post(trips::build_itinerary))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
