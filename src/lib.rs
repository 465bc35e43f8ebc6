// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use cache::GeocodeCache;
use services::trip_planner::TripPlanner;
use std::sync::Arc;

pub struct AppState {
    pub planner: Arc<TripPlanner>,
    pub cache: Arc<GeocodeCache>,
}
