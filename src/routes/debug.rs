use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Check if services are working
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let stats = state.cache.get_stats().await;

    let mut status = json!({
        "status": "ok",
        "checks": {
            "geocode_cache": {
                "backend": stats.backend,
                "connected": stats.connected,
                "hits": stats.hits,
                "misses": stats.misses,
                "hit_rate": stats.hit_rate,
                "ephemeral_entries": stats.ephemeral_entries,
            }
        }
    });

    // The planner still works from the in-process tier alone
    if !stats.connected {
        status["status"] = json!("degraded");
    }

    Json(status)
}
