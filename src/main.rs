use axum::Router;
use roadtrip::cache::{FileStore, GeocodeCache, MemoryStore, PersistentStore, RedisStore};
use roadtrip::config::Config;
use roadtrip::services::google_maps::GoogleMapsClient;
use roadtrip::services::resolver::PlaceResolver;
use roadtrip::services::trip_planner::TripPlanner;
use roadtrip::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roadtrip=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting road-trip planner");
    tracing::info!("Configuration loaded successfully");

    // Persistent cache tier: Redis, else a JSON file, else process memory
    let store: Arc<dyn PersistentStore> = if let Some(ref redis_url) = config.redis_url {
        tracing::info!("Connecting to Redis cache...");
        match RedisStore::new(redis_url).await {
            Ok(redis_store) => {
                tracing::info!("Redis cache connection established");
                Arc::new(redis_store)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Falling back to in-memory cache.",
                    e
                );
                Arc::new(MemoryStore::new())
            }
        }
    } else if let Some(ref path) = config.geocode_cache_file {
        tracing::info!("Using geocoding cache file {}", path.display());
        Arc::new(FileStore::new(path.clone()))
    } else {
        tracing::info!("No persistent cache configured. Using in-memory cache.");
        Arc::new(MemoryStore::new())
    };

    let cache = Arc::new(GeocodeCache::new(
        store,
        config.planner.geocode_cache_ttl(),
        config.planner.ephemeral_cache_max_entries,
    ));
    let live = cache.load().await;
    tracing::info!("Geocoding cache ready with {} entries", live);

    // Initialize services
    let maps = Arc::new(match config.maps_base_url {
        Some(ref base_url) => {
            GoogleMapsClient::with_base_url(config.maps_api_key.clone(), base_url.clone())
        }
        None => GoogleMapsClient::new(config.maps_api_key.clone()),
    });
    let resolver = Arc::new(PlaceResolver::new(
        maps.clone(),
        maps.clone(),
        cache.clone(),
        &config.planner,
    ));
    let planner = Arc::new(TripPlanner::new(maps, resolver, config.planner.clone()));

    // Create application state
    let state = Arc::new(AppState { planner, cache });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", roadtrip::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
