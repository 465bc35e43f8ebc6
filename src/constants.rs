//! Stable application-wide constants.
//!
//! Values here are structural invariants, algorithm coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! For tuning knobs that benefit from runtime experimentation, see
//! [`PlannerConfig`](crate::config::PlannerConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Trip input limits ---

/// Smallest accepted daily driving distance (km).
pub const MIN_KM_PER_DAY: f64 = 50.0;
/// Largest accepted daily driving distance (km).
pub const MAX_KM_PER_DAY: f64 = 1000.0;
/// The directions provider accepts at most 25 locations per request:
/// origin + destination + 23 intermediate waypoints.
pub const MAX_MANUAL_WAYPOINTS: usize = 23;

// --- Place search radius ---
// The resolver searches around each stop with a radius proportional to the
// daily distance: tight for slow trips, broad for long daily legs.

/// Meters of search radius per km of daily driving.
pub const DEFAULT_SEARCH_RADIUS_FACTOR: f64 = 80.0;
/// Lower clamp for the search radius (meters).
pub const DEFAULT_MIN_SEARCH_RADIUS_M: f64 = 15_000.0;
/// Upper clamp for the search radius (meters).
pub const DEFAULT_MAX_SEARCH_RADIUS_M: f64 = 50_000.0;

// --- Alternative ranking ---

/// Raw locality results considered when ranking alternatives.
pub const DEFAULT_ALTERNATIVE_POOL: usize = 10;
/// Alternatives kept per stop after ranking.
pub const DEFAULT_ALTERNATIVES_KEPT: usize = 5;
/// Distances below this floor (km) are clamped when scoring alternatives,
/// so a candidate sitting on the stop does not get an infinite score.
pub const ALTERNATIVE_MIN_DISTANCE_KM: f64 = 0.1;

// --- Geocoding cache ---

/// Persistent entries older than this are dropped when the store is loaded.
pub const DEFAULT_GEOCODE_CACHE_TTL_DAYS: u64 = 30;
/// Maximum entries held by the ephemeral (in-process) tier.
pub const DEFAULT_EPHEMERAL_CACHE_MAX_ENTRIES: u64 = 10_000;
/// Fixed key under which the whole persistent cache object is stored.
pub const GEOCODE_CACHE_STORAGE_KEY: &str = "geocoding_cache";
/// Decimal places kept when rounding a lookup center into a cache key
/// (~11 m at the equator).
pub const CACHE_KEY_COORD_PRECISION: u32 = 4;

// --- Recompute debounce ---

/// Delay between the last input change and the start of a recomputation.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

// --- Remote calls ---

/// Network timeout applied to every Maps web-service request.
pub const MAPS_REQUEST_TIMEOUT_SECONDS: u64 = 15;
