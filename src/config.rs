use crate::constants::*;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub maps_api_key: String,
    /// Override for the Maps web-service root (proxies, test servers)
    pub maps_base_url: Option<String>,
    /// Persistent cache tier in Redis when set
    pub redis_url: Option<String>,
    /// Persistent cache tier in a JSON file when set (and Redis is not)
    pub geocode_cache_file: Option<PathBuf>,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Meters of place-search radius per km of daily driving
    pub search_radius_factor: f64,

    /// Lower clamp for the place-search radius, meters
    pub min_search_radius_m: f64,

    /// Upper clamp for the place-search radius, meters
    pub max_search_radius_m: f64,

    /// Raw locality results considered when ranking alternatives
    pub alternative_pool: usize,

    /// Alternatives kept per stop
    pub alternatives_kept: usize,

    /// Age at which persisted geocoding entries are discarded
    pub geocode_cache_ttl_days: u64,

    /// Capacity of the in-process cache tier
    pub ephemeral_cache_max_entries: u64,

    /// Quiet period before a superseding recomputation starts
    pub debounce_ms: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            search_radius_factor: DEFAULT_SEARCH_RADIUS_FACTOR,
            min_search_radius_m: DEFAULT_MIN_SEARCH_RADIUS_M,
            max_search_radius_m: DEFAULT_MAX_SEARCH_RADIUS_M,
            alternative_pool: DEFAULT_ALTERNATIVE_POOL,
            alternatives_kept: DEFAULT_ALTERNATIVES_KEPT,
            geocode_cache_ttl_days: DEFAULT_GEOCODE_CACHE_TTL_DAYS,
            ephemeral_cache_max_entries: DEFAULT_EPHEMERAL_CACHE_MAX_ENTRIES,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            search_radius_factor: env::var("PLANNER_SEARCH_RADIUS_FACTOR")
                .unwrap_or_else(|_| defaults.search_radius_factor.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_SEARCH_RADIUS_FACTOR")?,

            min_search_radius_m: env::var("PLANNER_MIN_SEARCH_RADIUS_M")
                .unwrap_or_else(|_| defaults.min_search_radius_m.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_MIN_SEARCH_RADIUS_M")?,

            max_search_radius_m: env::var("PLANNER_MAX_SEARCH_RADIUS_M")
                .unwrap_or_else(|_| defaults.max_search_radius_m.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_MAX_SEARCH_RADIUS_M")?,

            alternative_pool: env::var("PLANNER_ALTERNATIVE_POOL")
                .unwrap_or_else(|_| defaults.alternative_pool.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_ALTERNATIVE_POOL")?,

            alternatives_kept: env::var("PLANNER_ALTERNATIVES_KEPT")
                .unwrap_or_else(|_| defaults.alternatives_kept.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_ALTERNATIVES_KEPT")?,

            geocode_cache_ttl_days: env::var("GEOCODE_CACHE_TTL_DAYS")
                .unwrap_or_else(|_| defaults.geocode_cache_ttl_days.to_string())
                .parse()
                .map_err(|_| "Invalid GEOCODE_CACHE_TTL_DAYS")?,

            ephemeral_cache_max_entries: env::var("GEOCODE_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| defaults.ephemeral_cache_max_entries.to_string())
                .parse()
                .map_err(|_| "Invalid GEOCODE_CACHE_MAX_ENTRIES")?,

            debounce_ms: env::var("PLANNER_DEBOUNCE_MS")
                .unwrap_or_else(|_| defaults.debounce_ms.to_string())
                .parse()
                .map_err(|_| "Invalid PLANNER_DEBOUNCE_MS")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_search_radius_m <= 0.0 || self.min_search_radius_m > self.max_search_radius_m
        {
            return Err(format!(
                "Search radius bounds are inconsistent: min {} / max {}",
                self.min_search_radius_m, self.max_search_radius_m
            ));
        }
        if self.alternatives_kept > self.alternative_pool {
            return Err(
                "PLANNER_ALTERNATIVES_KEPT cannot exceed PLANNER_ALTERNATIVE_POOL".to_string(),
            );
        }
        if self.geocode_cache_ttl_days == 0 {
            return Err("GEOCODE_CACHE_TTL_DAYS must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn geocode_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.geocode_cache_ttl_days * 86_400)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            maps_api_key: env::var("GOOGLE_MAPS_API_KEY")
                .map_err(|_| "GOOGLE_MAPS_API_KEY must be set")?,
            maps_base_url: env::var("MAPS_BASE_URL").ok(),
            redis_url: env::var("REDIS_URL").ok(),
            geocode_cache_file: env::var("GEOCODE_CACHE_FILE").ok().map(PathBuf::from),
            planner: PlannerConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
