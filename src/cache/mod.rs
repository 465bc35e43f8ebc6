//! Two-tier cache for place-search and reverse-geocoding results.
//!
//! The ephemeral tier is an in-process moka cache. The persistent tier is a
//! single JSON object (`{ key: CachedQuery }`) kept by a [`PersistentStore`]
//! under a fixed storage key. The persistent tier is loaded at most once per
//! [`GeocodeCache`] and written back best-effort after every insert.

mod file;
mod memory;
mod redis_store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::constants::CACHE_KEY_COORD_PRECISION;
use crate::error::Result;
use crate::models::{GeoPoint, PlaceResult};
use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};

/// One cached lookup, in the persisted wire layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CachedQuery {
    pub query: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub results: Vec<PlaceResult>,
    /// Unix epoch milliseconds
    pub timestamp: u64,
}

impl CachedQuery {
    pub fn is_expired(&self, now_ms: u64, ttl: Duration) -> bool {
        now_ms.saturating_sub(self.timestamp) >= ttl.as_millis() as u64
    }
}

/// Full persisted object
pub type CacheSnapshot = HashMap<String, CachedQuery>;

/// Backing store for the persistent tier
#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn load(&self) -> Result<CacheSnapshot>;

    async fn save(&self, snapshot: &CacheSnapshot) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    async fn health_check(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ephemeral_entries: u64,
    pub backend: String,
    pub connected: bool,
}

/// `normalize(query)_round(lat,4)_round(lng,4)`
pub fn cache_key(query: &str, center: &GeoPoint) -> String {
    let rounded = center.round(CACHE_KEY_COORD_PRECISION);
    format!(
        "{}_{}_{}",
        normalize_query(query),
        rounded.lat,
        rounded.lng
    )
}

fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Drops every entry that reached its TTL
pub fn prune_expired(snapshot: CacheSnapshot, now_ms: u64, ttl: Duration) -> CacheSnapshot {
    snapshot
        .into_iter()
        .filter(|(_, entry)| !entry.is_expired(now_ms, ttl))
        .collect()
}

pub(crate) fn now_ms() -> u64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}

pub struct GeocodeCache {
    ephemeral: Cache<String, Arc<CachedQuery>>,
    persisted: OnceCell<Mutex<CacheSnapshot>>,
    store: Arc<dyn PersistentStore>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GeocodeCache {
    pub fn new(store: Arc<dyn PersistentStore>, ttl: Duration, max_capacity: u64) -> Self {
        let ephemeral = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();

        GeocodeCache {
            ephemeral,
            persisted: OnceCell::new(),
            store,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Loads the persistent tier if that has not happened yet and returns
    /// the number of live entries. Concurrent callers share one load.
    pub async fn load(&self) -> usize {
        self.persisted().await.lock().await.len()
    }

    async fn persisted(&self) -> &Mutex<CacheSnapshot> {
        self.persisted
            .get_or_init(|| async {
                let snapshot = match self.store.load().await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!(
                            backend = self.store.backend_name(),
                            "Failed to load persistent geocoding cache, starting empty: {}",
                            e
                        );
                        CacheSnapshot::new()
                    }
                };
                let loaded = snapshot.len();
                let live = prune_expired(snapshot, now_ms(), self.ttl);
                tracing::info!(
                    backend = self.store.backend_name(),
                    loaded,
                    expired = loaded - live.len(),
                    "Geocoding cache loaded: {} live entries ({} expired)",
                    live.len(),
                    loaded - live.len()
                );
                Mutex::new(live)
            })
            .await
    }

    /// Cached results for `(query, center)`, or `None` when the caller has to
    /// perform the real lookup and [`GeocodeCache::put`] its results.
    pub async fn get(&self, query: &str, center: &GeoPoint) -> Option<Vec<PlaceResult>> {
        let key = cache_key(query, center);

        // Promoted entries keep their original timestamp, so the moka TTL alone
        // could outlive it
        if let Some(entry) = self.ephemeral.get(&key).await {
            if !entry.is_expired(now_ms(), self.ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Geocoding cache hit (memory): {}", key);
                return Some(entry.results.clone());
            }
            self.ephemeral.invalidate(&key).await;
            tracing::debug!("Geocoding cache entry expired: {}", key);
        }

        let promoted = {
            let persisted = self.persisted().await.lock().await;
            persisted
                .get(&key)
                .filter(|entry| !entry.is_expired(now_ms(), self.ttl))
                .cloned()
        };

        match promoted {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Geocoding cache hit (persistent): {}", key);
                let results = entry.results.clone();
                self.ephemeral.insert(key, Arc::new(entry)).await;
                Some(results)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Geocoding cache miss: {}", key);
                None
            }
        }
    }

    /// Stores results in both tiers. The persistent write is best effort.
    pub async fn put(&self, query: &str, center: &GeoPoint, results: &[PlaceResult]) {
        let key = cache_key(query, center);
        let entry = CachedQuery {
            query: query.to_string(),
            center_lat: center.lat,
            center_lng: center.lng,
            results: results.to_vec(),
            timestamp: now_ms(),
        };

        self.ephemeral
            .insert(key.clone(), Arc::new(entry.clone()))
            .await;

        // Saves happen under the lock so the last write always holds every entry
        let mut persisted = self.persisted().await.lock().await;
        let now = entry.timestamp;
        persisted.retain(|_, cached| !cached.is_expired(now, self.ttl));
        persisted.insert(key.clone(), entry);

        match self.store.save(&persisted).await {
            Ok(()) => {
                tracing::debug!("Cached {} results: {}", results.len(), key);
            }
            Err(e) => {
                tracing::warn!(
                    backend = self.store.backend_name(),
                    "Failed to persist geocoding cache, keeping in memory only: {}",
                    e
                );
            }
        }
    }

    /// Empties both tiers
    pub async fn clear(&self) {
        self.ephemeral.invalidate_all();
        self.persisted().await.lock().await.clear();
        if let Err(e) = self.store.clear().await {
            tracing::warn!("Failed to clear persistent geocoding cache: {}", e);
        }
        tracing::info!("Geocoding cache cleared");
    }

    pub async fn get_stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            ephemeral_entries: self.ephemeral.entry_count(),
            backend: self.store.backend_name().to_string(),
            connected: self.store.health_check().await,
        }
    }
}
