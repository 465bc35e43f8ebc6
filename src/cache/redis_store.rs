use crate::cache::{CacheSnapshot, PersistentStore};
use crate::constants::GEOCODE_CACHE_STORAGE_KEY;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Redis-backed persistent tier. The whole cache object is one string value
/// under a fixed key; entry expiry is handled on load, not by Redis TTLs.
///
/// `ConnectionManager` is `Arc`-based internally, so `.clone()` is a cheap
/// atomic increment.
pub struct RedisStore {
    connection: ConnectionManager,
    key: String,
}

impl RedisStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!("Redis cache connection established");

        Ok(RedisStore {
            connection,
            key: GEOCODE_CACHE_STORAGE_KEY.to_string(),
        })
    }
}

#[async_trait]
impl PersistentStore for RedisStore {
    async fn load(&self) -> Result<CacheSnapshot> {
        let mut conn = self.connection.clone();
        let json: Option<String> = conn.get(&self.key).await?;

        match json {
            Some(json) => {
                let snapshot: CacheSnapshot = serde_json::from_str(&json)?;
                tracing::debug!("Loaded {} geocoding entries from Redis", snapshot.len());
                Ok(snapshot)
            }
            None => {
                tracing::debug!("No geocoding cache stored in Redis yet");
                Ok(CacheSnapshot::new())
            }
        }
    }

    async fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        let mut conn = self.connection.clone();
        let () = conn.set(&self.key, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        let () = conn.del(&self.key).await?;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        result.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
