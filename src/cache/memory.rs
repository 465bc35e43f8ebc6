use crate::cache::{CacheSnapshot, PersistentStore};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Persistent-tier stand-in that lives only as long as the process.
///
/// Used when neither Redis nor a cache file is configured. An optional byte
/// quota mimics a bounded physical store: saves that would exceed it fail.
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
    quota_bytes: Option<usize>,
    loads: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            blob: Mutex::new(None),
            quota_bytes: None,
            loads: AtomicU64::new(0),
        }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        MemoryStore {
            quota_bytes: Some(quota_bytes),
            ..Self::new()
        }
    }

    /// How many times the persistent object has been read
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn load(&self) -> Result<CacheSnapshot> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        match self.blob.lock().await.as_deref() {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(CacheSnapshot::new()),
        }
    }

    async fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        if let Some(quota) = self.quota_bytes {
            if json.len() > quota {
                return Err(AppError::Cache(format!(
                    "Quota exceeded: {} bytes > {} bytes",
                    json.len(),
                    quota
                )));
            }
        }
        *self.blob.lock().await = Some(json);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.blob.lock().await = None;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedQuery;

    fn snapshot() -> CacheSnapshot {
        let mut snapshot = CacheSnapshot::new();
        snapshot.insert(
            "locality_40.4168_-3.7038".to_string(),
            CachedQuery {
                query: "locality".to_string(),
                center_lat: 40.4168,
                center_lng: -3.7038,
                results: vec![],
                timestamp: 1,
            },
        );
        snapshot
    }

    #[tokio::test]
    async fn empty_store_loads_empty_snapshot() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_empty());
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = MemoryStore::new();
        store.save(&snapshot()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), snapshot());
    }

    #[tokio::test]
    async fn quota_rejects_large_saves() {
        let store = MemoryStore::with_quota(8);
        assert!(store.save(&snapshot()).await.is_err());
        assert!(store.save(&CacheSnapshot::new()).await.is_ok());
    }

    #[tokio::test]
    async fn backend_name_is_memory() {
        assert_eq!(MemoryStore::new().backend_name(), "memory");
        assert!(MemoryStore::new().health_check().await);
    }
}
