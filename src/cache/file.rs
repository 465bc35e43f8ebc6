use crate::cache::{CacheSnapshot, PersistentStore};
use crate::constants::GEOCODE_CACHE_STORAGE_KEY;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Persistent tier kept in a JSON file on local disk.
///
/// The file holds `{ "geocoding_cache": { key: CachedQuery } }` so several
/// subsystems could share one file without clobbering each other's objects.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<serde_json::Map<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(serde_json::Map::new()),
            Ok(contents) => match serde_json::from_str(&contents)? {
                Value::Object(map) => Ok(map),
                _ => Err(AppError::Cache(format!(
                    "{} does not contain a JSON object",
                    self.path.display()
                ))),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(serde_json::Map::new()),
            Err(e) => Err(AppError::Cache(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write_document(&self, document: &serde_json::Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string(document)?;
        // Write-then-rename so a crash never leaves a truncated file behind
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::Cache(format!(
                "Failed to move cache into {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl PersistentStore for FileStore {
    async fn load(&self) -> Result<CacheSnapshot> {
        let mut document = self.read_document().await?;
        match document.remove(GEOCODE_CACHE_STORAGE_KEY) {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(CacheSnapshot::new()),
        }
    }

    async fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let mut document = self.read_document().await?;
        document.insert(
            GEOCODE_CACHE_STORAGE_KEY.to_string(),
            serde_json::to_value(snapshot)?,
        );
        self.write_document(&document).await
    }

    async fn clear(&self) -> Result<()> {
        let mut document = self.read_document().await?;
        if document.remove(GEOCODE_CACHE_STORAGE_KEY).is_some() {
            self.write_document(&document).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => tokio::fs::metadata(dir).await.is_ok(),
            _ => true,
        }
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
