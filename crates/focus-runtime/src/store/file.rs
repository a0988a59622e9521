//! File-backed store implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use focus_protocols::{KeyValueStore, StoreError};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::pick;

/// Store persisted as one JSON object on disk.
///
/// Every mutating call rewrites the whole file through a temporary sibling and
/// a rename, and only updates the in-memory copy once the file is in place.
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, Value>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing contents if any.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if tokio::fs::try_exists(&path).await? {
            let json = tokio::fs::read_to_string(&path).await?;
            if json.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&json)?
            }
        } else {
            HashMap::new()
        };
        info!("Opened file store {:?} ({} keys)", path, entries.len());
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &HashMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted {} keys to {:?}", entries.len(), self.path);
        Ok(())
    }

    async fn mutate<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut HashMap<String, Value>),
    {
        let mut entries = self.entries.write().await;
        let mut next = entries.clone();
        apply(&mut next);
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn id(&self) -> &str {
        "file"
    }

    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        let entries = self.entries.read().await;
        Ok(pick(&entries, keys))
    }

    async fn get_all(&self) -> Result<HashMap<String, Value>, StoreError> {
        Ok(self.entries.read().await.clone())
    }

    async fn set(&self, items: HashMap<String, Value>) -> Result<(), StoreError> {
        self.mutate(|entries| entries.extend(items)).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.mutate(|entries| {
            for key in keys {
                entries.remove(*key);
            }
        })
        .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.mutate(|entries| entries.clear()).await
    }
}
