//! In-memory store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use focus_protocols::{KeyValueStore, StoreError};
use serde_json::Value;
use tokio::sync::RwLock;

use super::pick;

/// In-memory store. Contents are lost with the process.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn id(&self) -> &str {
        "memory"
    }

    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        let entries = self.entries.read().await;
        Ok(pick(&entries, keys))
    }

    async fn get_all(&self) -> Result<HashMap<String, Value>, StoreError> {
        Ok(self.entries.read().await.clone())
    }

    async fn set(&self, items: HashMap<String, Value>) -> Result<(), StoreError> {
        self.entries.write().await.extend(items);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }
}
