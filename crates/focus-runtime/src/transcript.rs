//! Per-surface chat transcript.

use std::collections::HashMap;
use std::sync::Arc;

use focus_protocols::{KeyValueStore, StoreError, SurfaceKind, TranscriptEntry};
use serde_json::Value;
use tracing::warn;

/// Append-only transcript of one chat surface.
#[derive(Clone)]
pub struct TranscriptLog {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl TranscriptLog {
    pub fn new(store: Arc<dyn KeyValueStore>, surface: SurfaceKind) -> Self {
        Self {
            store,
            key: surface.transcript_key(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored entries, oldest first. An unreadable list counts as empty.
    pub async fn load(&self) -> Result<Vec<TranscriptEntry>, StoreError> {
        let mut entries = self.store.get(&[self.key.as_str()]).await?;
        Ok(match entries.remove(&self.key) {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Discarding unreadable transcript {}: {}", self.key, e);
                Vec::new()
            }),
            None => Vec::new(),
        })
    }

    /// Append one entry to what is currently stored and return the new list.
    pub async fn append(&self, entry: TranscriptEntry) -> Result<Vec<TranscriptEntry>, StoreError> {
        let mut entries = self.load().await?;
        entries.push(entry);
        self.replace(&entries).await?;
        Ok(entries)
    }

    pub async fn replace(&self, entries: &[TranscriptEntry]) -> Result<(), StoreError> {
        let value: Value = serde_json::to_value(entries)?;
        self.store
            .set(HashMap::from([(self.key.clone(), value)]))
            .await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&[self.key.as_str()]).await
    }
}
