//! Per-surface goal draft.

use std::collections::HashMap;
use std::sync::Arc;

use focus_protocols::{KeyValueStore, StoreError, SurfaceDraft, SurfaceKind};

/// The goal a surface is negotiating before a session starts.
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>, surface: SurfaceKind) -> Self {
        Self {
            store,
            key: surface.draft_key(),
        }
    }

    pub async fn load(&self) -> Result<Option<SurfaceDraft>, StoreError> {
        let mut entries = self.store.get(&[self.key.as_str()]).await?;
        Ok(entries
            .remove(&self.key)
            .and_then(|value| serde_json::from_value(value).ok()))
    }

    pub async fn save(&self, draft: &SurfaceDraft) -> Result<(), StoreError> {
        let value = serde_json::to_value(draft)?;
        self.store
            .set(HashMap::from([(self.key.clone(), value)]))
            .await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&[self.key.as_str()]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_draft_round_trip() {
        let drafts = DraftStore::new(Arc::new(MemoryStore::new()), SurfaceKind::Overlay);
        assert_eq!(drafts.load().await.unwrap(), None);

        let draft = SurfaceDraft {
            goal: Some("write thesis".to_string()),
            ready_to_start: true,
        };
        drafts.save(&draft).await.unwrap();
        assert_eq!(drafts.load().await.unwrap(), Some(draft));

        drafts.clear().await.unwrap();
        assert_eq!(drafts.load().await.unwrap(), None);
    }
}
