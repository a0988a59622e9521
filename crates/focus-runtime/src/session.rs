//! Typed access to the session record.

use std::collections::HashMap;
use std::sync::Arc;

use focus_protocols::types::now_millis;
use focus_protocols::{keys, GoalAnalysis, KeyValueStore, SessionState, StoreError};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Reads and writes the session keys.
///
/// Holds no state of its own: every read goes back to the store, so the
/// result reflects the latest write from any context.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Current session state; missing keys read as defaults.
    pub async fn load(&self) -> Result<SessionState, StoreError> {
        let entries = self.store.get(&keys::SESSION_RECORD).await?;
        Ok(SessionState::from_entries(&entries))
    }

    /// Write the session record for `goal`, stamped now.
    pub async fn start_session(&self, goal: &str) -> Result<SessionState, StoreError> {
        let started_at = now_millis();
        let items = HashMap::from([
            (keys::IS_ACTIVE.to_string(), json!(true)),
            (keys::USER_GOAL.to_string(), json!(goal)),
            (keys::SESSION_START_TIME.to_string(), json!(started_at)),
            (keys::IS_SESSION_ACTIVE.to_string(), json!(true)),
        ]);
        self.store.set(items).await?;
        info!("Session started: {}", goal);
        self.load().await
    }

    /// Erase the session record, the analysis and every transcript and draft,
    /// in a single store call.
    pub async fn stop_session(&self) -> Result<(), StoreError> {
        let stop_keys = keys::session_stop_keys();
        let refs: Vec<&str> = stop_keys.iter().map(String::as_str).collect();
        self.store.remove(&refs).await?;
        info!("Session stopped, {} keys removed", refs.len());
        Ok(())
    }

    pub async fn set_active(&self, active: bool) -> Result<(), StoreError> {
        debug!("isActive <- {}", active);
        self.store
            .set(HashMap::from([(keys::IS_ACTIVE.to_string(), Value::Bool(active))]))
            .await
    }

    pub async fn save_analysis(&self, analysis: &GoalAnalysis) -> Result<(), StoreError> {
        let value = serde_json::to_value(analysis)?;
        self.store
            .set(HashMap::from([
                (keys::AI_ANALYSIS.to_string(), value),
                (keys::GOAL_PROCESSED.to_string(), json!(true)),
            ]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use focus_protocols::SurfaceKind;

    fn repo() -> SessionRepository {
        SessionRepository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_fresh_store_reads_defaults() {
        let state = repo().load().await.unwrap();
        assert_eq!(state, SessionState::default());
    }

    #[tokio::test]
    async fn test_start_writes_record() {
        let repo = repo();
        let state = repo.start_session("learn Spanish").await.unwrap();
        assert!(state.has_active_session());
        assert!(state.is_active);
        assert_eq!(state.user_goal, "learn Spanish");
        assert!(state.session_start_time.is_some());
    }

    #[tokio::test]
    async fn test_stop_removes_every_session_and_chat_key() {
        let repo = repo();
        repo.start_session("learn Spanish").await.unwrap();
        repo.save_analysis(&GoalAnalysis::fallback("learn Spanish"))
            .await
            .unwrap();
        let mut chat = HashMap::new();
        for surface in SurfaceKind::ALL {
            chat.insert(surface.transcript_key(), json!([]));
            chat.insert(surface.draft_key(), json!({"goal": "x"}));
        }
        chat.insert(keys::CHAT_HISTORY.to_string(), json!([]));
        chat.insert("unrelated".to_string(), json!(1));
        repo.store().set(chat).await.unwrap();

        repo.stop_session().await.unwrap();

        let remaining = repo.store().get_all().await.unwrap();
        assert_eq!(remaining.len(), 1, "left over: {:?}", remaining.keys());
        assert!(remaining.contains_key("unrelated"));
        let state = repo.load().await.unwrap();
        assert!(!state.is_active);
        assert_eq!(state.user_goal, "");
        assert!(state.session_start_time.is_none());
    }

    #[tokio::test]
    async fn test_save_analysis_marks_processed() {
        let repo = repo();
        repo.save_analysis(&GoalAnalysis::fallback("g")).await.unwrap();
        let state = repo.load().await.unwrap();
        assert_eq!(state.ai_analysis.unwrap().activity_type, "general");
        let processed = repo.store().get(&[keys::GOAL_PROCESSED]).await.unwrap();
        assert_eq!(processed[keys::GOAL_PROCESSED], json!(true));
    }

    #[tokio::test]
    async fn test_set_active() {
        let repo = repo();
        repo.set_active(true).await.unwrap();
        assert!(repo.load().await.unwrap().is_active);
        repo.set_active(false).await.unwrap();
        assert!(!repo.load().await.unwrap().is_active);
    }
}
