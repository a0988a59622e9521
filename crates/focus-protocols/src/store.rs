//! Persistent store protocol definitions.
//!
//! The store is the only state shared across contexts. Each call is atomic on
//! its own; a sequence of calls is not, so readers must tolerate seeing a
//! logical transition half-applied.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Core trait for key/value stores.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the store ID.
    fn id(&self) -> &str;

    /// Fetch the given keys. Missing keys are absent from the result.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError>;

    /// Fetch every entry.
    async fn get_all(&self) -> Result<HashMap<String, Value>, StoreError>;

    /// Overwrite the given entries (last write wins).
    async fn set(&self, items: HashMap<String, Value>) -> Result<(), StoreError>;

    /// Remove the given keys. Removing an absent key is not an error.
    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// Remove everything.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Storage keys.
pub mod keys {
    use crate::types::SurfaceKind;

    pub const IS_ACTIVE: &str = "isActive";
    pub const USER_GOAL: &str = "userGoal";
    pub const SESSION_START_TIME: &str = "sessionStartTime";
    pub const IS_SESSION_ACTIVE: &str = "isSessionActive";
    pub const AI_ANALYSIS: &str = "aiAnalysis";
    pub const GOAL_PROCESSED: &str = "goalProcessed";
    pub const CHAT_HISTORY: &str = "focus_chat_history";
    pub const FOCUS_SESSION: &str = "focusSession";
    pub const SUMMARY_PREFIX: &str = "aiSummary_";

    /// Keys that make up the session record read by `SessionState`.
    pub const SESSION_RECORD: [&str; 5] = [
        IS_ACTIVE,
        USER_GOAL,
        SESSION_START_TIME,
        IS_SESSION_ACTIVE,
        AI_ANALYSIS,
    ];

    /// Every key erased when a session stops: the record, the analysis flag,
    /// the legacy shared chat keys and each surface's transcript and draft.
    pub fn session_stop_keys() -> Vec<String> {
        let mut keys: Vec<String> = SESSION_RECORD.iter().map(|k| k.to_string()).collect();
        keys.push(GOAL_PROCESSED.to_string());
        keys.push(CHAT_HISTORY.to_string());
        keys.push(FOCUS_SESSION.to_string());
        for surface in SurfaceKind::ALL {
            keys.push(surface.transcript_key());
            keys.push(surface.draft_key());
        }
        keys
    }

    pub fn summary_key(message_id: &str) -> String {
        format!("{}{}", SUMMARY_PREFIX, message_id)
    }

    pub fn is_summary_key(key: &str) -> bool {
        key.starts_with(SUMMARY_PREFIX)
    }
}
