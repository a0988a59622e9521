//! Session state as read from the persistent store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GoalAnalysis;
use crate::store::keys;

/// Snapshot of the session keys.
///
/// Built from whatever keys are present: a half-applied start or stop seen by
/// a concurrent reader yields a well-formed value with defaults for the
/// missing pieces. Treat it as stale the moment an `await` passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_active: bool,
    pub user_goal: String,
    pub session_start_time: Option<i64>,
    pub is_session_active: bool,
    pub ai_analysis: Option<GoalAnalysis>,
}

impl SessionState {
    /// Derive the state from raw store entries.
    pub fn from_entries(entries: &HashMap<String, Value>) -> Self {
        Self {
            is_active: entries
                .get(keys::IS_ACTIVE)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            user_goal: entries
                .get(keys::USER_GOAL)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            session_start_time: entries.get(keys::SESSION_START_TIME).and_then(Value::as_i64),
            is_session_active: entries
                .get(keys::IS_SESSION_ACTIVE)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            ai_analysis: entries
                .get(keys::AI_ANALYSIS)
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
        }
    }

    /// A session counts as running only with both the flag and a goal present.
    pub fn has_active_session(&self) -> bool {
        self.is_session_active && !self.user_goal.is_empty()
    }

    /// Whole minutes since the session started, if it has.
    pub fn duration_minutes(&self, now_millis: i64) -> Option<i64> {
        self.session_start_time
            .map(|start| (now_millis - start).max(0) / 1000 / 60)
    }
}

/// Which chat surface a piece of state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    Popup,
    Overlay,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 2] = [SurfaceKind::Popup, SurfaceKind::Overlay];

    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceKind::Popup => "popup",
            SurfaceKind::Overlay => "overlay",
        }
    }

    /// Transcript key, namespaced so two surfaces never append to one log.
    pub fn transcript_key(&self) -> String {
        format!("{}.{}", keys::CHAT_HISTORY, self.as_str())
    }

    /// Key of the surface's unfinished goal draft.
    pub fn draft_key(&self) -> String {
        format!("{}.{}", keys::FOCUS_SESSION, self.as_str())
    }
}

/// Goal being negotiated on a surface before the session starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceDraft {
    pub goal: Option<String>,
    pub ready_to_start: bool,
}
