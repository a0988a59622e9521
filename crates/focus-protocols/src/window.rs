//! Window messaging between the relay, the in-page agent and the overlay.
//!
//! Every context sharing a window sees every message posted to it, so the
//! `source` tag and the correlation id are what keep conversations apart.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::{RequestId, Source};
use crate::error::TransportError;
use crate::hub::HubAction;
use crate::types::GoalAnalysis;

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;

/// Relevance request payload (relay -> agent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevancePayload {
    pub user_goal: String,
    pub page_text: String,
    pub request_id: RequestId,
}

/// Completion request payload (overlay -> relay -> agent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPayload {
    pub prompt: String,
    #[serde(alias = "messageId")]
    pub request_id: RequestId,
}

/// Window message body, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WindowAction {
    CheckRelevance {
        payload: RelevancePayload,
    },
    RelevanceResponse {
        request_id: RequestId,
        response: String,
    },
    #[serde(rename = "getAIResponse")]
    GetAiResponse {
        payload: CompletionPayload,
    },
    #[serde(rename = "aiResponse")]
    AiResponse {
        #[serde(alias = "messageId")]
        request_id: RequestId,
        response: Option<String>,
    },
    ForwardToBackground {
        payload: HubAction,
    },
    GenerateGoalResponse {
        goal: String,
        message_id: RequestId,
    },
    GoalResponseGenerated {
        message_id: RequestId,
        response: Option<String>,
    },
    AnalyzeGoal {
        goal: String,
        message_id: RequestId,
    },
    GoalAnalysisResponse {
        message_id: RequestId,
        analysis: Option<GoalAnalysis>,
    },
    GoalSubmitted {
        goal: String,
    },
    SessionStarted {
        goal: String,
    },
    SessionStopped,
    CloseOverlay,
    ProvideFocusReminder,
}

impl WindowAction {
    pub fn name(&self) -> &'static str {
        match self {
            WindowAction::CheckRelevance { .. } => "checkRelevance",
            WindowAction::RelevanceResponse { .. } => "relevanceResponse",
            WindowAction::GetAiResponse { .. } => "getAIResponse",
            WindowAction::AiResponse { .. } => "aiResponse",
            WindowAction::ForwardToBackground { .. } => "forwardToBackground",
            WindowAction::GenerateGoalResponse { .. } => "generateGoalResponse",
            WindowAction::GoalResponseGenerated { .. } => "goalResponseGenerated",
            WindowAction::AnalyzeGoal { .. } => "analyzeGoal",
            WindowAction::GoalAnalysisResponse { .. } => "goalAnalysisResponse",
            WindowAction::GoalSubmitted { .. } => "goalSubmitted",
            WindowAction::SessionStarted { .. } => "sessionStarted",
            WindowAction::SessionStopped => "sessionStopped",
            WindowAction::CloseOverlay => "closeOverlay",
            WindowAction::ProvideFocusReminder => "provideFocusReminder",
        }
    }
}

/// A tagged window message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEnvelope {
    pub source: Source,
    #[serde(flatten)]
    pub action: WindowAction,
}

impl WindowEnvelope {
    pub fn new(source: Source, action: WindowAction) -> Self {
        Self { source, action }
    }

    /// Serialize for posting; this is the structured-clone boundary.
    pub fn to_wire(&self) -> Result<Value, TransportError> {
        serde_json::to_value(self).map_err(|e| TransportError::Malformed(e.to_string()))
    }

    /// Parse a posted message. Messages from unknown sources, with unknown
    /// actions or missing fields fail here and are dropped by receivers.
    pub fn from_wire(value: &Value) -> Result<Self, TransportError> {
        Self::deserialize(value).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}
