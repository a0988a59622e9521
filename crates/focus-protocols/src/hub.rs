//! Extension messaging with the hub.
//!
//! - [`HubAction`]: requests any context sends to the hub
//! - [`HubAck`]: the immediate, one-shot transport reply
//! - [`HubNotice`]: follow-up messages the hub pushes to a context later

use serde::{Deserialize, Serialize};

use crate::envelope::RequestId;
use crate::types::GoalAnalysis;

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;

/// Hub-bound request, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HubAction {
    Activate,
    Deactivate,
    GetState,
    GoalSubmitted {
        goal: String,
    },
    AnalyzeGoal {
        goal: String,
        message_id: RequestId,
    },
    SessionStarted {
        goal: String,
    },
    SessionStopped,
    #[serde(rename = "generateAISummary")]
    GenerateAiSummary {
        prompt: String,
        message_id: RequestId,
    },
    PerformRelevanceCheck {
        prompt: String,
        request_id: RequestId,
    },
    #[serde(rename = "performAIResponse")]
    PerformAiResponse {
        prompt: String,
        request_id: RequestId,
    },
}

impl HubAction {
    /// Wire name of the action, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            HubAction::Activate => "activate",
            HubAction::Deactivate => "deactivate",
            HubAction::GetState => "getState",
            HubAction::GoalSubmitted { .. } => "goalSubmitted",
            HubAction::AnalyzeGoal { .. } => "analyzeGoal",
            HubAction::SessionStarted { .. } => "sessionStarted",
            HubAction::SessionStopped => "sessionStopped",
            HubAction::GenerateAiSummary { .. } => "generateAISummary",
            HubAction::PerformRelevanceCheck { .. } => "performRelevanceCheck",
            HubAction::PerformAiResponse { .. } => "performAIResponse",
        }
    }
}

/// Immediate acknowledgement returned through the transport callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HubAck {
    pub fn ok() -> Self {
        Self {
            success: Some(true),
            ..Self::default()
        }
    }

    pub fn state(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn unknown_action() -> Self {
        Self::error("Unknown action")
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Follow-up message pushed by the hub to a tab or the popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HubNotice {
    SessionStarted {
        goal: String,
    },
    SessionStopped,
    GoalAnalyzed {
        goal: String,
        analysis: GoalAnalysis,
        message_id: RequestId,
    },
    RelevanceCheckResponse {
        request_id: RequestId,
        response: String,
    },
    AiResponseResponse {
        request_id: RequestId,
        response: Option<String>,
    },
}

impl HubNotice {
    pub fn name(&self) -> &'static str {
        match self {
            HubNotice::SessionStarted { .. } => "sessionStarted",
            HubNotice::SessionStopped => "sessionStopped",
            HubNotice::GoalAnalyzed { .. } => "goalAnalyzed",
            HubNotice::RelevanceCheckResponse { .. } => "relevanceCheckResponse",
            HubNotice::AiResponseResponse { .. } => "aiResponseResponse",
        }
    }
}
