use super::*;
use serde_json::json;

#[test]
fn test_action_tag_names() {
    let action = HubAction::PerformRelevanceCheck {
        prompt: "p".to_string(),
        request_id: RequestId::from("fp-req-1"),
    };
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["action"], "performRelevanceCheck");
    assert_eq!(json["requestId"], "fp-req-1");
    assert_eq!(json["prompt"], "p");
}

#[test]
fn test_acronym_actions_keep_original_spelling() {
    let summary = HubAction::GenerateAiSummary {
        prompt: "p".to_string(),
        message_id: RequestId::from("m1"),
    };
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["action"], "generateAISummary");
    assert_eq!(json["messageId"], "m1");

    let response = HubAction::PerformAiResponse {
        prompt: "p".to_string(),
        request_id: RequestId::from("r1"),
    };
    assert_eq!(serde_json::to_value(&response).unwrap()["action"], "performAIResponse");
}

#[test]
fn test_unit_actions_deserialize() {
    let action: HubAction = serde_json::from_value(json!({"action": "getState"})).unwrap();
    assert_eq!(action, HubAction::GetState);
    let action: HubAction = serde_json::from_value(json!({"action": "sessionStopped"})).unwrap();
    assert_eq!(action, HubAction::SessionStopped);
}

#[test]
fn test_unknown_action_fails_to_parse() {
    let result = serde_json::from_value::<HubAction>(json!({"action": "showTestOverlay"}));
    assert!(result.is_err());
}

#[test]
fn test_missing_field_fails_to_parse() {
    let result = serde_json::from_value::<HubAction>(json!({"action": "analyzeGoal", "goal": "g"}));
    assert!(result.is_err());
}

#[test]
fn test_action_names_match_wire_tags() {
    let actions = vec![
        HubAction::Activate,
        HubAction::Deactivate,
        HubAction::GetState,
        HubAction::GoalSubmitted { goal: "g".into() },
        HubAction::AnalyzeGoal { goal: "g".into(), message_id: "m".into() },
        HubAction::SessionStarted { goal: "g".into() },
        HubAction::SessionStopped,
        HubAction::GenerateAiSummary { prompt: "p".into(), message_id: "m".into() },
        HubAction::PerformRelevanceCheck { prompt: "p".into(), request_id: "r".into() },
        HubAction::PerformAiResponse { prompt: "p".into(), request_id: "r".into() },
    ];
    for action in actions {
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], action.name());
    }
}

#[test]
fn test_ack_shapes() {
    assert_eq!(serde_json::to_value(HubAck::ok()).unwrap(), json!({"success": true}));
    assert_eq!(serde_json::to_value(HubAck::state(false)).unwrap(), json!({"isActive": false}));
    let unknown = HubAck::unknown_action();
    assert!(!unknown.is_ok());
    assert_eq!(serde_json::to_value(unknown).unwrap(), json!({"error": "Unknown action"}));
}

#[test]
fn test_notice_with_null_response() {
    let notice = HubNotice::AiResponseResponse {
        request_id: RequestId::from("r1"),
        response: None,
    };
    let json = serde_json::to_value(&notice).unwrap();
    assert_eq!(json["action"], "aiResponseResponse");
    assert!(json["response"].is_null());
    let back: HubNotice = serde_json::from_value(json).unwrap();
    assert_eq!(back.name(), "aiResponseResponse");
}

#[test]
fn test_goal_analyzed_notice() {
    let notice = HubNotice::GoalAnalyzed {
        goal: "g".to_string(),
        analysis: GoalAnalysis::fallback("g"),
        message_id: RequestId::from("m"),
    };
    let json = serde_json::to_value(&notice).unwrap();
    assert_eq!(json["messageId"], "m");
    assert_eq!(json["analysis"]["activity_type"], "general");
}
