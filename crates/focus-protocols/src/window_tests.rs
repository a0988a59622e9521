use super::*;
use serde_json::json;

#[test]
fn test_check_relevance_wire_shape() {
    let envelope = WindowEnvelope::new(
        Source::ContentScript,
        WindowAction::CheckRelevance {
            payload: RelevancePayload {
                user_goal: "learn Spanish".to_string(),
                page_text: "Conjugation tables".to_string(),
                request_id: RequestId::from("fp-req-1"),
            },
        },
    );
    let json = envelope.to_wire().unwrap();
    assert_eq!(json["source"], "focuspartner-content-script");
    assert_eq!(json["action"], "checkRelevance");
    assert_eq!(json["payload"]["userGoal"], "learn Spanish");
    assert_eq!(json["payload"]["requestId"], "fp-req-1");
}

#[test]
fn test_forward_to_background_nests_hub_action() {
    let envelope = WindowEnvelope::new(
        Source::AiScript,
        WindowAction::ForwardToBackground {
            payload: HubAction::PerformRelevanceCheck {
                prompt: "p".to_string(),
                request_id: RequestId::from("r"),
            },
        },
    );
    let json = envelope.to_wire().unwrap();
    assert_eq!(json["action"], "forwardToBackground");
    assert_eq!(json["payload"]["action"], "performRelevanceCheck");
    let back = WindowEnvelope::from_wire(&json).unwrap();
    assert_eq!(back, envelope);
}

#[test]
fn test_ai_response_accepts_message_id_alias() {
    let json = json!({
        "source": "focuspartner-content-script",
        "action": "aiResponse",
        "messageId": "m-1",
        "response": "hello"
    });
    let envelope = WindowEnvelope::from_wire(&json).unwrap();
    match envelope.action {
        WindowAction::AiResponse { request_id, response } => {
            assert_eq!(request_id.as_str(), "m-1");
            assert_eq!(response.as_deref(), Some("hello"));
        }
        other => panic!("unexpected action {:?}", other),
    }
}

#[test]
fn test_missing_source_is_rejected() {
    let json = json!({"action": "closeOverlay"});
    assert!(WindowEnvelope::from_wire(&json).is_err());
}

#[test]
fn test_foreign_source_is_rejected() {
    let json = json!({"source": "someone-else", "action": "closeOverlay"});
    assert!(WindowEnvelope::from_wire(&json).is_err());
}

#[test]
fn test_unknown_action_is_rejected() {
    let json = json!({"source": "focuspartner-overlay", "action": "showTestOverlay"});
    assert!(WindowEnvelope::from_wire(&json).is_err());
}

#[test]
fn test_unit_actions_round_trip() {
    for action in [
        WindowAction::SessionStopped,
        WindowAction::CloseOverlay,
        WindowAction::ProvideFocusReminder,
    ] {
        let envelope = WindowEnvelope::new(Source::Overlay, action.clone());
        let json = envelope.to_wire().unwrap();
        assert_eq!(json["action"], action.name());
        assert_eq!(WindowEnvelope::from_wire(&json).unwrap().action, action);
    }
}
