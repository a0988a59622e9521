use super::*;

#[test]
fn test_single_turn_request_body() {
    let request = ApiRequest::single_turn("gpt-5-nano", "Is this page relevant?", 300);
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "model": "gpt-5-nano",
            "messages": [{"role": "user", "content": "Is this page relevant?"}],
            "max_completion_tokens": 300
        })
    );
}

#[test]
fn test_response_first_text() {
    let json = r#"{
        "id": "chatcmpl-1",
        "model": "gpt-5-nano",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "YES"}, "finish_reason": "stop"},
            {"index": 1, "message": {"role": "assistant", "content": "NO"}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}
    }"#;
    let response: ApiResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.usage.as_ref().unwrap().total_tokens, 13);
    assert_eq!(response.first_text().as_deref(), Some("YES"));
}

#[test]
fn test_response_without_choices() {
    let response: ApiResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
    assert!(response.first_text().is_none());
}

#[test]
fn test_response_with_null_content() {
    let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "length"}]}"#;
    let response: ApiResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.choices[0].finish_reason.as_deref(), Some("length"));
    assert!(response.first_text().is_none());
}

#[test]
fn test_response_missing_choices_fails() {
    assert!(serde_json::from_str::<ApiResponse>(r#"{"id": "x"}"#).is_err());
}
