use super::*;

#[test]
fn test_default_config_is_valid() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    // Default has no key, so mock mode is flagged.
    assert!(result.warnings.iter().any(|w| w.path == "provider.api_key"));
}

#[test]
fn test_configured_key_has_no_warning() {
    let mut config = Config::default();
    config.provider.api_key = Some("sk-real".to_string());
    let result = ConfigValidator::validate(&config);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_placeholder_key_is_not_usable() {
    assert!(!ConfigValidator::has_usable_key(Some(PLACEHOLDER_API_KEY)));
    assert!(!ConfigValidator::has_usable_key(Some("  ")));
    assert!(!ConfigValidator::has_usable_key(None));
    assert!(ConfigValidator::has_usable_key(Some("sk-1")));
}

#[test]
fn test_zero_timeouts_are_errors() {
    let mut config = Config::default();
    config.timeouts.relevance_ms = 0;
    config.timeouts.completion_ms = 0;
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_zero_poll_attempts_is_error() {
    let mut config = Config::default();
    config.poll.max_attempts = 0;
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "poll.max_attempts"));
}

#[test]
fn test_empty_model_and_endpoint() {
    let mut config = Config::default();
    config.provider.model.clear();
    config.provider.endpoint.clear();
    let result = ConfigValidator::validate(&config);
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_unknown_backend() {
    let mut config = Config::default();
    config.storage.backend = "sqlite".to_string();
    let result = ConfigValidator::validate(&config);
    let err = result.into_error().unwrap();
    assert!(err.to_string().contains("storage.backend"));
}

#[test]
fn test_short_completion_timeout_warns() {
    let mut config = Config::default();
    config.timeouts.completion_ms = 1_000;
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "timeouts.completion_ms"));
}
