//! Completion backend protocol.

use async_trait::async_trait;

use crate::error::ProviderError;

/// A single-turn text-completion service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the backend ID.
    fn id(&self) -> &str;

    /// Whether a usable credential is present. Unconfigured backends are
    /// never called; the hub answers with placeholder text instead.
    fn is_configured(&self) -> bool;

    /// Complete one user prompt.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Placeholder credential shipped in sample settings.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// A key counts only when it is non-blank and not the placeholder.
pub fn is_usable_api_key(api_key: Option<&str>) -> bool {
    matches!(api_key, Some(key) if !key.trim().is_empty() && key != PLACEHOLDER_API_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_api_key() {
        assert!(is_usable_api_key(Some("sk-abc")));
        assert!(!is_usable_api_key(Some("")));
        assert!(!is_usable_api_key(Some("   ")));
        assert!(!is_usable_api_key(Some(PLACEHOLDER_API_KEY)));
        assert!(!is_usable_api_key(None));
    }
}
