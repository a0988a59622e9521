//! Completion wrapper that never fails.

use std::sync::Arc;

use focus_protocols::CompletionBackend;
use tracing::{debug, error, warn};

/// Placeholder returned whenever the backend is missing or fails.
pub const MOCK_RESPONSE: &str = "🎯 Focus session started! I'll help you stay focused on your goal.";

/// Wraps the configured backend, if any.
#[derive(Clone)]
pub struct FallbackCompletion {
    backend: Option<Arc<dyn CompletionBackend>>,
}

impl FallbackCompletion {
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self { backend }
    }

    /// Mock mode only.
    pub fn unconfigured() -> Self {
        Self { backend: None }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.as_ref().is_some_and(|b| b.is_configured())
    }

    /// Complete `prompt`, answering with [`MOCK_RESPONSE`] when no usable
    /// backend is configured or the call fails.
    pub async fn complete(&self, prompt: &str) -> String {
        let backend = match &self.backend {
            Some(backend) if backend.is_configured() => backend,
            _ => {
                warn!("Completion backend not configured, using mock response");
                return MOCK_RESPONSE.to_string();
            }
        };

        debug!("Completion via {} ({} chars)", backend.id(), prompt.len());
        match backend.complete(prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("Completion via {} failed: {}", backend.id(), e);
                MOCK_RESPONSE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use focus_protocols::ProviderError;

    struct Fixed {
        configured: bool,
        fail: bool,
    }

    #[async_trait]
    impl CompletionBackend for Fixed {
        fn id(&self) -> &str {
            "fixed"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
            if self.fail {
                Err(ProviderError::AuthenticationFailed("401".to_string()))
            } else {
                Ok("YES".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_no_backend_gives_mock() {
        let completion = FallbackCompletion::unconfigured();
        assert!(!completion.is_configured());
        assert_eq!(completion.complete("p").await, MOCK_RESPONSE);
    }

    #[tokio::test]
    async fn test_unconfigured_backend_is_not_called() {
        let completion = FallbackCompletion::new(Some(Arc::new(Fixed {
            configured: false,
            fail: false,
        })));
        assert_eq!(completion.complete("p").await, MOCK_RESPONSE);
    }

    #[tokio::test]
    async fn test_backend_failure_gives_mock() {
        let completion = FallbackCompletion::new(Some(Arc::new(Fixed {
            configured: true,
            fail: true,
        })));
        assert_eq!(completion.complete("p").await, MOCK_RESPONSE);
    }

    #[tokio::test]
    async fn test_backend_success() {
        let completion = FallbackCompletion::new(Some(Arc::new(Fixed {
            configured: true,
            fail: false,
        })));
        assert!(completion.is_configured());
        assert_eq!(completion.complete("p").await, "YES");
    }
}
