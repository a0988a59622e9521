//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Credential. Unset or placeholder selects mock mode.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            max_completion_tokens: default_max_completion_tokens(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-5-nano".to_string()
}

fn default_max_completion_tokens() -> u32 {
    300
}

fn default_request_timeout() -> u64 {
    30
}

/// Correlation deadlines, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_relevance_ms")]
    pub relevance_ms: u64,

    #[serde(default = "default_completion_ms")]
    pub completion_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            relevance_ms: default_relevance_ms(),
            completion_ms: default_completion_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn relevance(&self) -> Duration {
        Duration::from_millis(self.relevance_ms)
    }

    pub fn completion(&self) -> Duration {
        Duration::from_millis(self.completion_ms)
    }
}

fn default_relevance_ms() -> u64 {
    5_000
}

fn default_completion_ms() -> u64 {
    10_000
}

/// Store-and-poll settings for the popup summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,

    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,

    /// Age after which unread summary entries are swept.
    #[serde(default = "default_summary_retention")]
    pub summary_retention_seconds: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
            max_attempts: default_poll_attempts(),
            summary_retention_seconds: default_summary_retention(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.summary_retention_seconds)
    }
}

fn default_poll_interval() -> u64 {
    200
}

fn default_poll_attempts() -> u32 {
    40
}

fn default_summary_retention() -> u64 {
    300
}

/// Relay scheduling delays, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_initial_check_delay")]
    pub initial_check_delay_ms: u64,

    #[serde(default = "default_navigation_debounce")]
    pub navigation_debounce_ms: u64,

    #[serde(default = "default_session_start_delay")]
    pub session_start_delay_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            initial_check_delay_ms: default_initial_check_delay(),
            navigation_debounce_ms: default_navigation_debounce(),
            session_start_delay_ms: default_session_start_delay(),
        }
    }
}

impl RelayConfig {
    pub fn initial_check_delay(&self) -> Duration {
        Duration::from_millis(self.initial_check_delay_ms)
    }

    pub fn navigation_debounce(&self) -> Duration {
        Duration::from_millis(self.navigation_debounce_ms)
    }

    pub fn session_start_delay(&self) -> Duration {
        Duration::from_millis(self.session_start_delay_ms)
    }
}

fn default_initial_check_delay() -> u64 {
    100
}

fn default_navigation_debounce() -> u64 {
    1_000
}

fn default_session_start_delay() -> u64 {
    500
}

/// Persistent store backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `memory` or `file`.
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_store_path(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_store_path() -> String {
    "~/.focuspartner/store.json".to_string()
}
