//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

/// Placeholder credential shipped in sample configs.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// First error as a [`ConfigError`], for callers that refuse to start.
    pub fn into_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next().map(|e| ConfigError::InvalidValue {
            field: e.path,
            message: e.message,
        })
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_provider(config, &mut result);
        Self::validate_timeouts(config, &mut result);
        Self::validate_poll(config, &mut result);
        Self::validate_storage(config, &mut result);

        result
    }

    /// Whether the credential is usable for real requests.
    pub fn has_usable_key(api_key: Option<&str>) -> bool {
        matches!(api_key, Some(key) if !key.trim().is_empty() && key != PLACEHOLDER_API_KEY)
    }

    fn validate_provider(config: &Config, result: &mut ValidationResult) {
        let provider = &config.provider;
        if provider.endpoint.is_empty() {
            result.add_error(ValidationError::new(
                "provider.endpoint",
                "Endpoint cannot be empty",
            ));
        }
        if provider.model.is_empty() {
            result.add_error(ValidationError::new("provider.model", "Model cannot be empty"));
        }
        if provider.max_completion_tokens == 0 {
            result.add_error(ValidationError::new(
                "provider.max_completion_tokens",
                "max_completion_tokens must be greater than 0",
            ));
        }
        if provider.request_timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "provider.request_timeout_seconds",
                "request_timeout_seconds must be greater than 0",
            ));
        }
        if !Self::has_usable_key(provider.api_key.as_deref()) {
            result.add_warning(ValidationWarning::new(
                "provider.api_key",
                "No API key configured, completions run in mock mode",
            ));
        }
    }

    fn validate_timeouts(config: &Config, result: &mut ValidationResult) {
        if config.timeouts.relevance_ms == 0 {
            result.add_error(ValidationError::new(
                "timeouts.relevance_ms",
                "relevance_ms must be greater than 0",
            ));
        }
        if config.timeouts.completion_ms == 0 {
            result.add_error(ValidationError::new(
                "timeouts.completion_ms",
                "completion_ms must be greater than 0",
            ));
        }
        if config.timeouts.completion_ms < config.timeouts.relevance_ms {
            result.add_warning(ValidationWarning::new(
                "timeouts.completion_ms",
                "completion_ms is shorter than relevance_ms",
            ));
        }
    }

    fn validate_poll(config: &Config, result: &mut ValidationResult) {
        if config.poll.max_attempts == 0 {
            result.add_error(ValidationError::new(
                "poll.max_attempts",
                "max_attempts must be greater than 0",
            ));
        }
        if config.poll.interval_ms == 0 {
            result.add_error(ValidationError::new(
                "poll.interval_ms",
                "interval_ms must be greater than 0",
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        match config.storage.backend.as_str() {
            "memory" => {}
            "file" => {
                if config.storage.path.is_empty() {
                    result.add_error(ValidationError::new(
                        "storage.path",
                        "File backend requires a path",
                    ));
                }
            }
            other => result.add_error(ValidationError::new(
                "storage.backend",
                format!("Unknown storage backend: {}", other),
            )),
        }
    }
}
