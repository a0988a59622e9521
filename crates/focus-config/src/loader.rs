//! Configuration loader.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Environment variables that override the provider section.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "OPENAI_MODEL";

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    /// Environment overrides apply in both cases.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        let config = if path.exists() {
            Self::load(path)?
        } else {
            Config::default()
        };
        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Fill the credential and model from the environment when the file left
    /// them unset.
    pub fn apply_env_overrides(mut config: Config) -> Config {
        if config.provider.api_key.as_deref().unwrap_or_default().is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                config.provider.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.is_empty() {
                config.provider.model = model;
            }
        }
        config
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.focuspartner`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.timeouts.relevance_ms, 5000);
        assert_eq!(config.provider.max_completion_tokens, 300);
    }

    #[test]
    fn test_load_basic_config() {
        let content = r#"
            [provider]
            model = "gpt-4o-mini"

            [timeouts]
            relevance_ms = 2000
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.timeouts.relevance_ms, 2000);
        assert_eq!(config.timeouts.completion_ms, 10000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[poll]").unwrap();
        writeln!(file, "max_attempts = 10").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.poll.max_attempts, 10);
        assert_eq!(config.poll.interval_ms, 200);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = ConfigLoader::load_str(include_str!("../../../config/default.toml")).unwrap();
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.timeouts.relevance_ms, 5000);
        assert_eq!(config.relay.navigation_debounce_ms, 1000);
        assert_eq!(config.storage.backend, "memory");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.storage.backend, "memory");
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("FOCUS_TEST_CONFIG_VAR", "sk-from-env");
        }
        let content = "[provider]\napi_key = \"${FOCUS_TEST_CONFIG_VAR}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-from-env"));
        unsafe {
            std::env::remove_var("FOCUS_TEST_CONFIG_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_FOCUS_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/test");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/test"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/var/lib/x"), "/var/lib/x");
    }
}
