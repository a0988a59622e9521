//! Configuration errors.

use thiserror::Error;

/// Errors raised while loading or checking a Focus Partner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    /// A field failed validation, e.g. a zero deadline.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// A `${VAR}` reference in the file names an unset variable.
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_names_the_field() {
        let err = ConfigError::InvalidValue {
            field: "timeouts.relevance_ms".to_string(),
            message: "must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for timeouts.relevance_ms: must be greater than zero"
        );
    }

    #[test]
    fn test_unset_credential_variable() {
        let err = ConfigError::EnvVarNotSet("OPENAI_API_KEY".to_string());
        assert!(err.to_string().ends_with("OPENAI_API_KEY"));
    }

    #[test]
    fn test_toml_errors_convert() {
        let parse = toml::from_str::<toml::Value>("[timeouts").unwrap_err();
        let err = ConfigError::from(parse);
        assert!(matches!(err, ConfigError::TomlParse(_)));
        assert!(err.to_string().starts_with("TOML parse error"));
    }
}
