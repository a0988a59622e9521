//! # Focus Config
//!
//! Configuration management for Focus Partner: the completion endpoint and
//! credential (hub only), protocol deadlines, polling budget, relay timing and
//! the persistent store backend.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{
    ConfigValidator, PLACEHOLDER_API_KEY, ValidationError, ValidationResult, ValidationWarning,
};
