//! OpenAI-compatible completion backend for Focus Partner.

mod api;
mod provider;

pub use provider::OpenAIProvider;
