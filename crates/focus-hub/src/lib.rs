//! # Focus Hub
//!
//! The service worker hub: the only context holding the credential and the
//! only one calling the completion service. Every request is acknowledged
//! immediately; the result follows as a separate pushed notice or, for the
//! popup summary, as a store entry the popup polls for.

mod analysis;
mod completion;
mod hub;
mod summary;

pub use analysis::{goal_analysis_prompt, parse_analysis};
pub use completion::{FallbackCompletion, MOCK_RESPONSE};
pub use hub::Hub;
