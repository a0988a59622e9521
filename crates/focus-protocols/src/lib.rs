//! # Focus Protocols
//!
//! Wire types and protocol traits shared by every Focus Partner context.
//! Contains only message shapes and interface definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`KeyValueStore`] - The persistent store every context reads and writes
//! - [`CompletionBackend`] - The external text-completion service (hub only)
//!
//! ## Messages
//!
//! - [`HubAction`] / [`HubNotice`] / [`HubAck`] - extension messaging with the hub
//! - [`WindowEnvelope`] - window messaging between relay, agent and overlay

pub mod completion;
pub mod envelope;
pub mod error;
pub mod hub;
pub mod prompts;
pub mod store;
pub mod types;
pub mod window;

pub use completion::{is_usable_api_key, CompletionBackend, PLACEHOLDER_API_KEY};
pub use envelope::{ContextAddress, FrameId, RequestId, Source, TabId};
pub use error::{ProviderError, StoreError, TransportError};
pub use hub::{HubAck, HubAction, HubNotice};
pub use store::{keys, KeyValueStore};
pub use types::*;
pub use window::{CompletionPayload, RelevancePayload, WindowAction, WindowEnvelope};
