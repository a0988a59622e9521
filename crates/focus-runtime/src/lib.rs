//! # Focus Runtime
//!
//! Building blocks every Focus Partner context is assembled from:
//!
//! - [`Correlator`] - pending-request table with deadline and fallback
//! - [`transport`] - in-process window bus, hub mailbox and push router
//! - [`store`] - memory and file [`KeyValueStore`](focus_protocols::KeyValueStore) implementations
//! - [`SessionRepository`], [`TranscriptLog`], [`DraftStore`] - typed views over the store
//! - [`SummaryPoller`] - the reading side of store-and-poll delivery

pub mod correlation;
pub mod draft;
pub mod poll;
pub mod session;
pub mod store;
pub mod transcript;
pub mod transport;

pub use correlation::{Correlator, Outbound, Resolution};
pub use draft::DraftStore;
pub use poll::SummaryPoller;
pub use session::SessionRepository;
pub use store::{FileStore, MemoryStore};
pub use transcript::TranscriptLog;
pub use transport::{
    ContextRouter, HubClient, HubHandle, HubMailbox, HubMessage, NoticeInbox, WindowBus,
    WindowPort, WindowPost, WindowSender,
};
