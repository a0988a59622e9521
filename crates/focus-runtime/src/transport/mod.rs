//! In-process transports standing in for the browser's message channels.
//!
//! All three carry `serde_json::Value`: a message is serialized when it is
//! posted and parsed again by the receiver, the same boundary the browser's
//! structured clone imposes.

mod mailbox;
mod router;
mod window;

pub use mailbox::{HubClient, HubHandle, HubMailbox, HubMessage};
pub use router::{ContextRouter, NoticeInbox};
pub use window::{WindowBus, WindowPort, WindowPost, WindowSender};
