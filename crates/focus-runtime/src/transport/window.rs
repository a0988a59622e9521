//! Window messaging inside one page.
//!
//! A page has one bus. Every frame attached to it sees every post, filtered
//! only by the destination frame, so the relay and the agent (both living in
//! the top frame) see each other's messages as well as their own.

use async_trait::async_trait;
use focus_protocols::{FrameId, TransportError, WindowEnvelope};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{trace, warn};

use crate::correlation::Outbound;

/// A posted window message.
#[derive(Debug, Clone)]
pub struct WindowPost {
    /// Frame the message was posted from.
    pub from: FrameId,
    /// Frame whose listeners receive it.
    pub to: FrameId,
    pub data: Value,
}

/// Per-page window bus.
#[derive(Clone)]
pub struct WindowBus {
    tx: broadcast::Sender<WindowPost>,
}

impl WindowBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Post a raw message. Posting with no listener attached is not an error.
    pub fn post(&self, post: WindowPost) {
        trace!("window post {:?} -> {:?}: {}", post.from, post.to, post.data);
        let _ = self.tx.send(post);
    }

    /// Attach a listener for `frame`.
    pub fn port(&self, frame: FrameId) -> WindowPort {
        WindowPort {
            frame,
            rx: self.tx.subscribe(),
        }
    }

    /// Posting half from `from` to `to`.
    pub fn sender(&self, from: FrameId, to: FrameId) -> WindowSender {
        WindowSender {
            from,
            to,
            bus: self.clone(),
        }
    }
}

impl Default for WindowBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Receiving end of a frame.
pub struct WindowPort {
    frame: FrameId,
    rx: broadcast::Receiver<WindowPost>,
}

impl WindowPort {
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// Next post addressed to this frame. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<WindowPost> {
        loop {
            match self.rx.recv().await {
                Ok(post) if post.to == self.frame => return Some(post),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("window listener {:?} lagged, {} messages lost", self.frame, n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Posting half bound to a source and destination frame.
#[derive(Clone)]
pub struct WindowSender {
    from: FrameId,
    to: FrameId,
    bus: WindowBus,
}

impl WindowSender {
    pub fn post(&self, envelope: &WindowEnvelope) -> Result<(), TransportError> {
        let data = envelope.to_wire()?;
        self.bus.post(WindowPost {
            from: self.from,
            to: self.to,
            data,
        });
        Ok(())
    }

    pub fn post_raw(&self, data: Value) {
        self.bus.post(WindowPost {
            from: self.from,
            to: self.to,
            data,
        });
    }
}

#[async_trait]
impl Outbound<WindowEnvelope> for WindowSender {
    async fn send(&self, message: WindowEnvelope) -> Result<(), TransportError> {
        self.post(&message)
    }
}
