//! Extension messaging towards the hub.
//!
//! Each message carries a one-shot acknowledgement channel, the equivalent of
//! the runtime's `sendResponse` callback. The hub must answer it before doing
//! any slow work; results travel back later through the [`ContextRouter`].
//!
//! [`ContextRouter`]: super::ContextRouter

use async_trait::async_trait;
use focus_protocols::{ContextAddress, HubAck, HubAction, TransportError};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::correlation::Outbound;

/// A message delivered to the hub.
#[derive(Debug)]
pub struct HubMessage {
    pub message: Value,
    pub sender: ContextAddress,
    pub ack: oneshot::Sender<HubAck>,
}

/// Sending side of the hub mailbox.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubMessage>,
}

impl HubHandle {
    pub fn channel(buffer: usize) -> (HubHandle, HubMailbox) {
        let (tx, rx) = mpsc::channel(buffer);
        (HubHandle { tx }, HubMailbox { rx })
    }

    /// Send an already-serialized message and wait for the acknowledgement.
    pub async fn send_raw(
        &self,
        sender: ContextAddress,
        message: Value,
    ) -> Result<HubAck, TransportError> {
        let (ack, ack_rx) = oneshot::channel();
        self.tx
            .send(HubMessage {
                message,
                sender,
                ack,
            })
            .await
            .map_err(|_| TransportError::ContextGone("hub".to_string()))?;
        ack_rx
            .await
            .map_err(|_| TransportError::ContextGone("hub".to_string()))
    }

    pub async fn send(
        &self,
        sender: ContextAddress,
        action: &HubAction,
    ) -> Result<HubAck, TransportError> {
        let message =
            serde_json::to_value(action).map_err(|e| TransportError::Malformed(e.to_string()))?;
        self.send_raw(sender, message).await
    }

    /// Bind this handle to the address of the sending context.
    pub fn client(&self, address: ContextAddress) -> HubClient {
        HubClient {
            handle: self.clone(),
            address,
        }
    }
}

/// Receiving side, owned by the hub.
pub struct HubMailbox {
    rx: mpsc::Receiver<HubMessage>,
}

impl HubMailbox {
    pub async fn recv(&mut self) -> Option<HubMessage> {
        self.rx.recv().await
    }
}

/// A context's connection to the hub.
#[derive(Clone)]
pub struct HubClient {
    handle: HubHandle,
    address: ContextAddress,
}

impl HubClient {
    pub fn address(&self) -> ContextAddress {
        self.address
    }

    pub async fn send(&self, action: &HubAction) -> Result<HubAck, TransportError> {
        self.handle.send(self.address, action).await
    }
}

#[async_trait]
impl Outbound<HubAction> for HubClient {
    /// Delivered means acknowledged without an error.
    async fn send(&self, message: HubAction) -> Result<(), TransportError> {
        let ack = HubClient::send(self, &message).await?;
        match ack.error {
            Some(error) => Err(TransportError::SendFailed(error)),
            None => Ok(()),
        }
    }
}
