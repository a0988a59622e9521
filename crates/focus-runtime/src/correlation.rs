//! Correlated request/response over one-way transports.
//!
//! Every originator (in-page agent, relay, chat surfaces) keeps a table of
//! requests awaiting an answer. The table is keyed by [`RequestId`]; an entry
//! is created before the request leaves, and removed by whichever comes first
//! of the matching response or the deadline. Removal happens under the table
//! lock, so an entry resolves exactly once and a late response finds nothing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use focus_protocols::{RequestId, TransportError};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

#[cfg(test)]
#[path = "correlation_tests.rs"]
mod tests;

/// One-way transport a correlated request is sent over.
#[async_trait]
pub trait Outbound<M: Send + 'static>: Send + Sync {
    async fn send(&self, message: M) -> Result<(), TransportError>;
}

/// How a correlated request ended. Every variant carries the value handed to
/// the caller, which is the fallback unless a response arrived in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Response(T),
    TimedOut(T),
    /// The request never left (send failed or the id was already in flight).
    Undelivered(T),
}

impl<T> Resolution<T> {
    pub fn into_inner(self) -> T {
        match self {
            Resolution::Response(v) | Resolution::TimedOut(v) | Resolution::Undelivered(v) => v,
        }
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Resolution::Response(_))
    }
}

/// Pending request waiting for response.
struct PendingRequest<T> {
    tx: oneshot::Sender<T>,
}

/// Pending-request table with deadline and fallback.
pub struct Correlator<T> {
    name: &'static str,
    pending: Arc<Mutex<HashMap<RequestId, PendingRequest<T>>>>,
}

impl<T> Clone for Correlator<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            pending: self.pending.clone(),
        }
    }
}

impl<T: Send + 'static> Correlator<T> {
    /// `name` only labels log lines.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create the entry for `id`. Fails if the id is already live.
    pub fn register(&self, id: RequestId) -> Result<oneshot::Receiver<T>, TransportError> {
        let mut pending = self.pending.lock();
        if pending.contains_key(&id) {
            return Err(TransportError::Malformed(format!(
                "request id {} already in flight",
                id
            )));
        }
        let (tx, rx) = oneshot::channel();
        pending.insert(id, PendingRequest { tx });
        Ok(rx)
    }

    /// Hand `value` to the waiter of `id`. Returns false when no entry exists,
    /// which is how late and foreign responses are dropped.
    pub fn resolve(&self, id: &RequestId, value: T) -> bool {
        let mut pending = self.pending.lock();
        match pending.remove(id) {
            Some(req) => req.tx.send(value).is_ok(),
            None => {
                debug!("[{}] no pending request for {}, dropping response", self.name, id);
                false
            }
        }
    }

    /// Drop the entry for `id` without resolving it.
    pub fn cancel(&self, id: &RequestId) -> bool {
        self.pending.lock().remove(id).is_some()
    }

    pub fn is_pending(&self, id: &RequestId) -> bool {
        self.pending.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Wait for the response to a registered request, resolving with
    /// `fallback` once `timeout` elapses.
    pub async fn wait(
        &self,
        id: &RequestId,
        mut rx: oneshot::Receiver<T>,
        timeout: Duration,
        fallback: T,
    ) -> Resolution<T> {
        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(value)) => Resolution::Response(value),
            Ok(Err(_)) => {
                debug!("[{}] request {} cancelled", self.name, id);
                Resolution::Undelivered(fallback)
            }
            Err(_) => {
                let mut pending = self.pending.lock();
                if pending.remove(id).is_some() {
                    warn!(
                        "[{}] request {} timed out after {:?}, using fallback",
                        self.name, id, timeout
                    );
                    Resolution::TimedOut(fallback)
                } else {
                    // The response won the race and is already in the channel.
                    match rx.try_recv() {
                        Ok(value) => Resolution::Response(value),
                        Err(_) => Resolution::TimedOut(fallback),
                    }
                }
            }
        }
    }

    /// Register `id`, send `message` over `outbound` and wait for the answer.
    pub async fn request<M, O>(
        &self,
        id: RequestId,
        outbound: &O,
        message: M,
        timeout: Duration,
        fallback: T,
    ) -> Resolution<T>
    where
        M: Send + 'static,
        O: Outbound<M> + ?Sized,
    {
        let rx = match self.register(id.clone()) {
            Ok(rx) => rx,
            Err(e) => {
                warn!("[{}] {}", self.name, e);
                return Resolution::Undelivered(fallback);
            }
        };

        // Dropping this future at either await below must not strand the entry.
        let mut guard = PendingGuard {
            correlator: self,
            id: &id,
            armed: true,
        };

        if let Err(e) = outbound.send(message).await {
            warn!("[{}] failed to send request {}: {}", self.name, id, e);
            return Resolution::Undelivered(fallback);
        }

        let resolution = self.wait(&id, rx, timeout, fallback).await;
        guard.armed = false;
        resolution
    }
}

/// Removes a request's entry when its caller goes away before it resolves.
struct PendingGuard<'a, T: Send + 'static> {
    correlator: &'a Correlator<T>,
    id: &'a RequestId,
    armed: bool,
}

impl<T: Send + 'static> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed && self.correlator.cancel(self.id) {
            debug!(
                "[{}] request {} abandoned by its caller",
                self.correlator.name, self.id
            );
        }
    }
}
