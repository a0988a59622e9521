//! Hub-to-context push delivery.

use std::sync::Arc;

use dashmap::DashMap;
use focus_protocols::{ContextAddress, HubNotice, TabId, TransportError};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Routes hub notices to open contexts.
///
/// A context attaches when it loads and is replaced when it reloads, which is
/// what a page navigation does to its relay.
#[derive(Clone, Default)]
pub struct ContextRouter {
    routes: Arc<DashMap<ContextAddress, mpsc::UnboundedSender<Value>>>,
}

impl ContextRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or re-attach) a context and return its inbox.
    pub fn attach(&self, address: ContextAddress) -> NoticeInbox {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.routes.insert(address, tx).is_some() {
            debug!("Context {} re-attached", address);
        }
        NoticeInbox { address, rx }
    }

    pub fn detach(&self, address: ContextAddress) {
        self.routes.remove(&address);
    }

    pub fn is_attached(&self, address: ContextAddress) -> bool {
        self.routes.contains_key(&address)
    }

    /// Open page contexts.
    pub fn tabs(&self) -> Vec<TabId> {
        self.routes
            .iter()
            .filter_map(|entry| match entry.key() {
                ContextAddress::Tab(id) => Some(*id),
                ContextAddress::Popup => None,
            })
            .collect()
    }

    /// Push one notice to one context.
    pub fn push(&self, address: ContextAddress, notice: &HubNotice) -> Result<(), TransportError> {
        let value =
            serde_json::to_value(notice).map_err(|e| TransportError::Malformed(e.to_string()))?;
        let sent = match self.routes.get(&address) {
            Some(tx) => tx.send(value).is_ok(),
            None => return Err(TransportError::ContextGone(address.to_string())),
        };
        if !sent {
            self.routes.remove(&address);
            return Err(TransportError::ContextGone(address.to_string()));
        }
        Ok(())
    }

    /// Best-effort push to every open tab. Returns how many were reached.
    pub fn broadcast_tabs(&self, notice: &HubNotice) -> usize {
        let mut reached = 0;
        for tab in self.tabs() {
            match self.push(ContextAddress::Tab(tab), notice) {
                Ok(()) => reached += 1,
                Err(e) => debug!("Broadcast of {} to tab {} failed: {}", notice.name(), tab, e),
            }
        }
        reached
    }
}

/// Notices pushed to one context.
pub struct NoticeInbox {
    address: ContextAddress,
    rx: mpsc::UnboundedReceiver<Value>,
}

impl NoticeInbox {
    pub fn address(&self) -> ContextAddress {
        self.address
    }

    /// Next well-formed notice; malformed ones are logged and skipped.
    pub async fn recv(&mut self) -> Option<HubNotice> {
        while let Some(value) = self.rx.recv().await {
            match serde_json::from_value::<HubNotice>(value) {
                Ok(notice) => return Some(notice),
                Err(e) => warn!("Context {} dropped malformed notice: {}", self.address, e),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_reaches_attached_context() {
        let router = ContextRouter::new();
        let mut inbox = router.attach(ContextAddress::Tab(1));
        router
            .push(ContextAddress::Tab(1), &HubNotice::SessionStopped)
            .unwrap();
        assert_eq!(inbox.recv().await, Some(HubNotice::SessionStopped));
    }

    #[test]
    fn test_push_to_unknown_context_fails() {
        let router = ContextRouter::new();
        let result = router.push(ContextAddress::Popup, &HubNotice::SessionStopped);
        assert!(matches!(result, Err(TransportError::ContextGone(_))));
    }

    #[test]
    fn test_closed_inbox_is_pruned() {
        let router = ContextRouter::new();
        let inbox = router.attach(ContextAddress::Tab(2));
        drop(inbox);
        assert!(router.push(ContextAddress::Tab(2), &HubNotice::SessionStopped).is_err());
        assert!(!router.is_attached(ContextAddress::Tab(2)));
    }

    #[tokio::test]
    async fn test_broadcast_skips_popup_and_dead_tabs() {
        let router = ContextRouter::new();
        let mut tab1 = router.attach(ContextAddress::Tab(1));
        let dead = router.attach(ContextAddress::Tab(2));
        let _popup = router.attach(ContextAddress::Popup);
        drop(dead);

        let reached = router.broadcast_tabs(&HubNotice::SessionStarted {
            goal: "write".to_string(),
        });
        assert_eq!(reached, 1);
        assert!(matches!(tab1.recv().await, Some(HubNotice::SessionStarted { .. })));
    }

    #[tokio::test]
    async fn test_reattach_replaces_inbox() {
        let router = ContextRouter::new();
        let _old = router.attach(ContextAddress::Tab(1));
        let mut new = router.attach(ContextAddress::Tab(1));
        router.push(ContextAddress::Tab(1), &HubNotice::SessionStopped).unwrap();
        assert_eq!(new.recv().await, Some(HubNotice::SessionStopped));
    }
}
