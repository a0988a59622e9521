//! Popup port: extension messaging straight to the hub.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use focus_protocols::{prompts, HubAction, HubNotice, RequestId, SurfaceKind};
use focus_runtime::{Correlator, HubClient, NoticeInbox, SummaryPoller};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::port::{SurfacePort, SurfaceSignal};

struct PopupInner {
    hub: HubClient,
    completions: Correlator<Option<String>>,
    poller: SummaryPoller,
    completion_timeout: Duration,
}

/// The toolbar popup's connection to the hub.
///
/// Chat completions come back as pushed `aiResponseResponse` notices. The
/// session-start summary is fetched by store-and-poll, since the popup may
/// close and reopen before it is ready.
#[derive(Clone)]
pub struct PopupPort {
    inner: Arc<PopupInner>,
}

impl PopupPort {
    /// Start listening on `inbox` and return the port with its signal stream.
    pub fn connect(
        hub: HubClient,
        mut inbox: NoticeInbox,
        poller: SummaryPoller,
        completion_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SurfaceSignal>) {
        let port = Self {
            inner: Arc::new(PopupInner {
                hub,
                completions: Correlator::new("popup-completion"),
                poller,
                completion_timeout,
            }),
        };
        let (signals, signal_rx) = mpsc::unbounded_channel();

        let completions = port.inner.completions.clone();
        tokio::spawn(async move {
            while let Some(notice) = inbox.recv().await {
                match notice {
                    HubNotice::AiResponseResponse {
                        request_id,
                        response,
                    } => {
                        completions.resolve(&request_id, response);
                    }
                    HubNotice::SessionStarted { .. } | HubNotice::SessionStopped => {
                        let _ = signals.send(SurfaceSignal::SessionChanged);
                    }
                    other => debug!("Popup ignored {}", other.name()),
                }
            }
            debug!("Popup inbox closed");
        });

        (port, signal_rx)
    }
}

#[async_trait]
impl SurfacePort for PopupPort {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Popup
    }

    async fn complete(&self, prompt: String) -> Option<String> {
        let request_id = RequestId::generate("fp-popup");
        let action = HubAction::PerformAiResponse {
            prompt,
            request_id: request_id.clone(),
        };
        self.inner
            .completions
            .request(
                request_id,
                &self.inner.hub,
                action,
                self.inner.completion_timeout,
                None,
            )
            .await
            .into_inner()
    }

    async fn notify(&self, action: HubAction) {
        match self.inner.hub.send(&action).await {
            Ok(ack) if ack.is_ok() => {}
            Ok(ack) => warn!("Hub rejected {}: {:?}", action.name(), ack.error),
            Err(e) => error!("Failed to send {} to the hub: {}", action.name(), e),
        }
    }

    async fn session_summary(&self, goal: &str) -> Option<String> {
        let message_id = RequestId::generate("summary");
        let action = HubAction::GenerateAiSummary {
            prompt: prompts::session_summary(goal),
            message_id: message_id.clone(),
        };
        match self.inner.hub.send(&action).await {
            Ok(ack) if ack.is_ok() => self.inner.poller.poll(message_id.as_str()).await,
            Ok(ack) => {
                warn!("Hub rejected summary request: {:?}", ack.error);
                None
            }
            Err(e) => {
                error!("Failed to request session summary: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_protocols::{keys, ContextAddress, Role};

    use crate::surface::ChatSurface;
    use crate::test_support::{start_hub, HubFixture, REPLY};

    fn open_popup(fx: &HubFixture) -> ChatSurface<PopupPort> {
        let poller = SummaryPoller::new(
            fx.store.clone(),
            Duration::from_millis(200),
            40,
            Duration::from_secs(300),
        );
        let (port, signals) = PopupPort::connect(
            fx.handle.client(ContextAddress::Popup),
            fx.router.attach(ContextAddress::Popup),
            poller,
            Duration::from_secs(10),
        );
        let surface = ChatSurface::new(port, fx.store.clone());
        surface.serve_signals(signals);
        surface
    }

    #[tokio::test(start_paused = true)]
    async fn test_popup_session_through_the_hub() {
        let fx = start_hub();
        let popup = open_popup(&fx);
        popup.init().await.unwrap();

        let appended = popup.send("learn Spanish").await;
        assert_eq!(appended[1].content, REPLY);
        let appended = popup.send("yes").await;
        assert_eq!(appended[1].role, Role::Assistant);
        assert_eq!(appended[1].content, REPLY);

        // The start summary travels by store-and-poll.
        let appended = popup.start().await;
        assert_eq!(appended[0].content, REPLY);
        let all = fx.store.get_all().await.unwrap();
        assert!(!all.keys().any(|k| keys::is_summary_key(k)));
        assert!(popup.session().await.unwrap().has_active_session());

        // goalSubmitted made the hub store an analysis.
        let mut analysed = false;
        for _ in 0..50 {
            if popup.session().await.unwrap().ai_analysis.is_some() {
                analysed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(analysed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_popup_completion_times_out_to_fallback() {
        let fx = start_hub();
        // Answers are pushed to the popup address, which has no inbox here.
        let (port, _signals) = PopupPort::connect(
            fx.handle.client(ContextAddress::Popup),
            fx.router.attach(ContextAddress::Tab(99)),
            SummaryPoller::new(
                fx.store.clone(),
                Duration::from_millis(200),
                2,
                Duration::from_secs(300),
            ),
            Duration::from_secs(10),
        );
        assert_eq!(port.complete("hello".to_string()).await, None);
    }
}
