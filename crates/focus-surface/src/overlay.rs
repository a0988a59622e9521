//! Overlay port: window messaging with the page's relay.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use focus_protocols::{
    CompletionPayload, FrameId, HubAction, RequestId, Source, SurfaceKind, WindowAction,
    WindowEnvelope,
};
use focus_runtime::{Correlator, WindowBus, WindowSender};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::port::{SurfacePort, SurfaceSignal};

struct OverlayInner {
    relay: WindowSender,
    completions: Correlator<Option<String>>,
    acknowledgements: Correlator<Option<String>>,
    completion_timeout: Duration,
}

/// The in-page chat overlay's connection to its relay.
#[derive(Clone)]
pub struct OverlayPort {
    inner: Arc<OverlayInner>,
}

impl OverlayPort {
    /// Attach to the overlay frame of `bus` and return the port with its
    /// signal stream.
    pub fn connect(
        bus: &WindowBus,
        completion_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SurfaceSignal>) {
        let port = Self {
            inner: Arc::new(OverlayInner {
                relay: bus.sender(FrameId::Overlay, FrameId::Top),
                completions: Correlator::new("overlay-completion"),
                acknowledgements: Correlator::new("overlay-acknowledgement"),
                completion_timeout,
            }),
        };
        let (signals, signal_rx) = mpsc::unbounded_channel();

        let mut window = bus.port(FrameId::Overlay);
        let inner = port.inner.clone();
        tokio::spawn(async move {
            while let Some(post) = window.recv().await {
                // The relay posts from the top frame; nothing else may drive us.
                if post.from != FrameId::Top {
                    continue;
                }
                let envelope = match WindowEnvelope::from_wire(&post.data) {
                    Ok(envelope) if envelope.source == Source::ContentScript => envelope,
                    Ok(_) => continue,
                    Err(e) => {
                        trace!("Overlay ignored window message: {}", e);
                        continue;
                    }
                };
                match envelope.action {
                    WindowAction::AiResponse {
                        request_id,
                        response,
                    } => {
                        inner.completions.resolve(&request_id, response);
                    }
                    WindowAction::GoalResponseGenerated {
                        message_id,
                        response,
                    } => {
                        inner.acknowledgements.resolve(&message_id, response);
                    }
                    WindowAction::SessionStarted { .. } | WindowAction::SessionStopped => {
                        let _ = signals.send(SurfaceSignal::SessionChanged);
                    }
                    WindowAction::ProvideFocusReminder => {
                        let _ = signals.send(SurfaceSignal::ReminderRequested);
                    }
                    other => debug!("Overlay ignored {}", other.name()),
                }
            }
            debug!("Overlay window closed");
        });

        (port, signal_rx)
    }

    /// Ask the relay to remove this overlay.
    pub fn close(&self) {
        self.post(WindowAction::CloseOverlay);
    }

    fn post(&self, action: WindowAction) {
        let name = action.name();
        if let Err(e) = self
            .inner
            .relay
            .post(&WindowEnvelope::new(Source::Overlay, action))
        {
            warn!("Overlay failed to post {}: {}", name, e);
        }
    }
}

#[async_trait]
impl SurfacePort for OverlayPort {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Overlay
    }

    async fn complete(&self, prompt: String) -> Option<String> {
        let message_id = RequestId::generate("fp-overlay");
        let envelope = WindowEnvelope::new(
            Source::Overlay,
            WindowAction::GetAiResponse {
                payload: CompletionPayload {
                    prompt,
                    request_id: message_id.clone(),
                },
            },
        );
        self.inner
            .completions
            .request(
                message_id,
                &self.inner.relay,
                envelope,
                self.inner.completion_timeout,
                None,
            )
            .await
            .into_inner()
    }

    async fn notify(&self, action: HubAction) {
        let action = match action {
            HubAction::GoalSubmitted { goal } => WindowAction::GoalSubmitted { goal },
            HubAction::SessionStarted { goal } => WindowAction::SessionStarted { goal },
            HubAction::SessionStopped => WindowAction::SessionStopped,
            other => {
                warn!("Overlay cannot relay {}", other.name());
                return;
            }
        };
        self.post(action);
    }

    async fn acknowledge_goal(&self, goal: &str) -> Option<String> {
        let message_id = RequestId::generate("fp-goal");
        let envelope = WindowEnvelope::new(
            Source::Overlay,
            WindowAction::GenerateGoalResponse {
                goal: goal.to_string(),
                message_id: message_id.clone(),
            },
        );
        self.inner
            .acknowledgements
            .request(
                message_id,
                &self.inner.relay,
                envelope,
                self.inner.completion_timeout,
                None,
            )
            .await
            .into_inner()
    }
}
