//! Content relay.
//!
//! The only context holding both a window listener and a hub connection.
//! It forwards agent requests to the hub, hands pushed answers back to the
//! agent under their original request id, bridges the overlay's chat requests
//! and runs the page relevance check whenever a session is active.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use focus_config::{RelayConfig, TimeoutConfig};
use focus_protocols::{
    prompts, CompletionPayload, FrameId, GoalAnalysis, HubAction, HubNotice, Relevance,
    RelevancePayload, RequestId, Source, TabId, WindowAction, WindowEnvelope,
};
use focus_runtime::{
    Correlator, HubClient, NoticeInbox, SessionRepository, WindowBus, WindowPort, WindowPost,
    WindowSender,
};
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::page::PageSource;

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;

/// Deadlines and delays used by the relay.
#[derive(Debug, Clone, Copy)]
pub struct RelayTimings {
    pub relevance: Duration,
    pub completion: Duration,
    pub initial_check_delay: Duration,
    pub navigation_debounce: Duration,
    pub session_start_delay: Duration,
}

impl RelayTimings {
    pub fn from_config(timeouts: &TimeoutConfig, relay: &RelayConfig) -> Self {
        Self {
            relevance: timeouts.relevance(),
            completion: timeouts.completion(),
            initial_check_delay: relay.initial_check_delay(),
            navigation_debounce: relay.navigation_debounce(),
            session_start_delay: relay.session_start_delay(),
        }
    }
}

impl Default for RelayTimings {
    fn default() -> Self {
        Self::from_config(&TimeoutConfig::default(), &RelayConfig::default())
    }
}

/// Outcome of one page relevance check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub url: String,
    pub goal: String,
    pub relevance: Relevance,
}

struct RelayInner {
    tab: TabId,
    hub: HubClient,
    session: SessionRepository,
    page: Arc<dyn PageSource>,
    to_agent: WindowSender,
    to_overlay: WindowSender,
    overlay_attached: AtomicBool,
    relevance: Correlator<String>,
    completions: Correlator<Option<String>>,
    analyses: Correlator<Option<GoalAnalysis>>,
    timings: RelayTimings,
    navigation: AtomicU64,
    last_url: Mutex<String>,
    verdicts: broadcast::Sender<Verdict>,
    /// Hub-bound messages, sent one after another in arrival order.
    outbox: mpsc::UnboundedSender<HubAction>,
    outbox_rx: Mutex<Option<mpsc::UnboundedReceiver<HubAction>>>,
}

/// The content script of one tab.
#[derive(Clone)]
pub struct ContentRelay {
    inner: Arc<RelayInner>,
}

impl ContentRelay {
    pub fn new(
        tab: TabId,
        bus: &WindowBus,
        hub: HubClient,
        session: SessionRepository,
        page: Arc<dyn PageSource>,
        timings: RelayTimings,
    ) -> Self {
        let (verdicts, _) = broadcast::channel(16);
        let (outbox, outbox_rx) = mpsc::unbounded_channel();
        let last_url = page.url();
        Self {
            inner: Arc::new(RelayInner {
                tab,
                hub,
                session,
                page,
                to_agent: bus.sender(FrameId::Top, FrameId::Top),
                to_overlay: bus.sender(FrameId::Top, FrameId::Overlay),
                overlay_attached: AtomicBool::new(false),
                relevance: Correlator::new("relay-relevance"),
                completions: Correlator::new("relay-completion"),
                analyses: Correlator::new("relay-analysis"),
                timings,
                navigation: AtomicU64::new(0),
                last_url: Mutex::new(last_url),
                verdicts,
                outbox,
                outbox_rx: Mutex::new(Some(outbox_rx)),
            }),
        }
    }

    pub fn tab(&self) -> TabId {
        self.inner.tab
    }

    /// Relevance verdicts as they are logged.
    pub fn subscribe(&self) -> broadcast::Receiver<Verdict> {
        self.inner.verdicts.subscribe()
    }

    /// Inject the overlay frame; its posts are accepted from now on.
    pub fn attach_overlay(&self) {
        self.inner.overlay_attached.store(true, Ordering::SeqCst);
        info!("Overlay attached to tab {}", self.inner.tab);
    }

    pub fn detach_overlay(&self) {
        self.inner.overlay_attached.store(false, Ordering::SeqCst);
        info!("Overlay removed from tab {}", self.inner.tab);
    }

    pub fn overlay_attached(&self) -> bool {
        self.inner.overlay_attached.load(Ordering::SeqCst)
    }

    /// Serve the top-frame window and the hub inbox until both close.
    pub fn spawn(self, mut port: WindowPort, mut inbox: NoticeInbox) -> JoinHandle<()> {
        if let Some(outbox) = self.inner.outbox_rx.lock().take() {
            tokio::spawn(forward_in_order(self.inner.hub.clone(), outbox));
        }
        tokio::spawn(async move {
            let mut window_open = true;
            let mut inbox_open = true;
            while window_open || inbox_open {
                tokio::select! {
                    post = port.recv(), if window_open => match post {
                        Some(post) => self.handle_post(post),
                        None => window_open = false,
                    },
                    notice = inbox.recv(), if inbox_open => match notice {
                        Some(notice) => self.handle_notice(notice),
                        None => inbox_open = false,
                    },
                }
            }
            debug!("Relay for tab {} stopped", self.inner.tab);
        })
    }

    /// Page load: check relevance once the store has settled.
    pub fn on_load(&self) -> JoinHandle<Option<Verdict>> {
        let relay = self.clone();
        let delay = self.inner.timings.initial_check_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            relay.check_if_session_active().await
        })
    }

    /// The document changed. Only a new URL schedules a check.
    pub fn notify_mutation(&self) {
        let url = self.inner.page.url();
        {
            let mut last = self.inner.last_url.lock();
            if *last == url {
                return;
            }
            *last = url;
        }
        info!("Navigation detected on tab {}, checking relevance", self.inner.tab);
        self.schedule_check(self.inner.timings.navigation_debounce);
    }

    /// History navigation (back/forward).
    pub fn notify_popstate(&self) {
        *self.inner.last_url.lock() = self.inner.page.url();
        info!("Popstate on tab {}, checking relevance", self.inner.tab);
        self.schedule_check(self.inner.timings.navigation_debounce);
    }

    /// Run a check after `delay` unless another one is scheduled meanwhile.
    fn schedule_check(&self, delay: Duration) {
        let generation = self.inner.navigation.fetch_add(1, Ordering::SeqCst) + 1;
        let relay = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if relay.inner.navigation.load(Ordering::SeqCst) != generation {
                trace!("Superseded relevance check {} skipped", generation);
                return;
            }
            relay.check_if_session_active().await;
        });
    }

    /// Check the current page when a session is running.
    pub async fn check_if_session_active(&self) -> Option<Verdict> {
        let state = match self.inner.session.load().await {
            Ok(state) => state,
            Err(e) => {
                error!("Failed to read session state: {}", e);
                return None;
            }
        };
        if !state.has_active_session() {
            debug!(
                "No active session on tab {}, skipping relevance check",
                self.inner.tab
            );
            return None;
        }
        Some(self.check_relevance(&state.user_goal).await)
    }

    /// One relevance round trip through the agent and the hub.
    pub async fn check_relevance(&self, user_goal: &str) -> Verdict {
        let url = self.inner.page.url();
        let page_text = self.inner.page.content();
        let request_id = RequestId::generate("fp-req");
        let envelope = WindowEnvelope::new(
            Source::ContentScript,
            WindowAction::CheckRelevance {
                payload: RelevancePayload {
                    user_goal: user_goal.to_string(),
                    page_text,
                    request_id: request_id.clone(),
                },
            },
        );

        let resolution = self
            .inner
            .relevance
            .request(
                request_id,
                &self.inner.to_agent,
                envelope,
                self.inner.timings.relevance,
                Relevance::No.as_str().to_string(),
            )
            .await;
        if !resolution.is_response() {
            warn!("Relevance check on {} did not complete, assuming NO", url);
        }

        let raw = resolution.into_inner();
        if !Relevance::is_recognized(&raw) {
            warn!("Unexpected relevance answer {:?}", raw);
        }
        let relevance = Relevance::from_response(&raw);
        match relevance {
            Relevance::Yes => info!("Relevance YES for {} (would allow browsing)", url),
            Relevance::No => info!("Relevance NO for {} (would show blocker)", url),
        }

        let verdict = Verdict {
            url,
            goal: user_goal.to_string(),
            relevance,
        };
        let _ = self.inner.verdicts.send(verdict.clone());
        verdict
    }

    /// Ask the overlay to show its next reminder line.
    pub fn provide_focus_reminder(&self) {
        self.post_overlay(WindowAction::ProvideFocusReminder);
    }

    fn accepts_frame(&self, frame: FrameId) -> bool {
        match frame {
            FrameId::Top => true,
            FrameId::Overlay => self.overlay_attached(),
            FrameId::Foreign(_) => false,
        }
    }

    fn handle_post(&self, post: WindowPost) {
        if !self.accepts_frame(post.from) {
            trace!("Relay ignored post from {:?}", post.from);
            return;
        }
        let envelope = match WindowEnvelope::from_wire(&post.data) {
            Ok(envelope) => envelope,
            Err(e) => {
                trace!("Relay ignored window message: {}", e);
                return;
            }
        };

        match (envelope.source, post.from) {
            (Source::AiScript, FrameId::Top) => self.handle_agent(envelope.action),
            (Source::Overlay, FrameId::Overlay) => self.handle_overlay(envelope.action),
            // Own posts and mismatched frame/source pairs.
            _ => {}
        }
    }

    fn handle_agent(&self, action: WindowAction) {
        match action {
            WindowAction::ForwardToBackground { payload } => {
                debug!("Forwarding {} to the hub", payload.name());
                self.forward_to_hub(payload);
            }
            WindowAction::RelevanceResponse {
                request_id,
                response,
            } => {
                self.inner.relevance.resolve(&request_id, response);
            }
            WindowAction::AiResponse {
                request_id,
                response,
            } => {
                self.inner.completions.resolve(&request_id, response);
            }
            other => trace!("Relay ignored agent action {}", other.name()),
        }
    }

    fn handle_overlay(&self, action: WindowAction) {
        let relay = self.clone();
        match action {
            WindowAction::GetAiResponse { payload } => {
                tokio::spawn(async move {
                    let response = relay.bridge_completion(payload.prompt).await;
                    relay.post_overlay(WindowAction::AiResponse {
                        request_id: payload.request_id,
                        response,
                    });
                });
            }
            WindowAction::GenerateGoalResponse { goal, message_id } => {
                tokio::spawn(async move {
                    let response = relay
                        .bridge_completion(prompts::goal_acknowledgement(&goal))
                        .await;
                    relay.post_overlay(WindowAction::GoalResponseGenerated {
                        message_id,
                        response,
                    });
                });
            }
            WindowAction::AnalyzeGoal { goal, message_id } => {
                tokio::spawn(async move {
                    let analysis = relay.request_analysis(goal, message_id.clone()).await;
                    relay.post_overlay(WindowAction::GoalAnalysisResponse {
                        message_id,
                        analysis,
                    });
                });
            }
            WindowAction::GoalSubmitted { goal } => {
                relay.forward_to_hub(HubAction::GoalSubmitted { goal });
            }
            WindowAction::SessionStarted { goal } => {
                relay.forward_to_hub(HubAction::SessionStarted { goal });
            }
            WindowAction::SessionStopped => relay.forward_to_hub(HubAction::SessionStopped),
            WindowAction::CloseOverlay => relay.detach_overlay(),
            other => trace!("Relay ignored overlay action {}", other.name()),
        }
    }

    fn handle_notice(&self, notice: HubNotice) {
        debug!("Tab {} received {}", self.inner.tab, notice.name());
        match notice {
            HubNotice::RelevanceCheckResponse {
                request_id,
                response,
            } => self.post_agent(WindowAction::RelevanceResponse {
                request_id,
                response,
            }),
            HubNotice::AiResponseResponse {
                request_id,
                response,
            } => self.post_agent(WindowAction::AiResponse {
                request_id,
                response,
            }),
            HubNotice::GoalAnalyzed {
                analysis,
                message_id,
                ..
            } => {
                self.inner.analyses.resolve(&message_id, Some(analysis));
            }
            HubNotice::SessionStarted { goal } => {
                self.schedule_check(self.inner.timings.session_start_delay);
                self.post_overlay(WindowAction::SessionStarted { goal });
            }
            HubNotice::SessionStopped => {
                // Drop any check still waiting on its delay.
                self.inner.navigation.fetch_add(1, Ordering::SeqCst);
                self.post_overlay(WindowAction::SessionStopped);
            }
        }
    }

    /// Overlay completion routed through the agent.
    async fn bridge_completion(&self, prompt: String) -> Option<String> {
        let request_id = RequestId::generate("fp-chat");
        let envelope = WindowEnvelope::new(
            Source::ContentScript,
            WindowAction::GetAiResponse {
                payload: CompletionPayload {
                    prompt,
                    request_id: request_id.clone(),
                },
            },
        );
        self.inner
            .completions
            .request(
                request_id,
                &self.inner.to_agent,
                envelope,
                self.inner.timings.completion,
                None,
            )
            .await
            .into_inner()
    }

    async fn request_analysis(&self, goal: String, message_id: RequestId) -> Option<GoalAnalysis> {
        let action = HubAction::AnalyzeGoal {
            goal,
            message_id: message_id.clone(),
        };
        self.inner
            .analyses
            .request(
                message_id,
                &self.inner.hub,
                action,
                self.inner.timings.completion,
                None,
            )
            .await
            .into_inner()
    }

    fn forward_to_hub(&self, action: HubAction) {
        if self.inner.outbox.send(action).is_err() {
            warn!("Hub forwarder for tab {} is gone", self.inner.tab);
        }
    }

    fn post_agent(&self, action: WindowAction) {
        let name = action.name();
        if let Err(e) = self
            .inner
            .to_agent
            .post(&WindowEnvelope::new(Source::ContentScript, action))
        {
            warn!("Relay failed to post {}: {}", name, e);
        }
    }

    fn post_overlay(&self, action: WindowAction) {
        if !self.overlay_attached() {
            trace!("No overlay on tab {}, dropping {}", self.inner.tab, action.name());
            return;
        }
        let name = action.name();
        if let Err(e) = self
            .inner
            .to_overlay
            .post(&WindowEnvelope::new(Source::ContentScript, action))
        {
            warn!("Relay failed to post {}: {}", name, e);
        }
    }
}

/// Deliver hub-bound messages one at a time, so the hub sees them in the
/// order the page sent them.
async fn forward_in_order(hub: HubClient, mut outbox: mpsc::UnboundedReceiver<HubAction>) {
    while let Some(action) = outbox.recv().await {
        let name = action.name();
        match hub.send(&action).await {
            Ok(ack) if ack.is_ok() => {}
            Ok(ack) => warn!("Hub rejected {}: {:?}", name, ack.error),
            Err(e) => error!("Failed to forward {} to the hub: {}", name, e),
        }
    }
}
