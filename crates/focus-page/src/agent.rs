//! In-page agent.
//!
//! Lives in the page's own script realm, one window hop away from the relay.
//! It never talks to the hub directly: requests are wrapped in
//! `forwardToBackground` and answers come back as `relevanceResponse` /
//! `aiResponse` posts from the relay.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use focus_config::TimeoutConfig;
use focus_protocols::{
    prompts, FrameId, HubAction, Relevance, RequestId, Source, TransportError, WindowAction,
    WindowEnvelope,
};
use focus_runtime::{Correlator, Outbound, WindowBus, WindowPort, WindowPost, WindowSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;

/// Deadlines the agent arms for its own requests.
#[derive(Debug, Clone, Copy)]
pub struct AgentTimeouts {
    pub relevance: Duration,
    pub completion: Duration,
}

impl AgentTimeouts {
    pub fn from_config(config: &TimeoutConfig) -> Self {
        Self {
            relevance: config.relevance(),
            completion: config.completion(),
        }
    }
}

impl Default for AgentTimeouts {
    fn default() -> Self {
        Self::from_config(&TimeoutConfig::default())
    }
}

/// Wraps hub actions in `forwardToBackground` posts to the relay.
struct RelayForward {
    window: WindowSender,
}

#[async_trait]
impl Outbound<HubAction> for RelayForward {
    async fn send(&self, message: HubAction) -> Result<(), TransportError> {
        self.window.post(&WindowEnvelope::new(
            Source::AiScript,
            WindowAction::ForwardToBackground { payload: message },
        ))
    }
}

struct AgentInner {
    window: WindowSender,
    forward: RelayForward,
    relevance: Correlator<String>,
    completions: Correlator<Option<String>>,
    timeouts: AgentTimeouts,
}

/// The page-realm script.
#[derive(Clone)]
pub struct PageAgent {
    inner: Arc<AgentInner>,
}

impl PageAgent {
    pub fn new(bus: &WindowBus, timeouts: AgentTimeouts) -> Self {
        let window = bus.sender(FrameId::Top, FrameId::Top);
        Self {
            inner: Arc::new(AgentInner {
                forward: RelayForward {
                    window: window.clone(),
                },
                window,
                relevance: Correlator::new("agent-relevance"),
                completions: Correlator::new("agent-completion"),
                timeouts,
            }),
        }
    }

    /// Ask whether `page_text` serves `user_goal`. Resolves to
    /// [`Relevance::No`] when no answer arrives within the relevance deadline.
    pub async fn check_relevance(&self, user_goal: &str, page_text: &str) -> Relevance {
        let id = RequestId::generate("fp-req");
        let raw = self
            .relevance_request(id, prompts::relevance(user_goal, page_text))
            .await;
        Relevance::from_response(&raw)
    }

    /// Single-turn completion, `None` on timeout.
    pub async fn get_completion(&self, prompt: &str) -> Option<String> {
        let id = RequestId::generate("fp-ai");
        self.completion_request(id, prompt.to_string()).await
    }

    /// Number of requests still waiting for an answer.
    pub fn pending(&self) -> usize {
        self.inner.relevance.len() + self.inner.completions.len()
    }

    /// Serve window messages addressed to the top frame until the bus closes.
    pub fn spawn(self, mut port: WindowPort) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Focus Partner agent listening on {:?}", port.frame());
            while let Some(post) = port.recv().await {
                self.handle_post(post);
            }
            debug!("Agent window closed");
        })
    }

    fn handle_post(&self, post: WindowPost) {
        // Only the relay shares this window; anything posted from another
        // frame is not ours.
        if post.from != FrameId::Top {
            trace!("Agent ignored post from {:?}", post.from);
            return;
        }
        let envelope = match WindowEnvelope::from_wire(&post.data) {
            Ok(envelope) if envelope.source == Source::ContentScript => envelope,
            Ok(_) => return,
            Err(e) => {
                trace!("Agent ignored window message: {}", e);
                return;
            }
        };

        match envelope.action {
            WindowAction::CheckRelevance { payload } => {
                debug!("Agent received relevance check {}", payload.request_id);
                let agent = self.clone();
                tokio::spawn(async move {
                    let prompt = prompts::relevance(&payload.user_goal, &payload.page_text);
                    let raw = agent
                        .relevance_request(payload.request_id.clone(), prompt)
                        .await;
                    let verdict = Relevance::from_response(&raw);
                    agent.reply(WindowAction::RelevanceResponse {
                        request_id: payload.request_id,
                        response: verdict.as_str().to_string(),
                    });
                });
            }
            WindowAction::GetAiResponse { payload } => {
                debug!("Agent received completion request {}", payload.request_id);
                let agent = self.clone();
                tokio::spawn(async move {
                    let response = agent
                        .completion_request(payload.request_id.clone(), payload.prompt)
                        .await;
                    agent.reply(WindowAction::AiResponse {
                        request_id: payload.request_id,
                        response,
                    });
                });
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
            other => trace!("Agent ignored {}", other.name()),
        }
    }

    async fn relevance_request(&self, id: RequestId, prompt: String) -> String {
        let action = HubAction::PerformRelevanceCheck {
            prompt,
            request_id: id.clone(),
        };
        self.inner
            .relevance
            .request(
                id,
                &self.inner.forward,
                action,
                self.inner.timeouts.relevance,
                Relevance::No.as_str().to_string(),
            )
            .await
            .into_inner()
    }

    async fn completion_request(&self, id: RequestId, prompt: String) -> Option<String> {
        let action = HubAction::PerformAiResponse {
            prompt,
            request_id: id.clone(),
        };
        self.inner
            .completions
            .request(
                id,
                &self.inner.forward,
                action,
                self.inner.timeouts.completion,
                None,
            )
            .await
            .into_inner()
    }

    fn reply(&self, action: WindowAction) {
        let name = action.name();
        if let Err(e) = self
            .inner
            .window
            .post(&WindowEnvelope::new(Source::AiScript, action))
        {
            warn!("Agent failed to post {}: {}", name, e);
        }
    }
}
