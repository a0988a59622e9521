//! Hub dispatcher.

use std::sync::Arc;
use std::time::Duration;

use focus_protocols::types::now_millis;
use focus_protocols::{
    ContextAddress, GoalAnalysis, HubAck, HubAction, HubNotice, KeyValueStore, RequestId,
    SummaryEntry,
};
use focus_runtime::{ContextRouter, HubMailbox, HubMessage, SessionRepository};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::analysis::{goal_analysis_prompt, parse_analysis};
use crate::completion::FallbackCompletion;
use crate::summary;

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;

const DEFAULT_SUMMARY_RETENTION: Duration = Duration::from_secs(5 * 60);

struct HubInner {
    store: Arc<dyn KeyValueStore>,
    session: SessionRepository,
    completion: FallbackCompletion,
    router: ContextRouter,
    summary_retention: Duration,
}

/// The service worker hub.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        completion: FallbackCompletion,
        router: ContextRouter,
    ) -> Self {
        Self::with_summary_retention(store, completion, router, DEFAULT_SUMMARY_RETENTION)
    }

    pub fn with_summary_retention(
        store: Arc<dyn KeyValueStore>,
        completion: FallbackCompletion,
        router: ContextRouter,
        summary_retention: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(HubInner {
                session: SessionRepository::new(store.clone()),
                store,
                completion,
                router,
                summary_retention,
            }),
        }
    }

    pub fn router(&self) -> &ContextRouter {
        &self.inner.router
    }

    /// Browser startup: the extension starts inactive.
    pub async fn on_startup(&self) {
        info!(
            "Focus Partner hub started (completion backend configured: {})",
            self.inner.completion.is_configured()
        );
        if let Err(e) = self.inner.session.set_active(false).await {
            error!("Failed to reset isActive on startup: {}", e);
        }
    }

    /// Serve the mailbox until every sender is gone.
    pub fn spawn(self, mut mailbox: HubMailbox) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(message) = mailbox.recv().await {
                self.handle_message(message).await;
            }
            debug!("Hub mailbox closed");
        })
    }

    /// Parse, dispatch and acknowledge one message.
    pub async fn handle_message(&self, message: HubMessage) {
        let HubMessage {
            message,
            sender,
            ack,
        } = message;

        let reply = match serde_json::from_value::<HubAction>(message) {
            Ok(action) => {
                debug!("Hub received {} from {}", action.name(), sender);
                self.dispatch(action, sender).await
            }
            Err(e) => {
                warn!("Hub rejected message from {}: {}", sender, e);
                HubAck::unknown_action()
            }
        };

        if ack.send(reply).is_err() {
            debug!("Sender {} went away before the acknowledgement", sender);
        }
    }

    /// Handle one action. State queries and session lifecycle writes complete
    /// before the acknowledgement; completions are acknowledged at once and
    /// finish in the background.
    pub async fn dispatch(&self, action: HubAction, sender: ContextAddress) -> HubAck {
        match action {
            HubAction::Activate => self.set_active(true).await,
            HubAction::Deactivate => self.set_active(false).await,
            HubAction::GetState => match self.inner.session.load().await {
                Ok(state) => HubAck::state(state.is_active),
                Err(e) => {
                    warn!("getState failed: {}", e);
                    HubAck::state(false)
                }
            },
            HubAction::GoalSubmitted { goal } => {
                let hub = self.clone();
                tokio::spawn(async move {
                    hub.analyze_and_store(&goal).await;
                });
                HubAck::ok()
            }
            HubAction::AnalyzeGoal { goal, message_id } => {
                let hub = self.clone();
                tokio::spawn(async move {
                    hub.handle_goal_analysis(goal, message_id, sender).await;
                });
                HubAck::ok()
            }
            // Lifecycle writes stay on the mailbox task so a stop can never
            // be overtaken by the start sent before it.
            HubAction::SessionStarted { goal } => {
                self.handle_session_started(goal).await;
                HubAck::ok()
            }
            HubAction::SessionStopped => {
                self.handle_session_stopped().await;
                HubAck::ok()
            }
            HubAction::GenerateAiSummary { prompt, message_id } => {
                let hub = self.clone();
                tokio::spawn(async move {
                    hub.handle_summary(prompt, message_id).await;
                });
                HubAck::ok()
            }
            HubAction::PerformRelevanceCheck { prompt, request_id } => {
                let hub = self.clone();
                tokio::spawn(async move {
                    hub.handle_relevance_check(prompt, request_id, sender).await;
                });
                HubAck::ok()
            }
            HubAction::PerformAiResponse { prompt, request_id } => {
                let hub = self.clone();
                tokio::spawn(async move {
                    hub.handle_ai_response(prompt, request_id, sender).await;
                });
                HubAck::ok()
            }
        }
    }

    async fn set_active(&self, active: bool) -> HubAck {
        match self.inner.session.set_active(active).await {
            Ok(()) => {
                info!("Extension {}", if active { "activated" } else { "deactivated" });
                HubAck::ok()
            }
            Err(e) => HubAck::error(e.to_string()),
        }
    }

    async fn analyze_and_store(&self, goal: &str) -> GoalAnalysis {
        let raw = self.inner.completion.complete(&goal_analysis_prompt(goal)).await;
        let analysis = parse_analysis(goal, &raw);
        match self.inner.session.save_analysis(&analysis).await {
            Ok(()) => debug!("Stored analysis for goal {:?}", goal),
            Err(e) => error!("Failed to store goal analysis: {}", e),
        }
        analysis
    }

    async fn handle_goal_analysis(
        &self,
        goal: String,
        message_id: RequestId,
        sender: ContextAddress,
    ) {
        let analysis = self.analyze_and_store(&goal).await;
        let notice = HubNotice::GoalAnalyzed {
            goal,
            analysis,
            message_id,
        };
        self.push(sender, &notice);
    }

    async fn handle_session_started(&self, goal: String) {
        if let Err(e) = self.inner.session.start_session(&goal).await {
            error!("Failed to store session start: {}", e);
            return;
        }
        let reached = self.inner.router.broadcast_tabs(&HubNotice::SessionStarted { goal });
        debug!("sessionStarted broadcast to {} tabs", reached);
    }

    async fn handle_session_stopped(&self) {
        if let Err(e) = self.inner.session.stop_session().await {
            error!("Failed to clear session data: {}", e);
        }
        let reached = self.inner.router.broadcast_tabs(&HubNotice::SessionStopped);
        debug!("sessionStopped broadcast to {} tabs", reached);
    }

    async fn handle_summary(&self, prompt: String, message_id: RequestId) {
        let text = self.inner.completion.complete(&prompt).await;
        let entry = SummaryEntry::success(text, now_millis());
        if let Err(e) = summary::write_summary(
            &self.inner.store,
            message_id.as_str(),
            &entry,
            self.inner.summary_retention,
        )
        .await
        {
            error!("Failed to store summary {}: {}", message_id, e);
        }
    }

    async fn handle_relevance_check(
        &self,
        prompt: String,
        request_id: RequestId,
        sender: ContextAddress,
    ) {
        let response = self.inner.completion.complete(&prompt).await;
        debug!("Relevance check {} answered: {:?}", request_id, response);
        self.push(
            sender,
            &HubNotice::RelevanceCheckResponse {
                request_id,
                response,
            },
        );
    }

    async fn handle_ai_response(
        &self,
        prompt: String,
        request_id: RequestId,
        sender: ContextAddress,
    ) {
        let response = self.inner.completion.complete(&prompt).await;
        self.push(
            sender,
            &HubNotice::AiResponseResponse {
                request_id,
                response: Some(response),
            },
        );
    }

    fn push(&self, address: ContextAddress, notice: &HubNotice) {
        if let Err(e) = self.inner.router.push(address, notice) {
            warn!("Could not deliver {} to {}: {}", notice.name(), address, e);
        }
    }
}
