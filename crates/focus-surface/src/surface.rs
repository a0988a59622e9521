//! Chat surface runtime.

use std::collections::VecDeque;
use std::sync::Arc;

use focus_protocols::{
    HubAction, KeyValueStore, SessionState, StoreError, SurfaceKind, TranscriptEntry,
};
use focus_runtime::{DraftStore, SessionRepository, TranscriptLog};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::machine::{transition, ChatState, Effect, Event};
use crate::port::{SurfacePort, SurfaceSignal};

#[cfg(test)]
#[path = "surface_tests.rs"]
mod tests;

/// Appended when a session starts and no summary could be produced.
pub const SESSION_STARTED_FALLBACK: &str =
    "🎯 Focus session started! I'll help you stay focused on your goal.";

/// Appended when the session change could not be saved.
pub const SESSION_SAVE_FAILED: &str =
    "⚠️ I couldn't save that change to your focus session. Please try again.";

struct SurfaceInner<P> {
    port: P,
    session: SessionRepository,
    transcript: TranscriptLog,
    drafts: DraftStore,
    /// Held for a whole turn, so turns run one at a time and replies land
    /// in the order their messages were sent.
    state: Mutex<ChatState>,
}

/// One chat surface (popup or overlay).
pub struct ChatSurface<P> {
    inner: Arc<SurfaceInner<P>>,
}

impl<P> Clone for ChatSurface<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P: SurfacePort> ChatSurface<P> {
    pub fn new(port: P, store: Arc<dyn KeyValueStore>) -> Self {
        let kind = port.kind();
        Self {
            inner: Arc::new(SurfaceInner {
                port,
                session: SessionRepository::new(store.clone()),
                transcript: TranscriptLog::new(store.clone(), kind),
                drafts: DraftStore::new(store, kind),
                state: Mutex::new(ChatState::default()),
            }),
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.inner.port.kind()
    }

    pub fn port(&self) -> &P {
        &self.inner.port
    }

    /// Rebuild from the store. Returns the full transcript to display.
    pub async fn init(&self) -> Result<Vec<TranscriptEntry>, StoreError> {
        let transcript = self.inner.transcript.load().await?;
        let session = self.inner.session.load().await?;
        let draft = self.inner.drafts.load().await?;
        info!(
            "{} surface opened (session active: {}, {} transcript lines)",
            self.kind().as_str(),
            session.has_active_session(),
            transcript.len()
        );
        self.run(Event::Restore {
            session,
            draft,
            transcript_empty: transcript.is_empty(),
        })
        .await;
        self.inner.transcript.load().await
    }

    /// One user turn. Returns the lines it appended.
    ///
    /// Storage failures during a turn are logged and never end it. Lines
    /// that could not be persisted are still returned for display.
    pub async fn send(&self, text: &str) -> Vec<TranscriptEntry> {
        self.run(Event::UserMessage(text.to_string())).await
    }

    /// Start the negotiated session. Does nothing unless start is available.
    pub async fn start(&self) -> Vec<TranscriptEntry> {
        self.run(Event::StartRequested).await
    }

    pub async fn stop(&self) -> Vec<TranscriptEntry> {
        self.run(Event::StopRequested).await
    }

    pub async fn remind(&self) -> Vec<TranscriptEntry> {
        self.run(Event::ReminderRequested).await
    }

    /// Re-read the session after another context changed it.
    pub async fn refresh(&self) -> Result<Vec<TranscriptEntry>, StoreError> {
        let session = self.inner.session.load().await?;
        Ok(self.run(Event::SessionObserved(session)).await)
    }

    pub async fn state(&self) -> ChatState {
        self.inner.state.lock().await.clone()
    }

    pub async fn session(&self) -> Result<SessionState, StoreError> {
        self.inner.session.load().await
    }

    pub async fn transcript(&self) -> Result<Vec<TranscriptEntry>, StoreError> {
        self.inner.transcript.load().await
    }

    /// React to signals from the port until its stream ends.
    pub fn serve_signals(&self, mut signals: mpsc::UnboundedReceiver<SurfaceSignal>) -> JoinHandle<()> {
        let surface = self.clone();
        tokio::spawn(async move {
            while let Some(signal) = signals.recv().await {
                match signal {
                    SurfaceSignal::SessionChanged => {
                        if let Err(e) = surface.refresh().await {
                            warn!("{} surface failed to handle {:?}: {}", surface.kind().as_str(), signal, e);
                        }
                    }
                    SurfaceSignal::ReminderRequested => {
                        surface.remind().await;
                    }
                }
            }
        })
    }

    async fn run(&self, event: Event) -> Vec<TranscriptEntry> {
        let mut state = self.inner.state.lock().await;
        let mut appended = Vec::new();
        let mut events = VecDeque::from([event]);

        while let Some(event) = events.pop_front() {
            let before = state.clone();
            let step = transition(&state, event);
            *state = step.state;
            for effect in step.effects {
                match self.apply(&state, effect, &mut appended).await {
                    Ok(Some(follow_up)) => events.push_back(follow_up),
                    Ok(None) => {}
                    Err(e) => {
                        // The session record is unchanged, so the surface
                        // stays where it was.
                        error!("{} surface could not save the session: {}", self.kind().as_str(), e);
                        *state = before;
                        self.append(TranscriptEntry::assistant(SESSION_SAVE_FAILED), &mut appended)
                            .await;
                        break;
                    }
                }
            }
        }
        appended
    }

    /// Run one effect. Only a failed session write is returned; other
    /// storage failures are logged where they happen.
    async fn apply(
        &self,
        state: &ChatState,
        effect: Effect,
        appended: &mut Vec<TranscriptEntry>,
    ) -> Result<Option<Event>, StoreError> {
        let inner = &self.inner;
        match effect {
            Effect::AppendUser(text) => {
                self.append(TranscriptEntry::user(text), appended).await;
            }
            Effect::Say(text) => {
                self.append(TranscriptEntry::assistant(text), appended).await;
            }
            Effect::AcknowledgeGoal { goal, fallback } => {
                let reply = inner.port.acknowledge_goal(&goal).await;
                self.reply(reply, fallback, appended).await;
                return Ok(Some(Event::AcknowledgementDelivered));
            }
            Effect::Complete { prompt, fallback } => {
                let reply = inner.port.complete(prompt).await;
                self.reply(reply, fallback, appended).await;
            }
            Effect::SubmitGoal(goal) => {
                inner.port.notify(HubAction::GoalSubmitted { goal }).await;
            }
            Effect::SaveDraft => {
                if let Err(e) = inner.drafts.save(&state.draft()).await {
                    warn!("Failed to save {} draft: {}", self.kind().as_str(), e);
                }
            }
            Effect::ClearDraft => {
                if let Err(e) = inner.drafts.clear().await {
                    warn!("Failed to clear {} draft: {}", self.kind().as_str(), e);
                }
            }
            Effect::StartSession { goal } => {
                inner.session.start_session(&goal).await?;
                let summary = inner.port.session_summary(&goal).await;
                self.reply(summary, SESSION_STARTED_FALLBACK.to_string(), appended)
                    .await;
                inner.port.notify(HubAction::SessionStarted { goal }).await;
            }
            Effect::StopSession => {
                inner.session.stop_session().await?;
                inner.port.notify(HubAction::SessionStopped).await;
            }
        }
        Ok(None)
    }

    async fn reply(
        &self,
        reply: Option<String>,
        fallback: String,
        appended: &mut Vec<TranscriptEntry>,
    ) {
        let text = match reply {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                debug!("No reply in time, using fallback line");
                fallback
            }
        };
        self.append(TranscriptEntry::assistant(text), appended).await
    }

    async fn append(&self, entry: TranscriptEntry, appended: &mut Vec<TranscriptEntry>) {
        if let Err(e) = self.inner.transcript.append(entry.clone()).await {
            warn!("Failed to persist {} transcript line: {}", self.kind().as_str(), e);
        }
        appended.push(entry);
    }
}
