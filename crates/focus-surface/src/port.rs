//! The seam between a chat surface and the context it talks to.

use async_trait::async_trait;
use focus_protocols::{prompts, HubAction, SurfaceKind};

/// Session-level events a surface hears about from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSignal {
    /// Some context started or stopped a session.
    SessionChanged,
    ReminderRequested,
}

/// Messaging used by a [`ChatSurface`](crate::ChatSurface).
///
/// Failures never surface here: every request resolves, with `None` when
/// no answer arrived in time.
#[async_trait]
pub trait SurfacePort: Send + Sync + 'static {
    fn kind(&self) -> SurfaceKind;

    /// Single-turn completion.
    async fn complete(&self, prompt: String) -> Option<String>;

    /// Fire-and-forget notification (`goalSubmitted`, `sessionStarted`,
    /// `sessionStopped`).
    async fn notify(&self, action: HubAction);

    /// Acknowledgement of a freshly captured goal.
    async fn acknowledge_goal(&self, goal: &str) -> Option<String> {
        self.complete(prompts::goal_acknowledgement(goal)).await
    }

    /// Short session-start message.
    async fn session_summary(&self, goal: &str) -> Option<String> {
        self.complete(prompts::session_summary(goal)).await
    }
}
