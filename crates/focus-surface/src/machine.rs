//! Goal negotiation and session state machine.
//!
//! ```text
//! Idle --message--> GoalCaptured --reply--> AwaitingConfirmation
//!   ^                                         |  confirm / context: ready
//!   |<------------------ decline -------------+
//!   |                                         |  start (ready only)
//!   +<------------------ stop ---------- SessionActive
//! ```
//!
//! [`transition`] performs no I/O. It returns the next state and the
//! [`Effect`]s the surface must carry out, in order.

use focus_protocols::{prompts, SessionState, SurfaceDraft};
use serde::Serialize;

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;

pub const GREETING: &str = "Hi! I'm your Focus Partner. What are you planning to focus on today?";
pub const DECLINE_REPLY: &str = "No problem! What would you like to focus on instead?";
pub const CONFIRM_FALLBACK: &str =
    "Perfect! Ready to start your focus session. Click 'Start Focus Session' when you're ready!";
pub const CHAT_FALLBACK: &str =
    "I'm here to help you stay focused on your goal. How can I assist you with that?";

const CONFIRM_KEYWORDS: [&str; 4] = ["yes", "confirm", "start", "go"];
const DECLINE_KEYWORDS: [&str; 2] = ["no", "cancel"];

pub fn welcome_back(goal: &str) -> String {
    format!("Welcome back! Your focus session is still active. Goal: \"{}\"", goal)
}

pub fn acknowledgement_fallback(goal: &str) -> String {
    format!(
        "Great! I understand you want to focus on \"{}\". Do you want to add any other details before starting your session?",
        goal
    )
}

pub fn context_fallback(goal: &str) -> String {
    format!(
        "Got it! Your goal is now: \"{}\". Click 'Start Focus Session' when you're ready!",
        goal
    )
}

/// Reminder line number `count` (1-based), rotating through five phrasings.
pub fn reminder(goal: &str, count: u32) -> String {
    match count % 5 {
        0 => format!("Remember your goal: \"{}\". How can I help you stay focused?", goal),
        1 => format!("You're working on: \"{}\". What's your next step?", goal),
        2 => format!("Stay focused on: \"{}\". Need any guidance?", goal),
        3 => format!("Your focus goal: \"{}\". How's it going?", goal),
        _ => format!("Keep working on: \"{}\". Any questions?", goal),
    }
}

/// Where the conversation is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    /// A goal was typed; its acknowledgement is on the way.
    GoalCaptured,
    /// `ready` once the user confirmed or added context; start is only
    /// accepted then.
    AwaitingConfirmation { ready: bool },
    SessionActive,
}

/// In-memory view of one surface. Rebuilt from the store on initialization
/// and whenever another context reports a session change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatState {
    #[serde(flatten)]
    pub phase: Phase,
    pub goal: Option<String>,
    /// Reminders shown this session.
    pub reminders: u32,
}

impl ChatState {
    pub fn can_start(&self) -> bool {
        matches!(self.phase, Phase::AwaitingConfirmation { ready: true }) && self.goal.is_some()
    }

    pub fn in_session(&self) -> bool {
        self.phase == Phase::SessionActive
    }

    /// Draft to persist while the goal is being negotiated.
    pub fn draft(&self) -> SurfaceDraft {
        SurfaceDraft {
            goal: self.goal.clone(),
            ready_to_start: self.can_start(),
        }
    }
}

/// How a reply to "is that your goal?" is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Confirm,
    Decline,
    /// Anything else adds detail to the goal.
    Context,
}

impl Intent {
    /// Exact keyword first, then any keyword as a whole word. Confirmation
    /// wins over decline.
    pub fn classify(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        if CONFIRM_KEYWORDS.contains(&normalized.as_str()) {
            return Intent::Confirm;
        }
        if DECLINE_KEYWORDS.contains(&normalized.as_str()) {
            return Intent::Decline;
        }

        let words: Vec<&str> = normalized
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .collect();
        if words.iter().any(|w| CONFIRM_KEYWORDS.contains(w)) {
            Intent::Confirm
        } else if words.iter().any(|w| DECLINE_KEYWORDS.contains(w)) {
            Intent::Decline
        } else {
            Intent::Context
        }
    }
}

/// Inputs to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Surface opened: rebuild from the store.
    Restore {
        session: SessionState,
        draft: Option<SurfaceDraft>,
        transcript_empty: bool,
    },
    UserMessage(String),
    /// The goal acknowledgement was appended (reply or fallback).
    AcknowledgementDelivered,
    StartRequested,
    StopRequested,
    ReminderRequested,
    /// Another context changed the session; re-read from the store.
    SessionObserved(SessionState),
}

/// Work the surface performs after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AppendUser(String),
    Say(String),
    /// Acknowledge a new goal; feeds back [`Event::AcknowledgementDelivered`].
    AcknowledgeGoal { goal: String, fallback: String },
    Complete { prompt: String, fallback: String },
    SubmitGoal(String),
    SaveDraft,
    ClearDraft,
    StartSession { goal: String },
    StopSession,
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ChatState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(state: &ChatState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

pub fn transition(state: &ChatState, event: Event) -> Transition {
    match event {
        Event::Restore {
            session,
            draft,
            transcript_empty,
        } => restore(session, draft, transcript_empty),
        Event::UserMessage(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Transition::stay(state);
            }
            on_message(state, text)
        }
        Event::AcknowledgementDelivered => match state.phase {
            Phase::GoalCaptured => Transition {
                state: ChatState {
                    phase: Phase::AwaitingConfirmation { ready: false },
                    ..state.clone()
                },
                effects: vec![Effect::SaveDraft],
            },
            _ => Transition::stay(state),
        },
        Event::StartRequested => match (&state.goal, state.can_start()) {
            (Some(goal), true) => Transition {
                state: ChatState {
                    phase: Phase::SessionActive,
                    goal: Some(goal.clone()),
                    reminders: 0,
                },
                effects: vec![
                    Effect::ClearDraft,
                    Effect::StartSession { goal: goal.clone() },
                ],
            },
            _ => Transition::stay(state),
        },
        Event::StopRequested if state.in_session() => Transition {
            state: ChatState::default(),
            effects: vec![Effect::StopSession, Effect::Say(GREETING.to_string())],
        },
        Event::StopRequested => Transition::stay(state),
        Event::ReminderRequested => match (&state.goal, state.in_session()) {
            (Some(goal), true) => {
                let reminders = state.reminders + 1;
                Transition {
                    state: ChatState {
                        reminders,
                        ..state.clone()
                    },
                    effects: vec![Effect::Say(reminder(goal, reminders))],
                }
            }
            _ => Transition::stay(state),
        },
        Event::SessionObserved(session) => observe(state, session),
    }
}

fn restore(session: SessionState, draft: Option<SurfaceDraft>, transcript_empty: bool) -> Transition {
    if session.has_active_session() {
        let effects = if transcript_empty {
            vec![Effect::Say(welcome_back(&session.user_goal))]
        } else {
            Vec::new()
        };
        return Transition {
            state: ChatState {
                phase: Phase::SessionActive,
                goal: Some(session.user_goal),
                reminders: 0,
            },
            effects,
        };
    }

    let greeting = if transcript_empty {
        vec![Effect::Say(GREETING.to_string())]
    } else {
        Vec::new()
    };
    let state = match draft {
        Some(SurfaceDraft {
            goal: Some(goal),
            ready_to_start,
        }) => ChatState {
            phase: Phase::AwaitingConfirmation {
                ready: ready_to_start,
            },
            goal: Some(goal),
            reminders: 0,
        },
        _ => ChatState::default(),
    };
    Transition {
        state,
        effects: greeting,
    }
}

fn on_message(state: &ChatState, text: &str) -> Transition {
    let user = Effect::AppendUser(text.to_string());
    match (state.phase, &state.goal) {
        (Phase::SessionActive, Some(goal)) => Transition {
            state: state.clone(),
            effects: vec![
                user,
                Effect::Complete {
                    prompt: prompts::focused_chat(goal, text),
                    fallback: CHAT_FALLBACK.to_string(),
                },
            ],
        },
        (Phase::AwaitingConfirmation { .. }, Some(goal)) => match Intent::classify(text) {
            Intent::Confirm => Transition {
                state: ChatState {
                    phase: Phase::AwaitingConfirmation { ready: true },
                    ..state.clone()
                },
                effects: vec![
                    user,
                    Effect::Complete {
                        prompt: prompts::confirmation(text),
                        fallback: CONFIRM_FALLBACK.to_string(),
                    },
                    Effect::SaveDraft,
                ],
            },
            Intent::Decline => Transition {
                state: ChatState::default(),
                effects: vec![user, Effect::Say(DECLINE_REPLY.to_string()), Effect::ClearDraft],
            },
            Intent::Context => {
                let goal = format!("{} ({})", goal, text);
                Transition {
                    state: ChatState {
                        phase: Phase::AwaitingConfirmation { ready: true },
                        goal: Some(goal.clone()),
                        reminders: 0,
                    },
                    effects: vec![
                        user,
                        Effect::Complete {
                            prompt: prompts::context(text, &goal),
                            fallback: context_fallback(&goal),
                        },
                        Effect::SaveDraft,
                    ],
                }
            }
        },
        _ => {
            let goal = text.to_string();
            Transition {
                state: ChatState {
                    phase: Phase::GoalCaptured,
                    goal: Some(goal.clone()),
                    reminders: 0,
                },
                effects: vec![
                    user,
                    Effect::SubmitGoal(goal.clone()),
                    Effect::AcknowledgeGoal {
                        fallback: acknowledgement_fallback(&goal),
                        goal,
                    },
                ],
            }
        }
    }
}

fn observe(state: &ChatState, session: SessionState) -> Transition {
    match (state.in_session(), session.has_active_session()) {
        (false, true) => Transition {
            state: ChatState {
                phase: Phase::SessionActive,
                goal: Some(session.user_goal),
                reminders: 0,
            },
            effects: vec![Effect::ClearDraft],
        },
        (true, false) => Transition {
            state: ChatState::default(),
            effects: vec![Effect::Say(GREETING.to_string())],
        },
        (true, true) if state.goal.as_deref() != Some(session.user_goal.as_str()) => Transition {
            state: ChatState {
                goal: Some(session.user_goal),
                ..state.clone()
            },
            effects: Vec::new(),
        },
        _ => Transition::stay(state),
    }
}
