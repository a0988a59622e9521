//! # Focus Surface
//!
//! The chat surfaces where a user negotiates a goal and runs a session.
//!
//! - [`machine`] - side-effect-free transition function shared by both surfaces
//! - [`ChatSurface`] - drives the machine, one turn at a time, against a [`SurfacePort`]
//! - [`PopupPort`] - talks to the hub directly
//! - [`OverlayPort`] - talks to the page's relay over window messaging

pub mod machine;
mod overlay;
mod popup;
mod port;
mod surface;

#[cfg(test)]
mod test_support;

pub use machine::{ChatState, Effect, Event, Intent, Phase, Transition};
pub use overlay::OverlayPort;
pub use popup::PopupPort;
pub use port::{SurfacePort, SurfaceSignal};
pub use surface::{ChatSurface, SESSION_SAVE_FAILED, SESSION_STARTED_FALLBACK};
