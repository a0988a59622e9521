//! # Focus Page
//!
//! The two contexts living inside every browsed page:
//!
//! - [`ContentRelay`] - bridges window messaging and the hub, runs the
//!   session relevance check on load and on navigation
//! - [`PageAgent`] - the page-realm script issuing relevance checks and
//!   completions through the relay
//!
//! Both listen on the page's top frame of a [`WindowBus`](focus_runtime::WindowBus).

mod agent;
mod page;
mod relay;

pub use agent::{AgentTimeouts, PageAgent};
pub use page::{PageSource, StaticPage};
pub use relay::{ContentRelay, RelayTimings, Verdict};
