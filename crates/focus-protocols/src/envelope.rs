//! Envelope primitives shared by every hop.
//!
//! ## Core Concepts
//!
//! - **Source**: capability tag of the sending component. Receivers only act on
//!   the sources they expect; anything else is ignored.
//! - **RequestId**: correlation token minted by the original requester and
//!   propagated unchanged through every hop.
//! - **ContextAddress**: where the hub pushes follow-up messages (a page tab or
//!   the popup), equivalent to the sender recorded by the extension runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tab identifier assigned by the extension runtime.
pub type TabId = u32;

/// Sending component tag carried in window envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// The content relay.
    #[serde(rename = "focuspartner-content-script")]
    ContentScript,
    /// The in-page agent living in the page's script realm.
    #[serde(rename = "focuspartner-ai-script")]
    AiScript,
    /// The chat overlay iframe.
    #[serde(rename = "focuspartner-overlay")]
    Overlay,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::ContentScript => "focuspartner-content-script",
            Source::AiScript => "focuspartner-ai-script",
            Source::Overlay => "focuspartner-overlay",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque correlation token.
///
/// Uniqueness is practical, not guaranteed: a millisecond timestamp plus a
/// random v4 UUID is far beyond what a few in-flight requests need.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Mint a fresh id, e.g. `fp-req-1718000000000-6f1c...`.
    pub fn generate(prefix: &str) -> Self {
        Self(format!(
            "{}-{}-{}",
            prefix,
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a window (top frame or iframe) inside one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameId {
    /// The page's own top-level window, shared by relay and agent.
    Top,
    /// The overlay iframe, a distinct window.
    Overlay,
    /// Any other frame (third-party iframes, ads, ...).
    Foreign(u32),
}

/// Push destination for hub follow-up messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextAddress {
    Tab(TabId),
    Popup,
}

impl ContextAddress {
    pub fn is_tab(&self) -> bool {
        matches!(self, ContextAddress::Tab(_))
    }
}

impl fmt::Display for ContextAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextAddress::Tab(id) => write!(f, "tab:{}", id),
            ContextAddress::Popup => f.write_str("popup"),
        }
    }
}
