//! Store-and-poll summary entries (`aiSummary_<id>`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    Success,
    Error,
}

/// Result written by the hub for a polling caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub summary: Option<String>,
    /// Write time in epoch milliseconds; drives the lazy sweep.
    pub timestamp: i64,
    pub status: SummaryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryEntry {
    pub fn success(summary: impl Into<String>, timestamp: i64) -> Self {
        Self {
            summary: Some(summary.into()),
            timestamp,
            status: SummaryStatus::Success,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, timestamp: i64) -> Self {
        Self {
            summary: None,
            timestamp,
            status: SummaryStatus::Error,
            error: Some(error.into()),
        }
    }

    /// The summary text, if the entry succeeded.
    pub fn into_text(self) -> Option<String> {
        match self.status {
            SummaryStatus::Success => self.summary,
            SummaryStatus::Error => None,
        }
    }
}
