//! Relevance verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a page is relevant to the user's goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relevance {
    Yes,
    No,
}

impl Relevance {
    /// Interpret a raw completion. Only the exact strings `"YES"` and `"NO"`
    /// are recognized; everything else fails closed to [`Relevance::No`].
    pub fn from_response(raw: &str) -> Self {
        match raw {
            "YES" => Relevance::Yes,
            _ => Relevance::No,
        }
    }

    /// Returns `true` if `raw` is one of the two recognized answers.
    pub fn is_recognized(raw: &str) -> bool {
        raw == "YES" || raw == "NO"
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relevance::Yes => "YES",
            Relevance::No => "NO",
        }
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_answers() {
        assert_eq!(Relevance::from_response("YES"), Relevance::Yes);
        assert_eq!(Relevance::from_response("NO"), Relevance::No);
    }

    #[test]
    fn test_anything_else_fails_closed() {
        for raw in ["yes", "Yes", "YES.", " YES", "YES\n", "maybe", "", "🎯 Focus"] {
            assert_eq!(Relevance::from_response(raw), Relevance::No, "{raw:?}");
            assert!(!Relevance::is_recognized(raw));
        }
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_value(Relevance::Yes).unwrap(), "YES");
        assert_eq!(Relevance::No.to_string(), "NO");
    }
}
