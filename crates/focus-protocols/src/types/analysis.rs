//! Goal analysis produced by the hub.

use serde::{Deserialize, Serialize};

/// Structured reading of a user's goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalAnalysis {
    pub summary: String,
    pub activity_type: String,
    #[serde(default)]
    pub focus_elements: Vec<String>,
    #[serde(default)]
    pub distraction_patterns: Vec<String>,
}

impl GoalAnalysis {
    /// Analysis used whenever the completion cannot be parsed.
    pub fn fallback(goal: &str) -> Self {
        Self {
            summary: goal.to_string(),
            activity_type: "general".to_string(),
            focus_elements: vec!["focus".to_string(), "productivity".to_string()],
            distraction_patterns: vec![
                "social media".to_string(),
                "entertainment".to_string(),
                "news".to_string(),
            ],
        }
    }
}
