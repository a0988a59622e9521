//! Goal analysis prompt and parsing.

use focus_protocols::GoalAnalysis;
use tracing::warn;

pub fn goal_analysis_prompt(goal: &str) -> String {
    format!(
        r#"Given the user's stated goal: "{goal}", analyze it and return a JSON response with the following structure:
{{
  "summary": "Brief summary of the goal",
  "activity_type": "Type of activity (e.g., 'learning', 'work', 'research', 'entertainment')",
  "focus_elements": ["key", "focus", "areas"],
  "distraction_patterns": ["common", "distractions", "to", "avoid"]
}}"#
    )
}

/// Parse the model's answer, falling back to [`GoalAnalysis::fallback`].
pub fn parse_analysis(goal: &str, raw: &str) -> GoalAnalysis {
    match serde_json::from_str::<GoalAnalysis>(raw.trim()) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("Unparseable goal analysis, using fallback: {}", e);
            GoalAnalysis::fallback(goal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MOCK_RESPONSE;

    #[test]
    fn test_prompt_embeds_goal() {
        let prompt = goal_analysis_prompt("learn Spanish");
        assert!(prompt.contains(r#""learn Spanish""#));
        assert!(prompt.contains("distraction_patterns"));
    }

    #[test]
    fn test_parse_valid_json() {
        let raw = r#" {"summary":"Spanish","activity_type":"learning","focus_elements":["grammar"],"distraction_patterns":["youtube"]} "#;
        let analysis = parse_analysis("learn Spanish", raw);
        assert_eq!(analysis.activity_type, "learning");
        assert_eq!(analysis.focus_elements, vec!["grammar"]);
    }

    #[test]
    fn test_mock_text_falls_back() {
        let analysis = parse_analysis("learn Spanish", MOCK_RESPONSE);
        assert_eq!(analysis, GoalAnalysis::fallback("learn Spanish"));
    }
}
