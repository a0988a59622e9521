//! Prompt builders for every completion the extension requests.
//!
//! Only the hub sees the credential, but the prompts are built by whichever
//! context asks, so they live here with the rest of the shared vocabulary.

/// Relevance question answered with exactly `YES` or `NO`.
pub fn relevance(user_goal: &str, page_text: &str) -> String {
    format!(
        r#"SYSTEM INSTRUCTION:
The extracted text below represents the main content of the website the user is currently visiting, or URL context if no content is available.
The "user goal" describes what the user wants to focus on or achieve during their session.
If the page content/URL is relevant or helpful for the user's goal, respond ONLY with "YES".
If it is not relevant or helpful, respond ONLY with "NO".
No explanation, just YES or NO.

User Goal: {user_goal}
Page Content/URL Context:
{page_text}"#
    )
}

/// Acknowledgement of a freshly captured goal.
pub fn goal_acknowledgement(goal: &str) -> String {
    format!(
        r#"The user wants to focus on: "{goal}".

Acknowledge their goal in one or two encouraging sentences and ask whether they want to add any other details before starting their focus session."#
    )
}

pub fn confirmation(user_input: &str) -> String {
    format!(
        r#"User confirmed their goal with: "{user_input}".

Provide an encouraging, dynamic response acknowledging their confirmation and readiness to start their focus session. Be specific and motivating."#
    )
}

pub fn context(user_input: &str, goal: &str) -> String {
    format!(
        r#"User provided additional context about their goal: "{user_input}".

Their goal is: "{goal}"

Provide a dynamic response acknowledging their additional context and showing enthusiasm about starting their focus session. Be specific to their goal and context."#
    )
}

/// Short session-start message, under twelve words.
pub fn session_summary(goal: &str) -> String {
    format!(
        r#"Create a very short, encouraging message for starting a focus session.

Format: [Brief goal summary] + [Motivational phrase]

Examples:
- "Working on resume. Let's stay focused! 🎯"
- "Learning React. I'll help you concentrate! 💪"
- "Writing essay. Time to focus! ✨"

Keep it under 12 words total. Be encouraging and specific to their goal.

User's goal: {goal}"#
    )
}

/// One goal-grounded chat turn.
pub fn focused_chat(goal: &str, user_message: &str) -> String {
    format!(
        r#"User's current goal: "{goal}"
User's message: "{user_message}"

Please respond as a Focus Partner AI assistant. Help the user stay focused on their goal and provide relevant guidance, encouragement, or questions. Be conversational and supportive."#
    )
}
