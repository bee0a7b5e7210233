// Prompt constants for the narrative-feedback call.
//
// The delimiter tokens below are a contract shared with `feedback::parser`;
// changing them requires updating both sides.

/// System prompt for candidate feedback.
pub const FEEDBACK_SYSTEM: &str =
    "You are an HR assistant evaluating a candidate's suitability for a job role. \
    Follow the requested response format exactly.";

/// Block markers the parser searches for, in order.
pub const SCORE_MARKER: &str = "Score:";
pub const STRENGTHS_MARKER: &str = "Strengths:";
pub const WEAKNESSES_MARKER: &str = "Weaknesses:";
pub const RECOMMENDATION_MARKER: &str = "Final Recommendation:";

/// Feedback prompt template.
/// Replace: {jd_text}, {cv_text}, {cv_chunks}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Your task is to:
1. Score the candidate's resume **out of 100**, based only on your analysis, strictly from 10-98.
2. Provide specific **strengths** that align with the role.
3. Mention **weaknesses** or areas of mismatch.
4. Give a final recommendation: **Strong / Moderate / Weak fit**, with a short justification.

The system may internally estimate some match, but you must ignore those and give your own independent judgment.

Job Description:
{jd_text}

Resume Overview:
{cv_text}

Top Matching Resume Chunks:
{cv_chunks}

Respond in the following format:

<<Score:>>
(Must be a plain integer between 10 and 98 only. Do NOT return decimal or percentage.)

<<Strengths:>>
- ...

<<Weaknesses:>>
- ...

<<Final Recommendation:>>
<Strong / Moderate / Weak fit> - <your short justification>"#;

/// Fills the feedback template.
pub fn build_feedback_prompt(jd_text: &str, cv_text: &str, cv_chunks: &str) -> String {
    FEEDBACK_PROMPT_TEMPLATE
        .replace("{jd_text}", jd_text)
        .replace("{cv_text}", cv_text)
        .replace("{cv_chunks}", cv_chunks)
}
