//! Blending the quantitative composite score with the qualitative
//! narrative-feedback score.

use serde::{Deserialize, Serialize};

use crate::feedback::parser::FeedbackOutcome;
use crate::scoring::composite::ScoreBreakdown;
use crate::scoring::round2;

/// Weight of the manual (quantitative) percentage in the blend; qualitative
/// feedback carries the rest. Product-tunable.
pub const MANUAL_BLEND_WEIGHT: f64 = 0.2;
/// Below this manual percentage the quantitative signal is considered
/// unreliable and the qualitative score is used alone. Product-tunable.
pub const MANUAL_RELIABILITY_FLOOR: f64 = 30.0;

/// Terminal evaluation artifact handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedEvaluation {
    /// Blended score on the [0, 100] scale. None when the feedback response
    /// was unparseable — the stored quantitative score stays authoritative.
    pub combined_score: Option<f64>,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Mean of {course, skill.final, semantic, final} scaled to 100.
pub fn manual_percentage(breakdown: &ScoreBreakdown) -> f64 {
    let course = breakdown.course_score.as_ref().map_or(0.0, |c| c.score);
    let skill = breakdown.skill_score.map_or(0.0, |s| s.final_score);
    100.0 * (course + skill + breakdown.semantic_score + breakdown.final_score) / 4.0
}

/// Combines the quantitative breakdown with the parsed feedback.
pub fn blend_feedback(breakdown: &ScoreBreakdown, outcome: &FeedbackOutcome) -> CombinedEvaluation {
    match outcome {
        FeedbackOutcome::Parsed(record) => {
            let manual = manual_percentage(breakdown);
            let llm = record.score as f64;
            let combined = if manual >= MANUAL_RELIABILITY_FLOOR {
                round2(MANUAL_BLEND_WEIGHT * manual + (1.0 - MANUAL_BLEND_WEIGHT) * llm)
            } else {
                llm
            };
            CombinedEvaluation {
                combined_score: Some(combined),
                feedback: record.recommendation.clone(),
                strengths: record.strengths.clone(),
                weaknesses: record.weaknesses.clone(),
            }
        }
        FeedbackOutcome::Unparsed { raw } => CombinedEvaluation {
            combined_score: None,
            feedback: raw.clone(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::parser::FeedbackRecord;
    use crate::scoring::semantic::CourseScore;
    use crate::scoring::skill::SkillScore;

    fn breakdown(course: f64, skill: f64, semantic: f64, fin: f64) -> ScoreBreakdown {
        ScoreBreakdown {
            eligible: true,
            eligibility_reason: "Eligible".to_string(),
            course_score: Some(CourseScore {
                score: course,
                top_matches: Vec::new(),
            }),
            skill_score: Some(SkillScore {
                required_score: skill,
                preferred_score: skill,
                final_score: skill,
            }),
            semantic_score: semantic,
            semantic_components: None,
            final_score: fin,
        }
    }

    fn record(score: i64) -> FeedbackOutcome {
        FeedbackOutcome::Parsed(FeedbackRecord {
            score,
            strengths: vec!["strength".to_string()],
            weaknesses: vec!["weakness".to_string()],
            recommendation: "Moderate fit".to_string(),
        })
    }

    #[test]
    fn test_manual_percentage_is_scaled_mean() {
        let b = breakdown(0.4, 0.6, 0.2, 0.8);
        assert!((manual_percentage(&b) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_manual_percentage_zero_for_ineligible() {
        let b = ScoreBreakdown::default();
        assert_eq!(manual_percentage(&b), 0.0);
    }

    #[test]
    fn test_blend_above_floor_weights_llm_heavier() {
        let b = breakdown(0.4, 0.6, 0.2, 0.8); // manual = 50
        let combined = blend_feedback(&b, &record(80));
        // 0.2 * 50 + 0.8 * 80 = 74
        assert_eq!(combined.combined_score, Some(74.0));
        assert_eq!(combined.feedback, "Moderate fit");
        assert_eq!(combined.strengths, vec!["strength"]);
    }

    #[test]
    fn test_blend_below_floor_uses_llm_alone() {
        let b = breakdown(0.1, 0.1, 0.1, 0.1); // manual = 10
        let combined = blend_feedback(&b, &record(80));
        assert_eq!(combined.combined_score, Some(80.0));
    }

    #[test]
    fn test_blend_at_floor_still_blends() {
        let b = breakdown(0.3, 0.3, 0.3, 0.3); // manual = 30, inclusive bound
        let combined = blend_feedback(&b, &record(50));
        assert_eq!(combined.combined_score, Some(46.0));
    }

    #[test]
    fn test_unparsed_keeps_manual_score_authoritative() {
        let b = breakdown(0.4, 0.6, 0.2, 0.8);
        let outcome = FeedbackOutcome::Unparsed {
            raw: "free text the model sent".to_string(),
        };
        let combined = blend_feedback(&b, &outcome);
        assert_eq!(combined.combined_score, None);
        assert_eq!(combined.feedback, "free text the model sent");
        assert!(combined.strengths.is_empty());
        assert!(combined.weaknesses.is_empty());
    }

    #[test]
    fn test_blend_result_rounded_to_two_decimals() {
        let b = breakdown(0.333, 0.333, 0.333, 0.333); // manual = 33.3
        let combined = blend_feedback(&b, &record(67));
        // 0.2 * 33.3 + 0.8 * 67 = 60.26
        assert_eq!(combined.combined_score, Some(60.26));
    }
}
