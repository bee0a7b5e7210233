//! Composite scorer — fuses the skill, course, and semantic signals into one
//! normalized score, behind the eligibility gate.

use serde::{Deserialize, Serialize};

use crate::cv::StructuredCV;
use crate::embedding::sentence::SentenceEncoder;
use crate::embedding::skill_space::SkillSpace;
use crate::errors::AppError;
use crate::jd::StructuredJD;
use crate::scoring::eligibility::check_eligibility;
use crate::scoring::round3;
use crate::scoring::semantic::{
    course_match_score, evaluate_subjective_fit, CourseScore, SemanticComponents, COURSE_TOP_K,
};
use crate::scoring::skill::{skill_compatibility, SkillScore};

/// Weight of the skill signal in the final score; the rest goes to the
/// semantic signal. Product-tunable.
pub const SKILL_WEIGHT: f64 = 0.7;
/// Semantic sub-signal weights.
const JOB_ROLE_WEIGHT: f64 = 0.4;
const RESPONSIBILITY_WEIGHT: f64 = 0.3;
const VALUES_WEIGHT: f64 = 0.3;

/// Full quantitative evaluation of one (CV, JD) pair. Deterministic given
/// its inputs. Ineligible candidates carry a zero final score and no
/// breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub eligible: bool,
    pub eligibility_reason: String,
    /// Course relevance; reported but not folded into `final_score` here —
    /// it only enters the later feedback blend.
    pub course_score: Option<CourseScore>,
    pub skill_score: Option<SkillScore>,
    pub semantic_score: f64,
    pub semantic_components: Option<SemanticComponents>,
    pub final_score: f64,
}

/// Evaluates one candidate against one job: eligibility first, then the
/// similarity signals, then the fused final score.
pub async fn evaluate_cv(
    space: &SkillSpace,
    encoder: &dyn SentenceEncoder,
    jd: &StructuredJD,
    cv: &StructuredCV,
) -> Result<ScoreBreakdown, AppError> {
    let eligibility = check_eligibility(jd, cv);
    if !eligibility.eligible {
        return Ok(ScoreBreakdown {
            eligible: false,
            eligibility_reason: eligibility.reason,
            ..ScoreBreakdown::default()
        });
    }

    let course_score = course_match_score(encoder, jd, &cv.courses, COURSE_TOP_K).await?;

    let skill_score = skill_compatibility(space, &cv.skills, &jd.technologies, &jd.preferred_skills);

    let components = evaluate_subjective_fit(encoder, jd, cv).await?;
    let semantic_score = round3(
        JOB_ROLE_WEIGHT * components.job_role_fit.score
            + RESPONSIBILITY_WEIGHT * components.responsibility_alignment.score
            + VALUES_WEIGHT * components.values_match.score,
    );

    let final_score = round3(SKILL_WEIGHT * skill_score.final_score + (1.0 - SKILL_WEIGHT) * semantic_score);

    Ok(ScoreBreakdown {
        eligible: true,
        eligibility_reason: eligibility.reason,
        course_score: Some(course_score),
        skill_score: Some(skill_score),
        semantic_score,
        semantic_components: Some(components),
        final_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::EducationEntry;
    use crate::embedding::sentence::testing::LetterFrequencyEncoder;
    use std::collections::BTreeMap;

    fn space() -> SkillSpace {
        SkillSpace::from_entries(vec![
            ("python".to_string(), vec![1.0, 0.0, 0.0]),
            ("java".to_string(), vec![0.0, 1.0, 0.0]),
            ("docker".to_string(), vec![0.6, 0.8, 0.0]),
        ])
    }

    fn eligible_cv() -> StructuredCV {
        let mut skills = BTreeMap::new();
        skills.insert(
            "languages".to_string(),
            vec!["Python".to_string(), "Java".to_string()],
        );
        StructuredCV {
            branch: "CSE".to_string(),
            education: vec![EducationEntry {
                degree: "B.Tech Major in CSE".to_string(),
                institution: "Institute".to_string(),
                score: "8.5/10".to_string(),
                year: "2025".to_string(),
            }],
            skills,
            projects: vec![crate::cv::Project {
                title: "Portal".to_string(),
                date: "2024".to_string(),
                summary: "built backend services in python".to_string(),
            }],
            ..StructuredCV::default()
        }
    }

    fn jd() -> StructuredJD {
        StructuredJD {
            job_role: "backend services in python".to_string(),
            responsibilities: vec!["build services".to_string()],
            technologies: vec!["python".to_string()],
            preferred_skills: vec!["java".to_string()],
            branches: vec!["Computer Science".to_string()],
            min_cgpa: Some(8.0),
            ..StructuredJD::default()
        }
    }

    #[tokio::test]
    async fn test_ineligible_short_circuits_to_zero() {
        let mut strict = jd();
        strict.min_cgpa = Some(9.9);
        let result = evaluate_cv(&space(), &LetterFrequencyEncoder, &strict, &eligible_cv())
            .await
            .unwrap();
        assert!(!result.eligible);
        assert_eq!(result.final_score, 0.0);
        assert!(result.skill_score.is_none());
        assert!(result.semantic_components.is_none());
        assert!(result.course_score.is_none());
        assert_eq!(result.semantic_score, 0.0);
    }

    #[tokio::test]
    async fn test_eligible_reports_all_signals() {
        let result = evaluate_cv(&space(), &LetterFrequencyEncoder, &jd(), &eligible_cv())
            .await
            .unwrap();
        assert!(result.eligible);
        assert_eq!(result.eligibility_reason, "Eligible");
        let skill = result.skill_score.unwrap();
        assert!(skill.final_score > 0.0);
        assert!(result.semantic_components.is_some());
        assert!(result.final_score > 0.0);
        assert!(result.final_score <= 1.0);
    }

    #[tokio::test]
    async fn test_final_score_formula() {
        let result = evaluate_cv(&space(), &LetterFrequencyEncoder, &jd(), &eligible_cv())
            .await
            .unwrap();
        let skill = result.skill_score.unwrap();
        let expected = SKILL_WEIGHT * skill.final_score + (1.0 - SKILL_WEIGHT) * result.semantic_score;
        let expected = (expected * 1000.0).round() / 1000.0;
        assert!((result.final_score - expected).abs() <= 0.001);
    }

    #[tokio::test]
    async fn test_semantic_weighting() {
        let result = evaluate_cv(&space(), &LetterFrequencyEncoder, &jd(), &eligible_cv())
            .await
            .unwrap();
        let c = result.semantic_components.unwrap();
        let expected = 0.4 * c.job_role_fit.score
            + 0.3 * c.responsibility_alignment.score
            + 0.3 * c.values_match.score;
        let expected = (expected * 1000.0).round() / 1000.0;
        assert_eq!(result.semantic_score, expected);
    }

    #[tokio::test]
    async fn test_reproducible_bit_for_bit() {
        let s = space();
        let encoder = LetterFrequencyEncoder;
        let a = evaluate_cv(&s, &encoder, &jd(), &eligible_cv()).await.unwrap();
        let b = evaluate_cv(&s, &encoder, &jd(), &eligible_cv()).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_course_score_not_in_final() {
        // Add courses that match the JD perfectly; final_score must not move.
        let s = space();
        let encoder = LetterFrequencyEncoder;
        let without = evaluate_cv(&s, &encoder, &jd(), &eligible_cv()).await.unwrap();

        let mut with_courses = eligible_cv();
        with_courses.courses.insert(
            "core".to_string(),
            vec!["backend services in python".to_string()],
        );
        let with = evaluate_cv(&s, &encoder, &jd(), &with_courses).await.unwrap();

        assert!(with.course_score.unwrap().score > 0.9);
        assert_eq!(
            with.final_score, without.final_score,
            "course relevance is reported, not fused here"
        );
    }
}
