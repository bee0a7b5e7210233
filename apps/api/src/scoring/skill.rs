//! Skill compatibility scoring — vector-space similarity between CV skills
//! and the JD's required/preferred skill sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::embedding::skill_space::{cosine_similarity, SkillSpace};
use crate::scoring::round3;

/// Weight of the required-skill similarity in the per-pass blend (α).
pub const REQUIRED_WEIGHT: f64 = 0.7;
/// Blend of the two passes: category names carry 0.2, the flattened skill
/// list 0.8 — the flattened signal is denser and more reliable.
const CATEGORY_PASS_WEIGHT: f64 = 0.2;
const FLAT_PASS_WEIGHT: f64 = 0.8;

/// Required/preferred/final similarity, each in [0, 1], rounded to 3
/// decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    pub required_score: f64,
    pub preferred_score: f64,
    pub final_score: f64,
}

/// Scores one CV skill-token set against the JD's required and preferred
/// token sets. Tokens outside the embedding vocabulary are ignored; an empty
/// or fully-unknown CV set yields the zero vector and an all-zero score.
pub fn score_cv_against_jd(
    space: &SkillSpace,
    cv_skills: &[String],
    required_techs: &[String],
    preferred_techs: &[String],
    alpha: f64,
) -> SkillScore {
    let cv_vec = space.mean_vector(cv_skills);
    let required_vec = space.mean_vector(required_techs);
    let preferred_vec = space.mean_vector(preferred_techs);

    let required_score = cosine_similarity(&cv_vec, &required_vec) as f64;
    let preferred_score = cosine_similarity(&cv_vec, &preferred_vec) as f64;
    let final_score = alpha * required_score + (1.0 - alpha) * preferred_score;

    SkillScore {
        required_score: round3(required_score),
        preferred_score: round3(preferred_score),
        final_score: round3(final_score),
    }
}

/// Full skill compatibility: one pass over the CV's skill category names,
/// one over the flattened (lowercased) skill list, blended per field.
pub fn skill_compatibility(
    space: &SkillSpace,
    skills: &BTreeMap<String, Vec<String>>,
    required_techs: &[String],
    preferred_techs: &[String],
) -> SkillScore {
    let categories: Vec<String> = skills.keys().cloned().collect();
    let flattened: Vec<String> = skills
        .values()
        .flatten()
        .map(|s| s.to_lowercase())
        .collect();

    let by_category =
        score_cv_against_jd(space, &categories, required_techs, preferred_techs, REQUIRED_WEIGHT);
    let by_flat =
        score_cv_against_jd(space, &flattened, required_techs, preferred_techs, REQUIRED_WEIGHT);

    let blend = |category: f64, flat: f64| {
        round3(CATEGORY_PASS_WEIGHT * category + FLAT_PASS_WEIGHT * flat)
    };

    SkillScore {
        required_score: blend(by_category.required_score, by_flat.required_score),
        preferred_score: blend(by_category.preferred_score, by_flat.preferred_score),
        final_score: blend(by_category.final_score, by_flat.final_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> SkillSpace {
        SkillSpace::from_entries(vec![
            ("python".to_string(), vec![1.0, 0.0, 0.0]),
            ("c++".to_string(), vec![0.8, 0.6, 0.0]),
            ("java".to_string(), vec![0.0, 0.0, 1.0]),
            ("languages".to_string(), vec![0.5, 0.5, 0.5]),
        ])
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scores_bounded_zero_to_one() {
        let s = space();
        let score = score_cv_against_jd(
            &s,
            &strings(&["python", "java"]),
            &strings(&["python", "c++"]),
            &strings(&["java"]),
            REQUIRED_WEIGHT,
        );
        for value in [score.required_score, score.preferred_score, score.final_score] {
            assert!((0.0..=1.0).contains(&value), "score {value} out of range");
        }
    }

    #[test]
    fn test_empty_cv_skills_score_zero() {
        let s = space();
        let score = score_cv_against_jd(
            &s,
            &[],
            &strings(&["python"]),
            &strings(&["java"]),
            REQUIRED_WEIGHT,
        );
        assert_eq!(score, SkillScore::default());
    }

    #[test]
    fn test_fully_unknown_cv_skills_score_zero() {
        let s = space();
        let score = score_cv_against_jd(
            &s,
            &strings(&["cobol", "fortran"]),
            &strings(&["python"]),
            &strings(&["java"]),
            REQUIRED_WEIGHT,
        );
        assert_eq!(score, SkillScore::default());
    }

    #[test]
    fn test_final_is_alpha_blend_of_required_and_preferred() {
        let s = space();
        let score = score_cv_against_jd(
            &s,
            &strings(&["python", "java"]),
            &strings(&["python", "c++"]),
            &strings(&["java"]),
            0.7,
        );
        let expected = round3(0.7 * score.required_score + 0.3 * score.preferred_score);
        assert!(
            (score.final_score - expected).abs() <= 0.001,
            "final {} vs expected {}",
            score.final_score,
            expected
        );
    }

    #[test]
    fn test_identical_sets_score_one() {
        let s = space();
        let score = score_cv_against_jd(
            &s,
            &strings(&["python"]),
            &strings(&["python"]),
            &strings(&["python"]),
            REQUIRED_WEIGHT,
        );
        assert_eq!(score.required_score, 1.0);
        assert_eq!(score.final_score, 1.0);
    }

    #[test]
    fn test_compatibility_blends_category_and_flat_passes() {
        let s = space();
        let mut skills = BTreeMap::new();
        skills.insert("languages".to_string(), vec!["Python".to_string()]);
        let required = strings(&["python"]);
        let preferred = strings(&["java"]);

        let by_category =
            score_cv_against_jd(&s, &strings(&["languages"]), &required, &preferred, 0.7);
        let by_flat = score_cv_against_jd(&s, &strings(&["python"]), &required, &preferred, 0.7);
        let combined = skill_compatibility(&s, &skills, &required, &preferred);

        let expected = round3(0.2 * by_category.final_score + 0.8 * by_flat.final_score);
        assert!((combined.final_score - expected).abs() <= 0.001);
    }

    #[test]
    fn test_compatibility_deterministic() {
        let s = space();
        let mut skills = BTreeMap::new();
        skills.insert(
            "languages".to_string(),
            vec!["Python".to_string(), "Java".to_string()],
        );
        let required = strings(&["python", "c++"]);
        let preferred = strings(&["java"]);
        let a = skill_compatibility(&s, &skills, &required, &preferred);
        let b = skill_compatibility(&s, &skills, &required, &preferred);
        assert_eq!(a, b);
    }
}
