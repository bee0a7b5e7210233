//! Course and free-text semantic matching.
//!
//! Each candidate text unit is scored against a JD query by two independent
//! methods — sentence-embedding cosine and token-level fuzzy similarity —
//! and the two results merge keeping the maximum per unit. That rewards
//! either exact wording or semantic closeness; averaging would punish both.

use serde::{Deserialize, Serialize};

use crate::cv::StructuredCV;
use crate::embedding::sentence::SentenceEncoder;
use crate::embedding::skill_space::cosine_similarity;
use crate::errors::AppError;
use crate::jd::StructuredJD;
use crate::scoring::round3;

/// Top-k window for course relevance.
pub const COURSE_TOP_K: usize = 5;
/// Top-k window for paragraph matches.
pub const PARAGRAPH_TOP_K: usize = 3;

/// Score and ranked evidence for one paragraph-match signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticSection {
    pub score: f64,
    pub top_matches: Vec<TopMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMatch {
    /// Matched CV text, truncated for storage.
    pub text: String,
    pub score: f64,
}

/// Score and ranked evidence for the course-relevance signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseScore {
    pub score: f64,
    pub top_matches: Vec<CourseMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseMatch {
    pub course: String,
    pub score: f64,
    /// Which method won for this course: "embedding" or "fuzzy".
    pub match_type: String,
}

/// The three paragraph-match signals feeding the composite semantic score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticComponents {
    pub job_role_fit: SemanticSection,
    pub responsibility_alignment: SemanticSection,
    pub values_match: SemanticSection,
}

/// Sentence-embedding similarity between a JD text block and a set of CV
/// free-text units; the top-k matches are averaged into the section score.
pub async fn semantic_paragraph_match(
    encoder: &dyn SentenceEncoder,
    jd_text: &str,
    cv_texts: &[String],
    top_k: usize,
) -> Result<SemanticSection, AppError> {
    let jd_text = clean_whitespace(jd_text);
    let cv_texts: Vec<String> = cv_texts
        .iter()
        .map(|t| clean_whitespace(t))
        .filter(|t| !t.is_empty())
        .collect();

    if jd_text.is_empty() || cv_texts.is_empty() {
        return Ok(SemanticSection::default());
    }

    let mut inputs = Vec::with_capacity(cv_texts.len() + 1);
    inputs.push(jd_text);
    inputs.extend(cv_texts.iter().cloned());
    let embeddings = encoder.encode(&inputs).await?;
    let (jd_emb, cv_embs) = embeddings
        .split_first()
        .ok_or_else(|| AppError::Embedding("Encoder returned no vectors".to_string()))?;

    let mut scored: Vec<TopMatch> = cv_texts
        .iter()
        .zip(cv_embs)
        .map(|(text, emb)| TopMatch {
            text: truncate(text, 120),
            score: round3(cosine_similarity(jd_emb, emb) as f64),
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);

    let score = round3(scored.iter().map(|m| m.score).sum::<f64>() / scored.len() as f64);
    Ok(SemanticSection {
        score,
        top_matches: scored,
    })
}

/// Course relevance: every course title is scored against the JD's
/// technology/role/skills text by both methods; the per-course maximum is
/// kept, the set ranked, and the top-k averaged.
pub async fn course_match_score(
    encoder: &dyn SentenceEncoder,
    jd: &StructuredJD,
    courses: &std::collections::BTreeMap<String, Vec<String>>,
    top_k: usize,
) -> Result<CourseScore, AppError> {
    let jd_text = [
        jd.technologies.join(" "),
        jd.job_role.clone(),
        jd.required_skills.join(" "),
        jd.preferred_skills.join(" "),
    ]
    .into_iter()
    .filter(|part| !part.trim().is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    let course_list: Vec<String> = courses.values().flatten().cloned().collect();
    if jd_text.trim().is_empty() || course_list.is_empty() {
        return Ok(CourseScore::default());
    }

    let mut inputs = Vec::with_capacity(course_list.len() + 1);
    inputs.push(jd_text.clone());
    inputs.extend(course_list.iter().cloned());
    let embeddings = encoder.encode(&inputs).await?;
    let (jd_emb, course_embs) = embeddings
        .split_first()
        .ok_or_else(|| AppError::Embedding("Encoder returned no vectors".to_string()))?;

    let jd_lower = jd_text.to_lowercase();
    let mut best: Vec<CourseMatch> = Vec::new();
    for (course, emb) in course_list.iter().zip(course_embs) {
        let embedding_score = round3(cosine_similarity(jd_emb, emb) as f64);
        let fuzzy_score = round3(partial_ratio(&course.to_lowercase(), &jd_lower));
        let (score, match_type) = if fuzzy_score > embedding_score {
            (fuzzy_score, "fuzzy")
        } else {
            (embedding_score, "embedding")
        };

        // Deduplicate by course title, keeping the maximum score.
        match best.iter_mut().find(|m| m.course == *course) {
            Some(existing) if existing.score >= score => {}
            Some(existing) => {
                existing.score = score;
                existing.match_type = match_type.to_string();
            }
            None => best.push(CourseMatch {
                course: course.clone(),
                score,
                match_type: match_type.to_string(),
            }),
        }
    }

    best.sort_by(|a, b| b.score.total_cmp(&a.score));
    best.truncate(top_k);
    let score = round3(best.iter().map(|m| m.score).sum::<f64>() / best.len() as f64);

    Ok(CourseScore {
        score,
        top_matches: best,
    })
}

/// The three subjective-fit signals: role fit against project summaries,
/// responsibility alignment against projects/positions/activities, and
/// values match against achievements/activities/positions.
pub async fn evaluate_subjective_fit(
    encoder: &dyn SentenceEncoder,
    jd: &StructuredJD,
    cv: &StructuredCV,
) -> Result<SemanticComponents, AppError> {
    let projects: Vec<String> = cv.projects.iter().map(|p| p.summary.clone()).collect();

    let mut responsibility_texts = projects.clone();
    responsibility_texts.extend(cv.positions.iter().cloned());
    responsibility_texts.extend(cv.extracurriculars.iter().cloned());

    let mut values_texts = cv.achievements.clone();
    values_texts.extend(cv.extracurriculars.iter().cloned());
    values_texts.extend(cv.positions.iter().cloned());

    Ok(SemanticComponents {
        job_role_fit: semantic_paragraph_match(encoder, &jd.job_role, &projects, PARAGRAPH_TOP_K)
            .await?,
        responsibility_alignment: semantic_paragraph_match(
            encoder,
            &jd.responsibilities.join(" "),
            &responsibility_texts,
            PARAGRAPH_TOP_K,
        )
        .await?,
        values_match: semantic_paragraph_match(
            encoder,
            &jd.values.join(" "),
            &values_texts,
            PARAGRAPH_TOP_K,
        )
        .await?,
    })
}

/// Best similarity of the shorter string against any equal-length window of
/// the longer, normalized to [0, 1]. The token-level counterpart of the
/// embedding cosine.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    if short.is_empty() {
        return 0.0;
    }

    let long_chars: Vec<char> = long.chars().collect();
    let window = short.chars().count();
    if long_chars.len() == window {
        return strsim::normalized_levenshtein(short, long);
    }

    let mut best = 0.0f64;
    for slice in long_chars.windows(window) {
        let candidate: String = slice.iter().collect();
        let sim = strsim::normalized_levenshtein(short, &candidate);
        if sim > best {
            best = sim;
            if best >= 1.0 {
                break;
            }
        }
    }
    best
}

fn clean_whitespace(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
