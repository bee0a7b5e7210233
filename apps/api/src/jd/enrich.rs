//! Inferred JD facts: branches, technologies, soft skills, minimum CGPA,
//! and domain. All scans run over the lowercased concatenation of the JD's
//! structured text fields.

use std::collections::BTreeSet;

use regex::Regex;

use crate::embedding::skill_space::SkillSpace;
use crate::vocab::{contains_token, BRANCH_KEYWORDS, DOMAIN_KEYWORDS, NON_TECH_KEYWORDS};

/// Cosine threshold for confirming a vocabulary term against a JD word.
pub const TECH_SIMILARITY_THRESHOLD: f32 = 0.8;

/// Exact-phrase branch detection; matched phrases are title-cased. No
/// synonym dedup here — canonicalization is the eligibility filter's job.
pub fn detect_branches(full_text: &str) -> Vec<String> {
    BRANCH_KEYWORDS
        .iter()
        .filter(|branch| contains_token(full_text, branch))
        .map(|branch| title_case(branch))
        .collect()
}

/// Two-stage technology detection over the skill-space vocabulary: a cheap
/// substring pre-filter against each JD word bounds the candidate set before
/// the vector lookup confirms with cosine similarity. Accepted terms come
/// back sorted and deduplicated.
pub fn detect_technologies(full_text: &str, space: &SkillSpace) -> Vec<String> {
    let words: Vec<&str> = full_text.split_whitespace().collect();
    let mut matched: BTreeSet<String> = BTreeSet::new();

    for term in space.vocab() {
        for word in &words {
            if !word.contains(term) && !term.contains(*word) {
                continue;
            }
            match space.similarity(word, term) {
                Some(sim) if sim >= TECH_SIMILARITY_THRESHOLD => {
                    matched.insert(term.to_string());
                    break;
                }
                _ => {}
            }
        }
    }

    matched.into_iter().collect()
}

/// Exact word-boundary match against the fixed soft-skill vocabulary.
pub fn detect_non_tech_skills(full_text: &str) -> Vec<String> {
    NON_TECH_KEYWORDS
        .iter()
        .filter(|kw| contains_token(full_text, kw))
        .map(|kw| kw.to_string())
        .collect()
}

/// Minimum CGPA: "CGPA"/"CPI"/"GPA" followed within 5 characters by a one- or
/// two-digit (optionally decimal) number.
pub fn detect_min_cgpa(full_text: &str, re: &Regex) -> Option<f64> {
    re.captures(full_text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// First domain in the fixed ordered table with any substring hit; "General"
/// when nothing matches.
pub fn detect_domain(full_text: &str) -> String {
    for (domain, keywords) in DOMAIN_KEYWORDS {
        if keywords.iter().any(|kw| full_text.contains(kw)) {
            return domain.to_string();
        }
    }
    "General".to_string()
}

fn title_case(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
