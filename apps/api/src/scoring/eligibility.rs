//! Eligibility filter — hard pass/fail gates evaluated before any scoring.
//!
//! Two gates in order: branch, then CGPA. Either gate failing halts
//! evaluation with a terminal reason string; this is a business decision,
//! not an error.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cv::StructuredCV;
use crate::jd::StructuredJD;

pub const REASON_ELIGIBLE: &str = "Eligible";
pub const REASON_BRANCH: &str = "Branch not allowed";
pub const REASON_CGPA: &str = "CGPA below required minimum";

/// Branch synonym → canonical token table. Canonicalization is idempotent:
/// canonical tokens are their own synonyms.
const BRANCH_EQUIVALENTS: &[(&str, &[&str])] = &[
    (
        "cs",
        &[
            "computer science",
            "cse",
            "computer science and engineering",
            "cs",
            "it",
            "information technology",
        ],
    ),
    (
        "dsai",
        &[
            "artificial intelligence",
            "ai",
            "dsai",
            "artificial intelligence and data science",
            "data science and artificial intelligence",
            "data science",
        ],
    ),
    (
        "ece",
        &["electronics", "electronics and communication engineering", "ece"],
    ),
    ("ee", &["electrical", "ee", "electrical engineering"]),
    ("me", &["mechanical", "me", "mech", "mechanical engineering"]),
    ("civil", &["civil", "civil engineering"]),
    ("math", &["mathematics", "math", "mathematics and computing"]),
    ("chemical", &["chemical engineering", "chemical", "che", "chem"]),
    ("ep", &["engineering physics", "ep"]),
    (
        "bsbe",
        &["biosciences and bioengineering", "bsbe", "bioengineering", "biotechnology"],
    ),
];

/// Maps a branch name to its canonical token; unknown names pass through
/// lowercased and trimmed.
pub fn normalize_branch(name: &str) -> String {
    let name = name.trim().to_lowercase();
    for (canonical, synonyms) in BRANCH_EQUIVALENTS {
        if synonyms.contains(&name.as_str()) {
            return canonical.to_string();
        }
    }
    name
}

/// Outcome of the eligibility gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub reason: String,
}

impl EligibilityResult {
    fn pass() -> Self {
        Self {
            eligible: true,
            reason: REASON_ELIGIBLE.to_string(),
        }
    }

    fn fail(reason: &str) -> Self {
        Self {
            eligible: false,
            reason: reason.to_string(),
        }
    }
}

fn score_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}(?:\.\d{1,2})?)").expect("score regex"))
}

/// Runs the branch gate, then the CGPA gate.
pub fn check_eligibility(jd: &StructuredJD, cv: &StructuredCV) -> EligibilityResult {
    // Branch gate: canonical JD branches vs canonical CV branches, the
    // latter drawn from the top-level branch and from synonyms appearing in
    // education degree lines.
    let jd_branches: BTreeSet<String> = jd.branches.iter().map(|b| normalize_branch(b)).collect();

    let mut cv_branches: BTreeSet<String> = BTreeSet::new();
    if !cv.branch.trim().is_empty() {
        cv_branches.insert(normalize_branch(&cv.branch));
    }
    for edu in &cv.education {
        let degree = edu.degree.to_lowercase();
        for (canonical, synonyms) in BRANCH_EQUIVALENTS {
            if synonyms.iter().any(|syn| degree.contains(syn)) {
                cv_branches.insert(canonical.to_string());
            }
        }
    }

    if !jd_branches.is_empty() && jd_branches.intersection(&cv_branches).next().is_none() {
        return EligibilityResult::fail(REASON_BRANCH);
    }

    // CGPA gate: any education entry whose first numeric token clears the
    // minimum passes the candidate.
    if let Some(min_cgpa) = jd.min_cgpa {
        for edu in &cv.education {
            let parsed = score_number_re()
                .captures(&edu.score)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok());
            if let Some(cgpa) = parsed {
                if cgpa >= min_cgpa {
                    return EligibilityResult::pass();
                }
            }
        }
        return EligibilityResult::fail(REASON_CGPA);
    }

    EligibilityResult::pass()
}
