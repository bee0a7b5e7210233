//! Structured JD Builder — turns extracted job-description text into a typed
//! record, then enriches it with inferred branch/technology/domain/CGPA
//! facts.

pub mod builder;
pub mod enrich;

pub use builder::JdBuilder;

use serde::{Deserialize, Serialize};

/// Typed job-description record. Built once per posting;
/// re-derivable deterministically from the same source text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredJD {
    pub job_role: String,
    pub responsibilities: Vec<String>,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub eligibility: String,
    /// Work-mode string, e.g. "Remote, Hybrid". Defaults to "Remote".
    pub locations: String,
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    /// Branch phrases found in the text, title-cased. Canonicalization
    /// happens later, in the eligibility filter.
    pub branches: Vec<String>,
    /// Technologies confirmed against the skill embedding space; sorted and
    /// deduplicated.
    pub technologies: Vec<String>,
    pub non_tech_skills: Vec<String>,
    pub domain: String,
    pub min_cgpa: Option<f64>,
}
