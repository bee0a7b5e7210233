//! Parser for the narrative-feedback response.
//!
//! The response is free text expected to carry four delimited blocks in
//! order: Score, Strengths, Weaknesses, Final Recommendation. The result is
//! a tagged variant so callers can never read fields that were not parsed.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::feedback::prompts::{
    RECOMMENDATION_MARKER, SCORE_MARKER, STRENGTHS_MARKER, WEAKNESSES_MARKER,
};

/// Successfully parsed feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Two-digit score in [10, 98].
    pub score: i64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: String,
}

/// Outcome of parsing the external response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedbackOutcome {
    Parsed(FeedbackRecord),
    /// The response did not match the delimited shape; the raw text is kept
    /// as the feedback and the quantitative score stays authoritative.
    Unparsed { raw: String },
}

fn score_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // first two-digit integer, 10-99
    RE.get_or_init(|| Regex::new(r"\b([1-9][0-9])\b").expect("score regex"))
}

/// Parses the delimited feedback response. Any missing marker or missing
/// score integer degrades to `Unparsed` with the raw text.
pub fn parse_feedback(text: &str) -> FeedbackOutcome {
    let unparsed = || FeedbackOutcome::Unparsed {
        raw: text.to_string(),
    };

    let (Some(score_text), Some(strengths_text), Some(weaknesses_text), Some(recommendation)) = (
        extract_between(text, SCORE_MARKER, Some(STRENGTHS_MARKER)),
        extract_between(text, STRENGTHS_MARKER, Some(WEAKNESSES_MARKER)),
        extract_between(text, WEAKNESSES_MARKER, Some(RECOMMENDATION_MARKER)),
        extract_between(text, RECOMMENDATION_MARKER, None),
    ) else {
        return unparsed();
    };

    let Some(score) = score_re()
        .captures(score_text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
    else {
        return unparsed();
    };

    FeedbackOutcome::Parsed(FeedbackRecord {
        score,
        strengths: bullet_items(strengths_text),
        weaknesses: bullet_items(weaknesses_text),
        recommendation: recommendation.trim().to_string(),
    })
}

/// Substring between two adjacent markers; up to the end of text when
/// `end` is None or the end marker is absent. None when `start` is absent.
/// Leading '>' residue from the `<<Marker:>>` decoration is stripped.
fn extract_between<'a>(text: &'a str, start: &str, end: Option<&str>) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let rest = &text[from..];
    let until = end.and_then(|marker| rest.find(marker)).unwrap_or(rest.len());
    Some(rest[..until].trim().trim_start_matches('>').trim())
}

/// Lines beginning with "-" become list items.
fn bullet_items(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-'))
        .map(|line| line.trim_matches(['-', ' '].as_slice()).to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
