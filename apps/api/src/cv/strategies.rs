//! Per-field extraction strategies for résumé sections.
//!
//! Each strategy maps one section's text to one typed field and is tolerant
//! by construction: malformed rows produce partial values, never errors.
//! Template changes mean adding or adjusting a strategy, not touching the
//! builder.

use std::collections::{BTreeMap, BTreeSet};

use crate::cv::{EducationEntry, Project};
use crate::vocab::{contains_token, TECH_KEYWORDS};

const BULLET_EDGES: &[char] = &['\u{2022}', '*', '-', ' '];
const LINE_EDGES: &[char] = &['\u{2022}', '\u{2013}', '\t', ' '];

/// Normalizes typographic punctuation PDF extractors tend to emit.
fn normalize_punctuation(s: &str) -> String {
    s.replace('\u{2013}', "-")
        .replace('\u{2014}', "-")
        .replace('\u{2019}', "'")
}

/// Education rows: a line containing a degree marker starts a four-line
/// record {degree, institution, score, year}. Rows past the end of input
/// leave the remaining fields empty (partial records are kept).
pub fn extract_education(text: &str) -> Vec<EducationEntry> {
    let rows: Vec<&str> = text.trim().lines().collect();
    let mut entries = Vec::new();
    let mut i = 0;
    while i < rows.len() {
        let row = rows[i].to_lowercase();
        if row.contains("b.tech") || row.contains("secondary") {
            let field = |n: usize| rows.get(i + n).map(|s| s.to_string()).unwrap_or_default();
            entries.push(EducationEntry {
                degree: field(0),
                institution: field(1),
                score: field(2),
                year: field(3),
            });
            i += 4;
        } else {
            i += 1;
        }
    }
    entries
}

/// "category: item, item, ..." lines build a category → items map.
/// With `continuation` set, colon-less lines append their comma-separated
/// items to the last seen category (course lists wrap across lines).
pub fn extract_categorized(text: &str, continuation: bool) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut current = String::new();

    for line in text.lines() {
        let line = line.trim_matches(BULLET_EDGES).trim();
        if let Some((key, rest)) = line.split_once(':') {
            let key = key.trim().to_lowercase();
            let items = split_items(rest);
            if continuation {
                current = key.clone();
                grouped.insert(key, items);
            } else if !items.is_empty() {
                grouped.insert(key, items);
            }
        } else if continuation && !current.is_empty() {
            grouped
                .entry(current.clone())
                .or_default()
                .extend(split_items(line));
        }
    }
    grouped
}

fn split_items(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim_matches(['*', ' '].as_slice()).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Project blocks are separated by "• " bullets. A block needs at least two
/// lines (title, date); the remaining lines join into the summary. Shorter
/// blocks are dropped.
pub fn extract_projects(text: &str) -> Vec<Project> {
    let mut projects = Vec::new();
    for block in text.split("\u{2022} ") {
        let lines: Vec<&str> = block.trim().lines().collect();
        if lines.len() < 2 {
            continue;
        }
        let title = lines[0].trim();
        if title.is_empty() {
            continue;
        }
        let summary = lines[2..]
            .iter()
            .map(|l| l.trim_matches(['\u{2013}', ' '].as_slice()).trim())
            .collect::<Vec<_>>()
            .join(" ");
        projects.push(Project {
            title: title.to_string(),
            date: lines[1].trim().to_string(),
            summary: normalize_punctuation(&summary),
        });
    }
    projects
}

/// One cleaned item per non-empty line (achievements).
pub fn extract_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| normalize_punctuation(line.trim_matches(LINE_EDGES)))
        .filter(|line| !line.is_empty())
        .collect()
}

/// One cleaned item per bullet or line (extracurriculars, positions —
/// sections where several bullets often share one extracted line).
pub fn extract_bullet_lines(text: &str) -> Vec<String> {
    text.split(['\u{2022}', '\n'])
        .map(|piece| normalize_punctuation(piece.trim_matches(LINE_EDGES)))
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Flattens all skill-category values and matches them against the fixed
/// technology vocabulary, boundary-aware. Result is sorted and deduplicated.
pub fn extract_flat_skills(skills: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    let combined = skills
        .values()
        .flatten()
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let matched: BTreeSet<&str> = TECH_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| contains_token(&combined, kw))
        .collect();

    matched.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_education_partial_record_at_end_of_input() {
        let entries = extract_education("B.Tech Major in CSE\nSome Institute");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].institution, "Some Institute");
        assert_eq!(entries[0].score, "");
        assert_eq!(entries[0].year, "");
    }

    #[test]
    fn test_education_skips_non_degree_rows() {
        let entries = extract_education("random header\nB.Tech in ECE\nInst\n8.0\n2024");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].degree, "B.Tech in ECE");
    }

    #[test]
    fn test_categorized_skips_lines_without_colon() {
        let map = extract_categorized("languages: Python\nno colon here", false);
        assert_eq!(map.len(), 1);
        assert_eq!(map["languages"], vec!["Python"]);
    }

    #[test]
    fn test_categorized_strips_bullets_and_stars() {
        let map = extract_categorized("\u{2022} tools: *Git*, Docker ", false);
        assert_eq!(map["tools"], vec!["Git", "Docker"]);
    }

    #[test]
    fn test_categorized_empty_value_dropped_without_continuation() {
        let map = extract_categorized("tools:\nlanguages: Python", false);
        assert!(!map.contains_key("tools"));
        assert_eq!(map["languages"], vec!["Python"]);
    }

    #[test]
    fn test_continuation_appends_to_last_category() {
        let map = extract_categorized("core: A, B\nC, D\nmath: E", true);
        assert_eq!(map["core"], vec!["A", "B", "C", "D"]);
        assert_eq!(map["math"], vec!["E"]);
    }

    #[test]
    fn test_continuation_before_any_category_is_ignored() {
        let map = extract_categorized("Orphan Line\ncore: A", true);
        assert_eq!(map.len(), 1);
        assert_eq!(map["core"], vec!["A"]);
    }

    #[test]
    fn test_projects_strip_dash_prefixes_in_summary() {
        let text = "\u{2022} Title\nMar 2024\n\u{2013} did a thing\n\u{2013} did another";
        let projects = extract_projects(text);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].summary, "did a thing did another");
    }

    #[test]
    fn test_projects_drop_single_line_blocks() {
        assert!(extract_projects("\u{2022} Lonely Title").is_empty());
    }

    #[test]
    fn test_lines_normalize_dashes_and_quotes() {
        let lines = extract_lines("\u{2022} Won \u{2019}23 contest \u{2013} first place");
        assert_eq!(lines, vec!["Won '23 contest - first place"]);
    }

    #[test]
    fn test_flat_skills_handles_punctuated_keywords() {
        let mut skills = BTreeMap::new();
        skills.insert(
            "languages".to_string(),
            vec!["C++".to_string(), "JavaScript".to_string()],
        );
        let flat = extract_flat_skills(&skills);
        assert!(flat.contains(&"c++".to_string()));
        assert!(flat.contains(&"javascript".to_string()));
        assert!(
            !flat.contains(&"go".to_string()),
            "absent skills must not match"
        );
    }

    #[test]
    fn test_flat_skills_empty_map() {
        assert!(extract_flat_skills(&BTreeMap::new()).is_empty());
    }
}
