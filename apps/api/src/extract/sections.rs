//! Section segmentation — splits extracted document text into named sections.
//!
//! Résumés and job descriptions use different header vocabularies but share
//! the same algorithm: scan lines top to bottom, and when a line matches a
//! known header, accumulate the following lines under that section key until
//! the next header. Synonym lists are pre-normalized (lowercase, letters and
//! spaces only) so matching is a plain substring test. Earlier table entries
//! win when a line could match more than one key.

use std::collections::BTreeMap;

/// Section key → section text (lines joined with `\n`).
/// Sections with no content are absent, never empty placeholders.
pub type SectionMap = BTreeMap<String, String>;

/// Header vocabulary for job descriptions, in priority order.
pub const JD_SECTION_HEADERS: &[(&str, &[&str])] = &[
    (
        "job_role",
        &["about the role", "introduction", "overview", "position overview"],
    ),
    (
        "responsibilities",
        &["responsibilities", "what youll do", "key responsibilities"],
    ),
    (
        "required_skills",
        &["required skills", "technical skills", "required capabilities"],
    ),
    (
        "preferred_skills",
        &[
            "preferred skills",
            "preferred qualifications",
            "preferred capabilities",
            "good to have",
        ],
    ),
    (
        "eligibility",
        &["eligibility", "qualification criteria", "who can apply"],
    ),
    ("locations", &["locations", "location", "you may join in"]),
    ("values", &["our values", "values", "culture"]),
];

/// Header vocabulary for résumés, in priority order.
pub const CV_SECTION_HEADERS: &[(&str, &[&str])] = &[
    ("education", &["education"]),
    ("projects", &["projects"]),
    ("achievements", &["achievements"]),
    ("skills", &["technical skills"]),
    ("courses", &["key courses taken"]),
    (
        "extracurriculars",
        &["extracurricular activities", "extracurricular"],
    ),
    ("positions", &["positions of responsibility"]),
];

/// Splits `text` into named sections using a priority-ordered header table.
/// Single linear pass over the lines.
pub fn segment(text: &str, headers: &[(&str, &[&str])]) -> SectionMap {
    let mut sections: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut current: Option<&str> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(key) = match_header(line, headers) {
            current = Some(key);
            continue;
        }
        if let Some(key) = current {
            sections
                .entry(key.to_string())
                .or_default()
                .push(line.to_string());
        }
    }

    sections
        .into_iter()
        .map(|(key, lines)| (key, lines.join("\n")))
        .collect()
}

/// Returns the first section key whose synonym list matches the line.
/// A line matches when, after dropping everything but letters and spaces and
/// lowercasing, it contains the synonym.
fn match_header<'a>(line: &str, headers: &[(&'a str, &[&str])]) -> Option<&'a str> {
    let normalized: String = line
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();

    for (key, synonyms) in headers {
        if synonyms.iter().any(|syn| normalized.contains(syn)) {
            return Some(*key);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD_FIXTURE: &str = "\
Job Title: Backend Engineer
About the Role
Build and run the matching platform.
Key Responsibilities:
• Design REST APIs
• Own deployment pipelines
Required Skills
• Python
• Docker
Location
Remote or Hybrid
";

    #[test]
    fn test_jd_sections_extracted() {
        let sections = segment(JD_FIXTURE, JD_SECTION_HEADERS);
        assert!(sections["job_role"].contains("matching platform"));
        assert!(sections["responsibilities"].contains("REST APIs"));
        assert!(sections["required_skills"].contains("Docker"));
        assert_eq!(sections["locations"], "Remote or Hybrid");
    }

    #[test]
    fn test_lines_before_first_header_dropped() {
        let sections = segment(JD_FIXTURE, JD_SECTION_HEADERS);
        for text in sections.values() {
            assert!(!text.contains("Job Title"));
        }
    }

    #[test]
    fn test_empty_sections_omitted() {
        let sections = segment("Preferred Skills\nEligibility\n", JD_SECTION_HEADERS);
        assert!(sections.is_empty(), "headers with no content must be absent");
    }

    #[test]
    fn test_header_match_ignores_punctuation_and_case() {
        let sections = segment("** KEY RESPONSIBILITIES: **\ndo things well\n", JD_SECTION_HEADERS);
        assert_eq!(sections["responsibilities"], "do things well");
    }

    #[test]
    fn test_earlier_table_entry_wins_ties() {
        // "eligibility" precedes "locations" in the JD table, so a line
        // matching both keys resolves to eligibility.
        let sections = segment(
            "Eligibility and Location\nFinal-year students only\n",
            JD_SECTION_HEADERS,
        );
        assert!(sections.contains_key("eligibility"));
        assert!(!sections.contains_key("locations"));
    }

    #[test]
    fn test_cv_sections_extracted() {
        let text = "\
Jane Doe
Education
B.Tech - Computer Science
IIT Somewhere
Technical Skills
languages: python, java
Projects
• Chat App
Jan 2024
Built a chat app.
";
        let sections = segment(text, CV_SECTION_HEADERS);
        assert!(sections["education"].contains("IIT Somewhere"));
        assert!(sections["skills"].contains("languages"));
        assert!(sections["projects"].contains("Chat App"));
        assert!(!sections.contains_key("courses"));
    }

    #[test]
    fn test_section_lines_are_original_lines_without_duplication() {
        let original: Vec<&str> = JD_FIXTURE
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let sections = segment(JD_FIXTURE, JD_SECTION_HEADERS);

        let mut section_lines: Vec<&str> = Vec::new();
        for text in sections.values() {
            section_lines.extend(text.lines());
        }
        for line in &section_lines {
            assert!(original.contains(line), "line {line:?} not in original");
        }
        let matched: usize = original
            .iter()
            .filter(|l| section_lines.contains(l))
            .count();
        assert_eq!(matched, section_lines.len(), "no line duplicated");
    }

    #[test]
    fn test_each_section_preserves_document_line_order() {
        let sections = segment(JD_FIXTURE, JD_SECTION_HEADERS);
        let resp = &sections["responsibilities"];
        let apis = resp.find("REST APIs").unwrap();
        let deploy = resp.find("deployment pipelines").unwrap();
        assert!(apis < deploy, "section content must keep document order");
    }
}
