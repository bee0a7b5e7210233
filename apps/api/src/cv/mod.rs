//! Structured CV Builder — turns extracted résumé text into a typed record.
//!
//! Every field is produced by an independent strategy (see `strategies`); the
//! builder only wires them together. The contract is total: malformed input
//! never errors, it degrades to empty fields.

pub mod strategies;

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extract::sections::{segment, CV_SECTION_HEADERS};

/// One row group from the education table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    pub score: String,
    pub year: String,
}

/// One project block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub date: String,
    pub summary: String,
}

/// Typed résumé record. Built fresh per document; no mutation after
/// construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredCV {
    pub name: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub branch: String,
    pub cgpa: String,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<Project>,
    pub achievements: Vec<String>,
    /// Skill category → items, as written in the résumé.
    pub skills: BTreeMap<String, Vec<String>>,
    /// Flattened skills matched against the fixed technology vocabulary.
    pub extracted_skills: Vec<String>,
    pub courses: BTreeMap<String, Vec<String>>,
    pub extracurriculars: Vec<String>,
    pub positions: Vec<String>,
}

/// Builds `StructuredCV` records. Holds the compiled regexes so repeated
/// builds (batch parsing) share them.
pub struct CvBuilder {
    email_re: Regex,
    phone_re: Regex,
    alpha_word_re: Regex,
    branch_re: Regex,
    cgpa_re: Regex,
}

impl CvBuilder {
    pub fn new() -> Self {
        Self {
            email_re: Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+")
                .expect("email regex"),
            phone_re: Regex::new(r"(?:\+91[\s\-]*|\b0)?[6-9]\d{9}\b").expect("phone regex"),
            alpha_word_re: Regex::new(r"\b[A-Za-z]{2,}\b").expect("word regex"),
            branch_re: Regex::new(r"B\.?Tech\.?\s*-\s*(.*)").expect("branch regex"),
            cgpa_re: Regex::new(r"\b(\d\.\d{1,2})\b").expect("cgpa regex"),
        }
    }

    /// Builds a typed résumé record from raw extracted text. Never errors.
    pub fn build(&self, raw_text: &str) -> StructuredCV {
        let sections = segment(raw_text, CV_SECTION_HEADERS);
        let section = |key: &str| sections.get(key).map(String::as_str).unwrap_or("");

        let education = strategies::extract_education(section("education"));
        let skills = strategies::extract_categorized(section("skills"), false);
        let (branch, cgpa) = self.extract_branch_and_cgpa(raw_text, &education);
        let extracted_skills = strategies::extract_flat_skills(&skills);

        StructuredCV {
            name: self.extract_name(raw_text),
            emails: dedup_matches(&self.email_re, raw_text),
            phones: dedup_matches(&self.phone_re, raw_text),
            branch,
            cgpa,
            education,
            projects: strategies::extract_projects(section("projects")),
            achievements: strategies::extract_lines(section("achievements")),
            skills,
            extracted_skills,
            courses: strategies::extract_categorized(section("courses"), true),
            extracurriculars: strategies::extract_bullet_lines(section("extracurriculars")),
            positions: strategies::extract_bullet_lines(section("positions")),
        }
    }

    /// Name heuristic: among the first five lines, the first with at least two
    /// alphabetic words and no '@'.
    fn extract_name(&self, text: &str) -> String {
        for line in text.lines().take(5) {
            let line = line.trim();
            if self.alpha_word_re.find_iter(line).count() >= 2 && !line.contains('@') {
                return line.to_string();
            }
        }
        String::new()
    }

    /// Branch comes from the "B.Tech - <branch>" line anywhere in the
    /// document; CGPA from the score of the b.tech major education row.
    fn extract_branch_and_cgpa(
        &self,
        text: &str,
        education: &[EducationEntry],
    ) -> (String, String) {
        let branch = self
            .branch_re
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        let mut cgpa = String::new();
        for entry in education {
            let degree = entry.degree.to_lowercase();
            if degree.contains("b.tech") && degree.contains("major") {
                if let Some(m) = self.cgpa_re.captures(&entry.score).and_then(|c| c.get(1)) {
                    cgpa = m.as_str().to_string();
                    break;
                }
            }
        }

        (branch, cgpa)
    }
}

impl Default for CvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects regex matches over the whole document, deduplicated in
/// first-seen order.
fn dedup_matches(re: &Regex, text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in re.find_iter(text) {
        let s = m.as_str().to_string();
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME_FIXTURE: &str = "\
Asha Verma
asha.verma@example.com | +91 9876543210
B.Tech - Computer Science and Engineering
Education
B.Tech Major in Computer Science
Indian Institute of Technology
8.42 / 10
2021 - 2025
Senior Secondary (XII)
Central School
92.5%
2021
Technical Skills
languages: Python, Java, C++
tools: Git, Docker
Projects
\u{2022} Placement Portal
Jan 2024 - Apr 2024
\u{2013} Built a campus placement portal with REST APIs.
\u{2013} Deployed on AWS with Docker.
\u{2022} Tiny
Achievements
\u{2022} Won Smart India Hackathon 2023
Key courses taken
core: Data Structures, Operating Systems
Machine Learning, Databases
Extracurricular Activities
\u{2022} Debate club lead \u{2022} Football team
Positions of Responsibility
\u{2022} Placement coordinator
";

    fn build_fixture() -> StructuredCV {
        CvBuilder::new().build(RESUME_FIXTURE)
    }

    #[test]
    fn test_name_is_first_two_word_line_without_at() {
        let cv = build_fixture();
        assert_eq!(cv.name, "Asha Verma");
    }

    #[test]
    fn test_emails_and_phones_extracted_document_wide() {
        let cv = build_fixture();
        assert_eq!(cv.emails, vec!["asha.verma@example.com"]);
        assert_eq!(cv.phones.len(), 1);
        assert!(cv.phones[0].ends_with("9876543210"));
    }

    #[test]
    fn test_branch_from_btech_line() {
        let cv = build_fixture();
        assert_eq!(cv.branch, "Computer Science and Engineering");
    }

    #[test]
    fn test_cgpa_from_major_education_row() {
        let cv = build_fixture();
        assert_eq!(cv.cgpa, "8.42");
    }

    #[test]
    fn test_education_rows_grouped_in_fours() {
        let cv = build_fixture();
        assert_eq!(cv.education.len(), 2);
        assert_eq!(cv.education[0].institution, "Indian Institute of Technology");
        assert_eq!(cv.education[0].score, "8.42 / 10");
        assert_eq!(cv.education[1].degree, "Senior Secondary (XII)");
        assert_eq!(cv.education[1].year, "2021");
    }

    #[test]
    fn test_skills_categorized() {
        let cv = build_fixture();
        assert_eq!(cv.skills["languages"], vec!["Python", "Java", "C++"]);
        assert_eq!(cv.skills["tools"], vec!["Git", "Docker"]);
    }

    #[test]
    fn test_flat_skills_matched_against_vocabulary() {
        let cv = build_fixture();
        assert!(cv.extracted_skills.contains(&"python".to_string()));
        assert!(cv.extracted_skills.contains(&"c++".to_string()));
        assert!(cv.extracted_skills.contains(&"docker".to_string()));
        // "java" must match even though "javascript" would not
        assert!(cv.extracted_skills.contains(&"java".to_string()));
        let mut sorted = cv.extracted_skills.clone();
        sorted.sort();
        assert_eq!(cv.extracted_skills, sorted, "flat skills are sorted");
    }

    #[test]
    fn test_projects_require_two_lines() {
        let cv = build_fixture();
        assert_eq!(cv.projects.len(), 1, "single-line block is dropped");
        assert_eq!(cv.projects[0].title, "Placement Portal");
        assert_eq!(cv.projects[0].date, "Jan 2024 - Apr 2024");
        assert!(cv.projects[0].summary.contains("REST APIs"));
        assert!(cv.projects[0].summary.contains("Deployed on AWS"));
    }

    #[test]
    fn test_courses_continuation_lines_append_to_last_category() {
        let cv = build_fixture();
        assert_eq!(
            cv.courses["core"],
            vec![
                "Data Structures",
                "Operating Systems",
                "Machine Learning",
                "Databases"
            ]
        );
    }

    #[test]
    fn test_bullet_lists_split_on_glyph_and_newline() {
        let cv = build_fixture();
        assert_eq!(cv.extracurriculars, vec!["Debate club lead", "Football team"]);
        assert_eq!(cv.positions, vec!["Placement coordinator"]);
    }

    #[test]
    fn test_malformed_input_yields_empty_record() {
        let cv = CvBuilder::new().build("");
        assert!(cv.name.is_empty());
        assert!(cv.education.is_empty());
        assert!(cv.skills.is_empty());
        assert!(cv.extracted_skills.is_empty());
    }

    #[test]
    fn test_garbage_input_never_panics() {
        let cv = CvBuilder::new().build("@@@\n:::\n\u{2022}\u{2022}\u{2022}\nEducation\nb.tech");
        assert_eq!(cv.education.len(), 1);
        assert_eq!(cv.education[0].degree, "b.tech");
        assert!(cv.education[0].institution.is_empty(), "partial rows kept");
    }
}
