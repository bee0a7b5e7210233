//! JD construction: section segmentation, per-section cleanup, and metadata
//! line extraction.

use std::sync::Arc;

use regex::Regex;

use crate::embedding::skill_space::SkillSpace;
use crate::extract::sections::{segment, SectionMap, JD_SECTION_HEADERS};
use crate::jd::{enrich, StructuredJD};

const BULLET_GLYPHS: &[char] = &['\u{2022}', '\u{25CF}', '-', '\u{2013}'];

/// Builds `StructuredJD` records. Holds the compiled regexes and a handle to
/// the skill space used for technology confirmation.
pub struct JdBuilder {
    space: Arc<SkillSpace>,
    location_re: Regex,
    fallback_re: Regex,
    cgpa_re: Regex,
    job_title_re: Regex,
    job_type_re: Regex,
    experience_re: Regex,
}

impl JdBuilder {
    pub fn new(space: Arc<SkillSpace>) -> Self {
        Self {
            space,
            location_re: Regex::new(r"(?i)\b(Remote|On-site|Hybrid)\b").expect("location regex"),
            fallback_re: Regex::new(r"\u{2022}|\n|\.\s+").expect("fallback regex"),
            cgpa_re: Regex::new(r"(?i)(?:CGPA|CPI|GPA)[^0-9]{0,5}(\d{1,2}(?:\.\d{1,2})?)")
                .expect("cgpa regex"),
            job_title_re: Regex::new(r"Job Title:\s*(.*)").expect("job title regex"),
            job_type_re: Regex::new(r"Job Type:\s*(.*)").expect("job type regex"),
            experience_re: Regex::new(r"Experience Level:\s*(.*)").expect("experience regex"),
        }
    }

    /// Builds a typed JD record from raw extracted text. Deterministic for a
    /// given input; never errors on malformed formatting.
    pub fn build(&self, raw_text: &str) -> StructuredJD {
        let sections = segment(raw_text, JD_SECTION_HEADERS);
        let joined = |key: &str| -> String {
            sections
                .get(key)
                .map(|text| clean_text(&text.split_whitespace().collect::<Vec<_>>().join(" ")))
                .unwrap_or_default()
        };

        let mut jd = StructuredJD {
            job_role: joined("job_role"),
            responsibilities: self.bulleted(&sections, "responsibilities"),
            required_skills: self.bulleted(&sections, "required_skills"),
            preferred_skills: self.bulleted(&sections, "preferred_skills"),
            eligibility: joined("eligibility"),
            locations: self.locations(&sections),
            values: self.bulleted(&sections, "values"),
            job_title: self.metadata(&self.job_title_re, raw_text),
            job_type: self.metadata(&self.job_type_re, raw_text),
            experience_level: self.metadata(&self.experience_re, raw_text),
            ..StructuredJD::default()
        };

        let full_text = full_text(&jd).to_lowercase();
        jd.branches = enrich::detect_branches(&full_text);
        jd.technologies = enrich::detect_technologies(&full_text, &self.space);
        jd.non_tech_skills = enrich::detect_non_tech_skills(&full_text);
        jd.min_cgpa = enrich::detect_min_cgpa(&full_text, &self.cgpa_re);
        jd.domain = enrich::detect_domain(&full_text);
        jd
    }

    /// Bulletable sections split on bullet glyphs; if the split yields one
    /// item or fewer (poor formatting), fall back to splitting on bullets,
    /// newlines, and sentence breaks, keeping fragments longer than 5 chars.
    fn bulleted(&self, sections: &SectionMap, key: &str) -> Vec<String> {
        let Some(text) = sections.get(key) else {
            return Vec::new();
        };

        let mut items = split_bullets(text);
        if items.len() <= 1 {
            items = self
                .fallback_re
                .split(text)
                .map(str::trim)
                .filter(|s| s.len() > 5)
                .map(str::to_string)
                .collect();
        }
        items.iter().map(|s| clean_text(s)).collect()
    }

    /// Locations: whatever of {Remote, On-site, Hybrid} the section mentions,
    /// defaulting to "Remote".
    fn locations(&self, sections: &SectionMap) -> String {
        let matches: Vec<&str> = sections
            .get("locations")
            .map(|text| {
                self.location_re
                    .find_iter(text)
                    .map(|m| m.as_str())
                    .collect()
            })
            .unwrap_or_default();

        if matches.is_empty() {
            "Remote".to_string()
        } else {
            matches.join(", ")
        }
    }

    fn metadata(&self, re: &Regex, text: &str) -> Option<String> {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .filter(|s| !s.is_empty())
    }
}

/// Splits section text into bullet items: a line opening with a bullet glyph
/// starts a new item; other lines continue the current one.
fn split_bullets(text: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let is_bullet = trimmed.starts_with(BULLET_GLYPHS);
        if is_bullet && !current.is_empty() {
            items.push(current);
            current = String::new();
        }
        let content = trimmed
            .trim_start_matches(|c: char| BULLET_GLYPHS.contains(&c) || c.is_whitespace());
        if content.is_empty() {
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(content);
    }
    if !current.is_empty() {
        items.push(current);
    }
    items
}

/// Normalizes typographic punctuation and strips zero-width characters.
fn clean_text(s: &str) -> String {
    s.replace('\u{2019}', "'")
        .replace('\u{2013}', "-")
        .replace(['\u{200b}', '\u{200e}'], "")
        .trim()
        .to_string()
}

/// All structured text fields joined for keyword/enrichment scans.
fn full_text(jd: &StructuredJD) -> String {
    let mut parts: Vec<&str> = vec![&jd.job_role, &jd.eligibility, &jd.locations];
    parts.extend(jd.responsibilities.iter().map(String::as_str));
    parts.extend(jd.required_skills.iter().map(String::as_str));
    parts.extend(jd.preferred_skills.iter().map(String::as_str));
    parts.extend(jd.values.iter().map(String::as_str));
    for meta in [&jd.job_title, &jd.job_type, &jd.experience_level] {
        if let Some(m) = meta {
            parts.push(m);
        }
    }
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::skill_space::SkillSpace;

    fn space() -> Arc<SkillSpace> {
        Arc::new(SkillSpace::from_entries(vec![
            ("python".to_string(), vec![1.0, 0.0, 0.0]),
            ("docker".to_string(), vec![0.0, 1.0, 0.0]),
            ("java".to_string(), vec![0.0, 0.0, 1.0]),
        ]))
    }

    const JD_FIXTURE: &str = "\
Job Title: Software Engineer Intern
Job Type: Internship
Experience Level: Entry
About the Role
Build backend services for a fintech platform using Python.
Key Responsibilities
\u{2022} Design REST APIs with Python
\u{2022} Ship containers with Docker
Required Skills
\u{2022} Python
\u{2022} Docker
Eligibility
Open to Computer Science and Information Technology students with CGPA >= 7.5
Location
Hybrid or Remote work
";

    #[test]
    fn test_metadata_lines_extracted() {
        let jd = JdBuilder::new(space()).build(JD_FIXTURE);
        assert_eq!(jd.job_title.as_deref(), Some("Software Engineer Intern"));
        assert_eq!(jd.job_type.as_deref(), Some("Internship"));
        assert_eq!(jd.experience_level.as_deref(), Some("Entry"));
    }

    #[test]
    fn test_bulleted_sections_split_on_glyphs() {
        let jd = JdBuilder::new(space()).build(JD_FIXTURE);
        assert_eq!(
            jd.responsibilities,
            vec!["Design REST APIs with Python", "Ship containers with Docker"]
        );
        assert_eq!(jd.required_skills, vec!["Python", "Docker"]);
    }

    #[test]
    fn test_bullet_fallback_on_poor_formatting() {
        let text = "Required Skills\nStrong Python skills. Comfort with SQL databases. Git\n";
        let jd = JdBuilder::new(space()).build(text);
        assert_eq!(
            jd.required_skills,
            vec!["Strong Python skills", "Comfort with SQL databases"],
            "short fragments (<= 5 chars) are dropped by the fallback"
        );
    }

    #[test]
    fn test_locations_matched_and_joined() {
        let jd = JdBuilder::new(space()).build(JD_FIXTURE);
        assert_eq!(jd.locations, "Hybrid, Remote");
    }

    #[test]
    fn test_locations_default_remote() {
        let jd = JdBuilder::new(space()).build("Location\nBengaluru office\n");
        assert_eq!(jd.locations, "Remote");
    }

    #[test]
    fn test_branches_detected_and_title_cased() {
        let jd = JdBuilder::new(space()).build(JD_FIXTURE);
        assert!(jd.branches.contains(&"Computer Science".to_string()));
        assert!(jd.branches.contains(&"Information Technology".to_string()));
    }

    #[test]
    fn test_min_cgpa_detected() {
        let jd = JdBuilder::new(space()).build(JD_FIXTURE);
        assert_eq!(jd.min_cgpa, Some(7.5));
    }

    #[test]
    fn test_technologies_confirmed_by_skill_space() {
        let jd = JdBuilder::new(space()).build(JD_FIXTURE);
        assert_eq!(jd.technologies, vec!["docker", "python"]);
    }

    #[test]
    fn test_domain_first_table_hit_wins() {
        // "fintech" hits Finance before any Technology keyword is consulted
        let jd = JdBuilder::new(space()).build(JD_FIXTURE);
        assert_eq!(jd.domain, "Finance");
    }

    #[test]
    fn test_domain_defaults_to_general() {
        let jd = JdBuilder::new(space()).build("About the Role\nHerd alpacas.\n");
        assert_eq!(jd.domain, "General");
    }

    #[test]
    fn test_missing_sections_yield_empty_fields() {
        let jd = JdBuilder::new(space()).build("");
        assert!(jd.job_role.is_empty());
        assert!(jd.responsibilities.is_empty());
        assert_eq!(jd.locations, "Remote");
        assert!(jd.min_cgpa.is_none());
        assert_eq!(jd.domain, "General");
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = JdBuilder::new(space());
        let a = serde_json::to_string(&builder.build(JD_FIXTURE)).unwrap();
        let b = serde_json::to_string(&builder.build(JD_FIXTURE)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_bullets_continuation_lines_join() {
        let items = split_bullets("\u{2022} Build APIs\nacross services\n\u{2022} Ship it");
        assert_eq!(items, vec!["Build APIs across services", "Ship it"]);
    }

    #[test]
    fn test_split_bullets_leading_plain_text_is_an_item() {
        let items = split_bullets("Intro line\n\u{2022} A point");
        assert_eq!(items, vec!["Intro line", "A point"]);
    }
}
