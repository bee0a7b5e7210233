//! Fixed keyword vocabularies shared by the CV and JD builders.
//!
//! These lists are tuned to the campus-recruitment résumé/JD template the
//! extractor targets. Matching is boundary-aware so "java" never fires inside
//! "javascript" and "c++" still matches next to punctuation.

/// Technology keywords matched against résumé skill sections and JD text.
pub const TECH_KEYWORDS: &[&str] = &[
    "c", "c++", "java", "python", "go", "ruby", "rust", "kotlin", "typescript", "javascript",
    "php", "scala", "perl", "swift",
    "html", "css", "react", "angular", "vue", "next.js", "node.js", "express.js", "django",
    "flask", "spring boot",
    "flutter", "react native", "android", "ios", "swiftui",
    "mysql", "postgresql", "mongodb", "sqlite", "oracle", "cassandra", "redis", "firebase",
    "sql", "nosql",
    "aws", "azure", "gcp", "google cloud", "docker", "kubernetes", "jenkins", "terraform",
    "ansible", "linux", "nginx", "apache",
    "machine learning", "deep learning", "tensorflow", "pytorch", "scikit-learn", "keras",
    "xgboost", "huggingface", "opencv", "llm", "langchain",
    "pandas", "numpy", "matplotlib", "seaborn", "big data", "hadoop", "spark", "hive",
    "airflow", "power bi", "tableau",
    "selenium", "junit", "pytest", "postman", "cypress",
    "git", "github", "bitbucket", "jira", "agile", "scrum", "ci/cd", "rest api", "graphql",
    "json", "yaml", "xml",
];

/// Soft-skill and business keywords matched against JD text.
pub const NON_TECH_KEYWORDS: &[&str] = &[
    "strategy", "management consulting", "business consulting", "financial modeling",
    "valuation", "investment banking", "private equity", "venture capital", "equity research",
    "derivatives", "hedging", "mergers and acquisitions", "m&a", "capital markets",
    "asset management", "wealth management", "risk management", "audit", "due diligence",
    "compliance",
    "product management", "business development", "sales strategy", "marketing", "growth",
    "user research", "go-to-market", "product analytics", "roadmap", "market research",
    "competitive analysis", "customer success", "crm", "kpis", "roi", "unit economics",
    "excel", "powerpoint", "google sheets", "tableau", "power bi", "salesforce", "hubspot",
    "lookerstudio", "figma", "miro",
    "communication", "problem solving", "stakeholder management", "leadership",
    "collaboration", "presentation skills", "design thinking",
];

/// Engineering branch phrases recognized in JD eligibility text.
pub const BRANCH_KEYWORDS: &[&str] = &[
    "computer science", "information technology", "data science", "artificial intelligence",
    "machine learning", "cybersecurity", "software engineering", "electronics and communication",
    "electronics engineering", "electrical engineering", "electrical and electronics",
    "instrumentation engineering", "robotics", "control systems", "engineering physics",
    "applied physics", "applied mathematics", "mathematics and computing",
    "mathematical sciences", "quantum computing", "bioinformatics", "computational biology",
    "mechanical engineering", "civil engineering", "chemical engineering",
    "metallurgical engineering", "aerospace engineering", "aeronautical engineering",
    "marine engineering", "mining engineering", "automobile engineering",
    "industrial engineering", "production engineering", "petroleum engineering",
    "textile engineering", "ceramic engineering", "nuclear engineering",
    "agricultural engineering", "biotechnology", "biochemical engineering", "ocean engineering",
    "materials science", "engineering design", "engineering management", "business analytics",
    "operations research", "economics", "cognitive science", "design", "humanities",
    "environmental engineering", "energy science", "rural technology", "management", "mba",
    "bba", "statistics", "geoinformatics",
];

/// Domain table, in priority order; the first domain with any keyword hit in
/// the JD text wins.
pub const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Finance",
        &["finance", "bank", "investment", "trading", "capital market", "equity", "hedge fund", "fintech"],
    ),
    (
        "Healthcare",
        &["health", "hospital", "clinical", "biotech", "medtech", "pharmaceutical", "medical"],
    ),
    (
        "Technology",
        &["software", "developer", "tech", "cloud", "ai", "ml", "it services", "cybersecurity"],
    ),
    (
        "Consulting",
        &["consulting", "advisory", "client delivery", "strategy consulting", "business analysis"],
    ),
    (
        "Product",
        &["product manager", "product management", "roadmap", "feature", "user research"],
    ),
    (
        "Education",
        &["edtech", "teaching", "curriculum", "learning", "academic", "school", "university"],
    ),
    ("Legal", &["law", "legal", "compliance", "regulatory"]),
    (
        "Retail",
        &["ecommerce", "retail", "consumer", "supply chain", "inventory", "logistics"],
    ),
    (
        "Energy",
        &["renewable", "solar", "wind", "energy", "oil", "gas", "power", "climate"],
    ),
    (
        "Government",
        &["public sector", "policy", "governance", "ministry", "bureaucracy", "civil services"],
    ),
    ("Telecom", &["telecom", "network", "5g", "broadband"]),
    (
        "Design",
        &["ui", "ux", "figma", "adobe", "interface", "design thinking"],
    ),
    (
        "Media",
        &["media", "advertising", "content", "branding", "digital marketing", "journalism"],
    ),
    (
        "Manufacturing",
        &["factory", "industrial", "mechanical", "automation", "production", "assembly line"],
    ),
];

/// Boundary-aware token search: `token` must occur in `text` with no word
/// character (letter, digit, underscore) immediately before or after the
/// match. Handles punctuated tokens like "c++" and "ci/cd" that `\b` cannot.
/// Both arguments are expected to be lowercase already.
pub fn contains_token(text: &str, token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(pos) = text[start..].find(token) {
        let begin = start + pos;
        let end = begin + token.len();
        let before_ok = begin == 0 || !is_word_byte(bytes[begin - 1]);
        let after_ok = end == text.len() || !is_word_byte(bytes[end]);
        if before_ok && after_ok {
            return true;
        }
        start = begin + 1;
    }
    false
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
