// src/risk/normalize.rs
//! Free-text job title to canonical role label.

/// Role assigned when no keyword matches.
pub const DEFAULT_ROLE: &str = "Software Engineer";

/// Checked top to bottom; the first keyword contained in the title wins.
pub const TITLE_RULES: [(&str, &str); 12] = [
    ("data scientist", "Data Scientist"),
    ("machine learning", "Machine Learning Engineer"),
    ("product manager", "Product Manager"),
    ("devops", "DevOps Engineer"),
    ("frontend", "Frontend Developer"),
    ("backend", "Backend Developer"),
    ("full stack", "Full Stack Developer"),
    ("software engineer", "Software Engineer"),
    ("software developer", "Software Engineer"),
    ("cloud engineer", "Cloud Engineer"),
    ("security engineer", "Security Engineer"),
    ("data analyst", "Data Analyst"),
];

pub fn map_title_to_role(title: &str) -> &'static str {
    let title = title.to_lowercase();
    TITLE_RULES
        .iter()
        .find(|(keyword, _)| title.contains(keyword))
        .map(|(_, role)| *role)
        .unwrap_or(DEFAULT_ROLE)
}
