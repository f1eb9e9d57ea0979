// src/postings/mod.rs
//! Collected job postings: CSV loading, cleaning and risk integration.

pub mod analysis;
pub mod market;

pub use analysis::{
    demand_by_level, integrate, location_risk, role_insights, salary_by_role, salary_risk_correlation,
    strategic_insights, top_search_terms, IntegratedPosting, LevelDemand, LocationRisk,
    RoleInsight, RoleSalary, StrategicInsights,
};
pub use market::{analyze_market, MarketAnalysis};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::io::Read;
use tracing::{info, warn};

/// One row as written by the job collectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "finite_salary")]
    pub salary_min: Option<f64>,
    #[serde(default, deserialize_with = "finite_salary")]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub contract_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub search_location: String,
    #[serde(default)]
    pub collected_date: String,
    #[serde(skip_deserializing)]
    pub salary_avg: Option<f64>,
    #[serde(skip_deserializing)]
    pub state: Option<String>,
}

/// Blank, unparseable and non-finite ("nan", "inf") cells are missing salaries.
fn finite_salary<'de, D>(de: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = csv::invalid_option(de)?;
    Ok(value.filter(|v| v.is_finite()))
}

impl JobPosting {
    fn clean(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.company = self.company.trim().to_string();
        self.location = self.location.trim().to_string();
        self.salary_avg = match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            _ => None,
        };
        self.state = extract_state(&self.location);
        self
    }
}

/// Two-letter state code following ", " in a location such as "Austin, TX".
pub fn extract_state(location: &str) -> Option<String> {
    location.match_indices(", ").find_map(|(index, _)| {
        let code = location.get(index + 2..index + 4)?;
        if code.chars().all(|c| c.is_ascii_uppercase()) {
            Some(code.to_string())
        } else {
            None
        }
    })
}

/// Read, de-duplicate and clean postings. Malformed rows are skipped.
pub fn load_postings<R: Read>(reader: R) -> Result<Vec<JobPosting>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader
        .headers()
        .context("Failed to read posting CSV header")?
        .clone();

    let mut seen = HashSet::new();
    let mut postings = Vec::new();
    let mut total = 0usize;

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable posting row {}: {}", line + 1, e);
                continue;
            }
        };
        total += 1;

        let key: Vec<String> = record.iter().map(str::to_string).collect();
        if !seen.insert(key) {
            continue;
        }

        match record.deserialize::<JobPosting>(Some(&headers)) {
            Ok(posting) => postings.push(posting.clean()),
            Err(e) => warn!("Skipping malformed posting row {}: {}", line + 1, e),
        }
    }

    info!(
        "Loaded {} postings ({} duplicates removed)",
        postings.len(),
        total - seen.len()
    );
    Ok(postings)
}

pub async fn load_postings_file(path: &std::path::Path) -> Result<Vec<JobPosting>> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read postings file: {}", path.display()))?;
    load_postings(content.as_slice())
}
