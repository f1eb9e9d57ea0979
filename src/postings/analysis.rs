// src/postings/analysis.rs
use super::JobPosting;
use crate::risk::{map_title_to_role, RiskLevel, RiskModel};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// Score at or above which a posting counts as high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.5;
/// Score below which a posting counts as low risk.
pub const LOW_RISK_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Serialize)]
pub struct IntegratedPosting {
    pub posting: JobPosting,
    pub risk_category: String,
    pub automation_risk_score: f64,
    pub risk_level: RiskLevel,
}

/// Flat CSV row for exporting integrated postings.
#[derive(Debug, Serialize)]
pub struct IntegratedRow<'a> {
    pub title: &'a str,
    pub company: &'a str,
    pub location: &'a str,
    pub state: Option<&'a str>,
    pub search_term: &'a str,
    pub salary_avg: Option<f64>,
    pub source: &'a str,
    pub risk_category: &'a str,
    pub automation_risk_score: f64,
    pub risk_level: RiskLevel,
}

impl IntegratedPosting {
    pub fn row(&self) -> IntegratedRow<'_> {
        IntegratedRow {
            title: &self.posting.title,
            company: &self.posting.company,
            location: &self.posting.location,
            state: self.posting.state.as_deref(),
            search_term: &self.posting.search_term,
            salary_avg: self.posting.salary_avg,
            source: &self.posting.source,
            risk_category: &self.risk_category,
            automation_risk_score: self.automation_risk_score,
            risk_level: self.risk_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelDemand {
    pub level: RiskLevel,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSalary {
    pub role: String,
    pub avg_salary: f64,
    pub risk_score: f64,
    pub job_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRisk {
    pub location: String,
    pub avg_risk_score: f64,
    pub job_count: usize,
    pub avg_salary: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleOpenings {
    pub search_term: String,
    pub openings: usize,
    pub risk_score: f64,
    pub avg_salary: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryPremium {
    pub low_risk_avg: f64,
    pub high_risk_avg: f64,
    pub premium_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationScore {
    pub location: String,
    pub score: f64,
    pub avg_risk_score: f64,
    pub job_count: usize,
    pub avg_salary: Option<f64>,
}

/// Per-role summary row of the integrated insights export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleInsight {
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Automation_Risk_Score")]
    pub automation_risk_score: f64,
    #[serde(rename = "Risk_Level")]
    pub risk_level: RiskLevel,
    #[serde(rename = "Job_Count")]
    pub job_count: usize,
    #[serde(rename = "Avg_Salary")]
    pub avg_salary: Option<f64>,
    #[serde(rename = "Min_Salary")]
    pub min_salary: Option<f64>,
    #[serde(rename = "Max_Salary")]
    pub max_salary: Option<f64>,
    #[serde(rename = "Top_Location")]
    pub top_location: String,
    #[serde(rename = "Top_Company")]
    pub top_company: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategicInsights {
    pub safe_havens: Vec<RoleOpenings>,
    pub transition_warnings: Vec<RoleOpenings>,
    pub salary_premium: Option<SalaryPremium>,
    pub best_locations: Vec<LocationScore>,
}

/// Attach a risk category, score and level to every posting.
pub fn integrate(postings: Vec<JobPosting>, model: &RiskModel) -> Vec<IntegratedPosting> {
    let integrated: Vec<IntegratedPosting> = postings
        .into_iter()
        .map(|posting| {
            let risk = model.assess(map_title_to_role(&posting.search_term));
            IntegratedPosting {
                posting,
                risk_category: risk.role,
                automation_risk_score: risk.score,
                risk_level: risk.level,
            }
        })
        .collect();

    info!("Integrated dataset created with {} records", integrated.len());
    integrated
}

/// Posting counts per risk level, most common first.
pub fn demand_by_level(postings: &[IntegratedPosting]) -> Vec<LevelDemand> {
    let total = postings.len();
    let counts = value_counts(postings.iter().map(|p| p.risk_level));

    counts
        .into_iter()
        .map(|(level, count)| LevelDemand {
            level,
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect()
}

/// Mean salary per risk category over postings with salary data, riskiest first.
pub fn salary_by_role(postings: &[IntegratedPosting]) -> Vec<RoleSalary> {
    let mut groups: Vec<(&str, f64, Vec<f64>)> = Vec::new();

    for posting in postings {
        let Some(salary) = posting.posting.salary_avg else {
            continue;
        };
        match groups
            .iter_mut()
            .find(|(role, _, _)| *role == posting.risk_category)
        {
            Some((_, _, salaries)) => salaries.push(salary),
            None => groups.push((
                posting.risk_category.as_str(),
                posting.automation_risk_score,
                vec![salary],
            )),
        }
    }

    let mut result: Vec<RoleSalary> = groups
        .into_iter()
        .map(|(role, risk_score, salaries)| RoleSalary {
            role: role.to_string(),
            avg_salary: mean(&salaries).unwrap_or_default(),
            risk_score,
            job_count: salaries.len(),
        })
        .collect();
    result.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    result
}

/// Pearson correlation between salary and risk score. Needs more than ten salaried postings.
pub fn salary_risk_correlation(postings: &[IntegratedPosting]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = postings
        .iter()
        .filter_map(|p| p.posting.salary_avg.map(|s| (s, p.automation_risk_score)))
        .collect();

    if pairs.len() <= 10 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Per-location averages for locations with at least `min_jobs` postings.
pub fn location_risk(postings: &[IntegratedPosting], min_jobs: usize) -> Vec<LocationRisk> {
    let mut result: Vec<LocationRisk> = group_by_location(postings)
        .into_iter()
        .filter(|(_, group)| group.len() >= min_jobs)
        .map(|(location, group)| LocationRisk {
            location: location.to_string(),
            avg_risk_score: mean(&group.iter().map(|p| p.automation_risk_score).collect::<Vec<_>>())
                .unwrap_or_default(),
            job_count: group.len(),
            avg_salary: mean(&salaries(&group)),
        })
        .collect();
    result.sort_by(|a, b| b.avg_risk_score.total_cmp(&a.avg_risk_score));
    result
}

/// Most posted search terms among postings accepted by `filter`.
pub fn top_search_terms<F>(postings: &[IntegratedPosting], filter: F, n: usize) -> Vec<(String, usize)>
where
    F: Fn(&IntegratedPosting) -> bool,
{
    value_counts(
        postings
            .iter()
            .filter(|p| filter(*p))
            .map(|p| p.posting.search_term.clone()),
    )
    .into_iter()
    .take(n)
    .collect()
}

pub fn strategic_insights(postings: &[IntegratedPosting]) -> StrategicInsights {
    let safe: Vec<&IntegratedPosting> = postings
        .iter()
        .filter(|p| p.automation_risk_score < LOW_RISK_THRESHOLD)
        .collect();
    let risky: Vec<&IntegratedPosting> = postings
        .iter()
        .filter(|p| p.automation_risk_score >= HIGH_RISK_THRESHOLD)
        .collect();

    let low_risk_avg = mean(&salaries(&safe));
    let high_risk_avg = mean(&salaries(&risky));
    let salary_premium = match (low_risk_avg, high_risk_avg) {
        (Some(low), Some(high)) if high != 0.0 => Some(SalaryPremium {
            low_risk_avg: low,
            high_risk_avg: high,
            premium_pct: (low - high) / high * 100.0,
        }),
        _ => None,
    };

    StrategicInsights {
        safe_havens: role_openings(&safe, 5),
        transition_warnings: role_openings(&risky, 5),
        salary_premium,
        best_locations: best_locations(postings, 30, 5),
    }
}

/// One row per known role with postings, lowest risk first.
pub fn role_insights(postings: &[IntegratedPosting], model: &RiskModel) -> Vec<RoleInsight> {
    let mut rows: Vec<RoleInsight> = model
        .roles()
        .filter_map(|role| {
            let group: Vec<&IntegratedPosting> = postings
                .iter()
                .filter(|p| p.risk_category == role)
                .collect();
            let first = group.first()?;
            let salaries = salaries(&group);
            Some(RoleInsight {
                role: role.to_string(),
                automation_risk_score: first.automation_risk_score,
                risk_level: first.risk_level,
                job_count: group.len(),
                avg_salary: mean(&salaries),
                min_salary: salaries.iter().copied().reduce(f64::min),
                max_salary: salaries.iter().copied().reduce(f64::max),
                top_location: most_common(group.iter().map(|p| p.posting.location.as_str())),
                top_company: most_common(group.iter().map(|p| p.posting.company.as_str())),
            })
        })
        .collect();
    rows.sort_by(|a, b| a.automation_risk_score.total_cmp(&b.automation_risk_score));
    rows
}

fn most_common<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    value_counts(values.into_iter().filter(|v| !v.is_empty()))
        .into_iter()
        .next()
        .map(|(value, _)| value.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn role_openings(postings: &[&IntegratedPosting], n: usize) -> Vec<RoleOpenings> {
    value_counts(postings.iter().map(|p| p.posting.search_term.as_str()))
        .into_iter()
        .take(n)
        .map(|(term, openings)| {
            let matching: Vec<&IntegratedPosting> = postings
                .iter()
                .copied()
                .filter(|p| p.posting.search_term == term)
                .collect();
            RoleOpenings {
                search_term: term.to_string(),
                openings,
                risk_score: matching[0].automation_risk_score,
                avg_salary: mean(&salaries(&matching)),
            }
        })
        .collect()
}

/// Composite ranking: 40% low risk, 40% salary, 20% posting volume, each
/// normalised by the maximum across qualifying locations.
fn best_locations(postings: &[IntegratedPosting], min_jobs: usize, n: usize) -> Vec<LocationScore> {
    let stats = location_risk(postings, min_jobs);
    if stats.is_empty() {
        return Vec::new();
    }

    let max_risk = stats.iter().map(|s| s.avg_risk_score).fold(0.0, f64::max);
    let max_salary = stats
        .iter()
        .filter_map(|s| s.avg_salary)
        .fold(0.0, f64::max);
    let max_jobs = stats.iter().map(|s| s.job_count).max().unwrap_or(1) as f64;

    let mut scored: Vec<LocationScore> = stats
        .into_iter()
        .map(|s| {
            let risk_norm = if max_risk > 0.0 {
                1.0 - s.avg_risk_score / max_risk
            } else {
                1.0
            };
            let salary_norm = match s.avg_salary {
                Some(salary) if max_salary > 0.0 => salary / max_salary,
                _ => 0.0,
            };
            let jobs_norm = s.job_count as f64 / max_jobs;
            LocationScore {
                score: risk_norm * 0.4 + salary_norm * 0.4 + jobs_norm * 0.2,
                location: s.location,
                avg_risk_score: s.avg_risk_score,
                job_count: s.job_count,
                avg_salary: s.avg_salary,
            }
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(n);
    scored
}

fn group_by_location(postings: &[IntegratedPosting]) -> Vec<(&str, Vec<&IntegratedPosting>)> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&IntegratedPosting>> = HashMap::new();
    for posting in postings {
        let location = posting.posting.location.as_str();
        groups
            .entry(location)
            .or_insert_with(|| {
                order.push(location);
                Vec::new()
            })
            .push(posting);
    }
    order
        .into_iter()
        .filter_map(|location| groups.remove(location).map(|group| (location, group)))
        .collect()
}

fn salaries(postings: &[&IntegratedPosting]) -> Vec<f64> {
    postings.iter().filter_map(|p| p.posting.salary_avg).collect()
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Counts in descending order; ties keep first-seen order.
pub(crate) fn value_counts<T, I>(items: I) -> Vec<(T, usize)>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
