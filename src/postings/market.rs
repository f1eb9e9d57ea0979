// src/postings/market.rs
//! Job-market view of the collected postings: volume, demand, salaries and
//! hiring companies, independent of automation risk.

use super::analysis::{mean, value_counts};
use super::JobPosting;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

const TOP_N: usize = 10;
const TOP_COMPANIES: usize = 15;
const TOP_MARKETS_FOR_CONCENTRATION: usize = 5;
/// Minimum salaried postings for a role to appear in salary rankings.
pub const MIN_ROLE_SALARY_JOBS: usize = 5;
/// Minimum salaried postings for a location to appear in salary rankings.
pub const MIN_LOCATION_SALARY_JOBS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketStatistics {
    pub total_postings: usize,
    pub unique_companies: usize,
    pub unique_titles: usize,
    pub unique_locations: usize,
    /// Earliest and latest collection date
    pub date_range: Option<(String, String)>,
    pub by_source: Vec<(String, usize)>,
    pub salaried_postings: usize,
    pub salaried_pct: f64,
    /// Mean of `salary_min` and mean of `salary_max` over salaried postings
    pub avg_salary_range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketDemand {
    pub top_roles: Vec<(String, usize)>,
    pub top_locations: Vec<(String, usize)>,
    pub top_states: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryGroup {
    pub name: String,
    pub mean_salary: f64,
    pub job_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryAnalysis {
    pub salaried_postings: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub by_role: Vec<SalaryGroup>,
    pub by_location: Vec<SalaryGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketInsights {
    pub top_role: Option<(String, usize)>,
    pub highest_paying_role: Option<(String, f64)>,
    pub top_market: Option<(String, usize)>,
    pub top_company: Option<(String, usize)>,
    /// Share of all postings held by the five busiest locations
    pub location_concentration_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketAnalysis {
    pub statistics: MarketStatistics,
    pub demand: MarketDemand,
    pub salaries: Option<SalaryAnalysis>,
    pub top_companies: Vec<(String, usize)>,
    pub insights: MarketInsights,
}

pub fn analyze_market(postings: &[JobPosting]) -> MarketAnalysis {
    let analysis = MarketAnalysis {
        statistics: statistics(postings),
        demand: demand(postings),
        salaries: salaries(postings),
        top_companies: top(postings.iter().map(|p| p.company.as_str()), TOP_COMPANIES),
        insights: insights(postings),
    };
    info!(
        "Market analysis covers {} postings from {} sources",
        analysis.statistics.total_postings,
        analysis.statistics.by_source.len()
    );
    analysis
}

fn statistics(postings: &[JobPosting]) -> MarketStatistics {
    let total = postings.len();
    let salaried: Vec<(f64, f64)> = postings
        .iter()
        .filter_map(|p| Some((p.salary_min?, p.salary_max?)))
        .collect();

    let dates = postings
        .iter()
        .map(|p| p.collected_date.as_str())
        .filter(|d| !d.is_empty());
    let date_range = dates
        .clone()
        .min()
        .zip(dates.max())
        .map(|(first, last)| (first.to_string(), last.to_string()));

    let avg_salary_range = mean(&salaried.iter().map(|(min, _)| *min).collect::<Vec<_>>())
        .zip(mean(&salaried.iter().map(|(_, max)| *max).collect::<Vec<_>>()));

    MarketStatistics {
        total_postings: total,
        unique_companies: distinct(postings.iter().map(|p| p.company.as_str())),
        unique_titles: distinct(postings.iter().map(|p| p.title.as_str())),
        unique_locations: distinct(postings.iter().map(|p| p.location.as_str())),
        date_range,
        by_source: top(postings.iter().map(|p| p.source.as_str()), usize::MAX),
        salaried_postings: salaried.len(),
        salaried_pct: percentage(salaried.len(), total),
        avg_salary_range,
    }
}

fn demand(postings: &[JobPosting]) -> MarketDemand {
    MarketDemand {
        top_roles: top(postings.iter().map(|p| p.search_term.as_str()), TOP_N),
        top_locations: top(postings.iter().map(|p| p.location.as_str()), TOP_N),
        top_states: top(postings.iter().filter_map(|p| p.state.as_deref()), TOP_N),
    }
}

fn salaries(postings: &[JobPosting]) -> Option<SalaryAnalysis> {
    let mut values: Vec<f64> = postings.iter().filter_map(|p| p.salary_avg).collect();
    let average = mean(&values)?;
    values.sort_by(f64::total_cmp);

    let by_role = ranked_groups(postings, |p| &p.search_term, MIN_ROLE_SALARY_JOBS);
    let by_location = ranked_groups(postings, |p| &p.location, MIN_LOCATION_SALARY_JOBS);

    Some(SalaryAnalysis {
        salaried_postings: values.len(),
        mean: average,
        median: median(&values),
        min: values[0],
        max: values[values.len() - 1],
        by_role: by_role.into_iter().take(TOP_N).collect(),
        by_location: by_location.into_iter().take(TOP_N).collect(),
    })
}

fn insights(postings: &[JobPosting]) -> MarketInsights {
    let locations = top(postings.iter().map(|p| p.location.as_str()), usize::MAX);
    let concentrated: usize = locations
        .iter()
        .take(TOP_MARKETS_FOR_CONCENTRATION)
        .map(|(_, count)| count)
        .sum();

    // Compared on unrounded means
    let highest_paying_role = salary_groups(postings, |p| &p.search_term)
        .into_iter()
        .filter(|(_, salaries)| salaries.len() >= MIN_ROLE_SALARY_JOBS)
        .filter_map(|(name, salaries)| Some((name.to_string(), mean(&salaries)?)))
        .fold(None::<(String, f64)>, |best, candidate| match best {
            Some(best) if best.1 >= candidate.1 => Some(best),
            _ => Some(candidate),
        });

    MarketInsights {
        top_role: top(postings.iter().map(|p| p.search_term.as_str()), 1)
            .into_iter()
            .next(),
        highest_paying_role,
        top_market: locations.first().cloned(),
        top_company: top(postings.iter().map(|p| p.company.as_str()), 1)
            .into_iter()
            .next(),
        location_concentration_pct: percentage(concentrated, postings.len()),
    }
}

/// Salaried postings grouped by key in first-seen order.
fn salary_groups<'a, F>(postings: &'a [JobPosting], key: F) -> Vec<(&'a str, Vec<f64>)>
where
    F: Fn(&'a JobPosting) -> &'a String,
{
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for posting in postings {
        let Some(salary) = posting.salary_avg else {
            continue;
        };
        let name = key(posting).as_str();
        match groups.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, salaries)) => salaries.push(salary),
            None => groups.push((name, vec![salary])),
        }
    }
    groups
}

/// Groups with at least `min_jobs` salaries, highest rounded mean first.
fn ranked_groups<'a, F>(postings: &'a [JobPosting], key: F, min_jobs: usize) -> Vec<SalaryGroup>
where
    F: Fn(&'a JobPosting) -> &'a String,
{
    let mut groups: Vec<SalaryGroup> = salary_groups(postings, key)
        .into_iter()
        .filter(|(_, salaries)| salaries.len() >= min_jobs)
        .filter_map(|(name, salaries)| {
            Some(SalaryGroup {
                name: name.to_string(),
                mean_salary: mean(&salaries)?.round(),
                job_count: salaries.len(),
            })
        })
        .collect();
    groups.sort_by(|a, b| b.mean_salary.total_cmp(&a.mean_salary));
    groups
}

/// Most frequent non-empty values; ties keep first-seen order.
fn top<'a, I>(values: I, n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    value_counts(values.into_iter().filter(|v| !v.is_empty()))
        .into_iter()
        .take(n)
        .map(|(value, count)| (value.to_string(), count))
        .collect()
}

fn distinct<'a, I>(values: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Median of an ascending, non-empty slice.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(
        term: &str,
        company: &str,
        location: &str,
        salary: Option<(f64, f64)>,
        source: &str,
    ) -> JobPosting {
        JobPosting {
            title: format!("{} I", term),
            company: company.to_string(),
            location: location.to_string(),
            search_term: term.to_string(),
            salary_min: salary.map(|(min, _)| min),
            salary_max: salary.map(|(_, max)| max),
            salary_avg: salary.map(|(min, max)| (min + max) / 2.0),
            source: source.to_string(),
            state: crate::postings::extract_state(location),
            collected_date: "2024-03-01".to_string(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<JobPosting> {
        let mut postings = Vec::new();
        for i in 0..5 {
            let base = 140_000.0 + i as f64 * 1000.0;
            postings.push(posting("Data Scientist", "Acme", "Austin, TX", Some((base, base + 20_000.0)), "adzuna"));
        }
        for i in 0..6 {
            let base = 70_000.0 + i as f64 * 1000.0;
            postings.push(posting("Data Analyst", "Beta", "Boston, MA", Some((base, base + 10_000.0)), "jsearch"));
        }
        postings.push(posting("Data Analyst", "Acme", "Remote", None, "adzuna"));
        postings.push(posting("QA Tester", "", "Remote", None, "adzuna"));
        postings[0].collected_date = "2024-02-15".to_string();
        postings
    }

    #[test]
    fn test_statistics() {
        let stats = analyze_market(&sample()).statistics;
        assert_eq!(stats.total_postings, 13);
        // blank company is not counted
        assert_eq!(stats.unique_companies, 2);
        assert_eq!(stats.unique_locations, 3);
        assert_eq!(
            stats.date_range,
            Some(("2024-02-15".to_string(), "2024-03-01".to_string()))
        );
        assert_eq!(
            stats.by_source,
            vec![("adzuna".to_string(), 7), ("jsearch".to_string(), 6)]
        );
        assert_eq!(stats.salaried_postings, 11);
        assert!((stats.salaried_pct - 11.0 / 13.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_demand_rankings() {
        let demand = analyze_market(&sample()).demand;
        assert_eq!(demand.top_roles[0], ("Data Analyst".to_string(), 7));
        assert_eq!(demand.top_locations[0], ("Boston, MA".to_string(), 6));
        assert_eq!(
            demand.top_states,
            vec![("MA".to_string(), 6), ("TX".to_string(), 5)]
        );
    }

    #[test]
    fn test_salary_analysis() {
        let salaries = analyze_market(&sample()).salaries.unwrap();
        assert_eq!(salaries.salaried_postings, 11);
        assert_eq!(salaries.min, 75_000.0);
        assert_eq!(salaries.max, 154_000.0);
        assert_eq!(salaries.median, 80_000.0);

        let roles: Vec<&str> = salaries.by_role.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(roles, vec!["Data Scientist", "Data Analyst"]);
        assert_eq!(salaries.by_role[0].mean_salary, 152_000.0);
        assert_eq!(salaries.by_role[1].job_count, 6);
        // no location reaches ten salaried postings
        assert!(salaries.by_location.is_empty());
    }

    #[test]
    fn test_no_salary_data() {
        let postings = vec![posting("QA Tester", "Acme", "Remote", None, "adzuna")];
        assert!(analyze_market(&postings).salaries.is_none());
    }

    #[test]
    fn test_insights() {
        let analysis = analyze_market(&sample());
        let insights = analysis.insights;
        assert_eq!(insights.top_role, Some(("Data Analyst".to_string(), 7)));
        assert_eq!(
            insights.highest_paying_role,
            Some(("Data Scientist".to_string(), 152_000.0))
        );
        assert_eq!(insights.top_market, Some(("Boston, MA".to_string(), 6)));
        assert_eq!(insights.top_company, Some(("Acme".to_string(), 6)));
        assert!((insights.location_concentration_pct - 100.0).abs() < 1e-9);
        assert_eq!(analysis.top_companies.len(), 2);
    }

    #[test]
    fn test_empty_postings() {
        let analysis = analyze_market(&[]);
        assert_eq!(analysis.statistics.total_postings, 0);
        assert_eq!(analysis.statistics.salaried_pct, 0.0);
        assert!(analysis.insights.top_role.is_none());
        assert_eq!(analysis.insights.location_concentration_pct, 0.0);
    }
}
