// src/report.rs
//! Text reports and CSV exports built on the risk model.

use crate::postings::market::{MIN_LOCATION_SALARY_JOBS, MIN_ROLE_SALARY_JOBS};
use crate::postings::{IntegratedPosting, MarketAnalysis, RoleInsight};
use crate::risk::{RiskLevel, RiskModel, RiskResult, RISK_FACTOR_WEIGHTS};
use crate::utils::{timestamped_file_path, write_file_content};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;

const RULE_WIDTH: usize = 60;

/// Capabilities expected of AI systems per period.
pub const AI_TIMELINE: [(&str, &[&str]); 4] = [
    ("current", &["Data entry", "Basic testing", "Simple analysis"]),
    (
        "2025-2027",
        &["Complex testing", "Report generation", "Code review"],
    ),
    (
        "2028-2030",
        &["Basic coding", "Data pipeline creation", "Architecture design"],
    ),
    (
        "2030+",
        &["Complex problem solving", "Strategic planning", "Innovation"],
    ),
];

/// Roles expected to feel automation per period.
pub const IMPACT_TIMELINE: [(&str, &[&str]); 4] = [
    ("Current (2024)", &["Data Entry", "QA Tester"]),
    ("2025-2027", &["Data Analyst", "DevOps Engineer (partial)"]),
    (
        "2028-2030",
        &["Backend Developer (partial)", "Frontend Developer (partial)"],
    ),
    ("2030+", &["Limited impact on creative/leadership roles"]),
];

#[derive(Debug, Serialize)]
pub struct RiskExportRow<'a> {
    pub role: &'a str,
    pub automation_risk_score: f64,
    pub risk_level: RiskLevel,
    pub routine_tasks: f64,
    pub human_interaction: f64,
    pub creative_problem_solving: f64,
    pub technical_complexity: f64,
}

fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

pub fn ranking_line(result: &RiskResult) -> String {
    format!(
        "{:25} | Risk: {:.2} ({})",
        result.role, result.score, result.level
    )
}

pub fn render_risk_report(results: &[RiskResult], generated_at: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("WorkShift.AI - Automation Risk Analysis Report\n");
    let _ = writeln!(
        out,
        "Generated on: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "{}\n", rule('='));

    out.push_str("AUTOMATION RISK RANKINGS\n");
    let _ = writeln!(out, "{}", rule('-'));
    for result in results {
        let _ = writeln!(out, "{}", ranking_line(result));
    }

    let _ = writeln!(out, "\n{}", rule('='));
    out.push_str("END OF REPORT\n");
    out
}

pub fn render_factor_summary() -> String {
    let mut out = String::from("Factors that INCREASE automation risk:\n");
    for (factor, weight) in RISK_FACTOR_WEIGHTS.iter().filter(|(_, w)| *w > 0.0) {
        let _ = writeln!(
            out,
            "• {} ({:.0}% weight)",
            factor.description(),
            weight * 100.0
        );
    }
    out.push_str("\nFactors that DECREASE automation risk:\n");
    for (factor, weight) in RISK_FACTOR_WEIGHTS.iter().filter(|(_, w)| *w < 0.0) {
        let _ = writeln!(
            out,
            "• {} ({:.0}% weight)",
            factor.description(),
            weight * 100.0
        );
    }
    out
}

pub fn render_timeline() -> String {
    let mut out = String::new();
    for (period, capabilities) in AI_TIMELINE {
        let _ = writeln!(out, "{}:", period);
        for capability in capabilities {
            let _ = writeln!(out, "  • {}", capability);
        }
    }
    let _ = writeln!(out, "\nESTIMATED JOB IMPACT BY PERIOD");
    for (period, roles) in IMPACT_TIMELINE {
        let _ = writeln!(out, "{}:", period);
        for role in roles {
            let _ = writeln!(out, "  • {}", role);
        }
    }
    out
}

pub fn render_mitigation() -> String {
    let mut out = String::new();
    for level in RiskLevel::ALL.iter().rev().filter(|l| **l != RiskLevel::VeryLow) {
        let _ = writeln!(out, "{} Risk Roles:", level);
        for strategy in level.mitigation_strategies() {
            let _ = writeln!(out, "  • {}", strategy);
        }
    }
    out
}

/// Every section of the complete analysis, for terminal output.
pub fn render_full_analysis(model: &RiskModel) -> String {
    let sections = [
        ("AUTOMATION RISK ANALYSIS BY ROLE", {
            model
                .report()
                .iter()
                .map(|r| format!("{}\n", ranking_line(r)))
                .collect::<String>()
        }),
        ("KEY AUTOMATION RISK FACTORS", render_factor_summary()),
        ("AI AUTOMATION TIMELINE", render_timeline()),
        ("RISK MITIGATION STRATEGIES", render_mitigation()),
    ];

    let mut out = String::new();
    for (title, body) in sections {
        let _ = write!(out, "\n{}\n{}\n{}\n{}", rule('='), title, rule('='), body);
    }
    out
}

pub fn write_risk_export<W: Write>(model: &RiskModel, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for (role, profile) in model.profiles() {
        let score = model.score(role);
        writer.serialize(RiskExportRow {
            role,
            automation_risk_score: score,
            risk_level: model.classify_level(score),
            routine_tasks: profile.routine_tasks,
            human_interaction: profile.human_interaction,
            creative_problem_solving: profile.creative_problem_solving,
            technical_complexity: profile.technical_complexity,
        })?;
    }
    writer.flush().context("Failed to flush risk export")?;
    Ok(())
}

fn money(value: f64) -> String {
    format!("${:.0}", value)
}

fn section(out: &mut String, title: &str) {
    let _ = write!(out, "\n{}\n{}\n{}\n", rule('='), title, rule('='));
}

/// Job-market report over collected postings.
pub fn render_market_report(analysis: &MarketAnalysis, generated_at: DateTime<Local>) -> String {
    let mut out = String::from("WorkShift.AI - Job Market Analysis Report\n");
    let _ = writeln!(
        out,
        "Generated on: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "{}", rule('='));

    let stats = &analysis.statistics;
    section(&mut out, "BASIC DATASET STATISTICS");
    let _ = writeln!(out, "Total job postings: {}", stats.total_postings);
    let _ = writeln!(out, "Unique companies: {}", stats.unique_companies);
    let _ = writeln!(out, "Unique job titles: {}", stats.unique_titles);
    let _ = writeln!(out, "Unique locations: {}", stats.unique_locations);
    if let Some((first, last)) = &stats.date_range {
        let _ = writeln!(out, "Date range: {} to {}", first, last);
    }
    out.push_str("\nData sources breakdown:\n");
    for (source, count) in &stats.by_source {
        let _ = writeln!(out, "  {}: {} jobs", source, count);
    }
    out.push_str("\nSalary data availability:\n");
    let _ = writeln!(
        out,
        "  Jobs with salary info: {} ({:.1}%)",
        stats.salaried_postings, stats.salaried_pct
    );
    if let Some((min, max)) = stats.avg_salary_range {
        let _ = writeln!(out, "  Average salary range: {} - {}", money(min), money(max));
    }

    let demand = &analysis.demand;
    section(&mut out, "JOB DEMAND ANALYSIS");
    let ranked = [
        ("Top 10 Most In-Demand Roles:", &demand.top_roles),
        ("Top 10 Job Markets by Volume:", &demand.top_locations),
        ("Top States for Tech Jobs:", &demand.top_states),
    ];
    for (title, rows) in ranked {
        let _ = writeln!(out, "\n{}", title);
        for (name, count) in rows {
            let _ = writeln!(out, "  {}: {} postings", name, count);
        }
    }

    section(&mut out, "SALARY ANALYSIS");
    match &analysis.salaries {
        None => out.push_str("No salary data available for analysis\n"),
        Some(salaries) => {
            let _ = writeln!(
                out,
                "Analyzing {} jobs with salary data",
                salaries.salaried_postings
            );
            out.push_str("\nOverall Salary Statistics:\n");
            let _ = writeln!(out, "  Average salary: {}", money(salaries.mean));
            let _ = writeln!(out, "  Median salary: {}", money(salaries.median));
            let _ = writeln!(
                out,
                "  Salary range: {} - {}",
                money(salaries.min),
                money(salaries.max)
            );
            let groups = [
                (
                    format!("Average Salary by Role (min {} jobs):", MIN_ROLE_SALARY_JOBS),
                    &salaries.by_role,
                ),
                (
                    format!("Average Salary by Location (min {} jobs):", MIN_LOCATION_SALARY_JOBS),
                    &salaries.by_location,
                ),
            ];
            for (title, rows) in groups {
                let _ = writeln!(out, "\n{}", title);
                for group in rows {
                    let _ = writeln!(
                        out,
                        "  {}: {} (based on {} jobs)",
                        group.name,
                        money(group.mean_salary),
                        group.job_count
                    );
                }
            }
        }
    }

    section(&mut out, "COMPANY HIRING ANALYSIS");
    let _ = writeln!(out, "Top {} Hiring Companies:", analysis.top_companies.len());
    for (company, count) in &analysis.top_companies {
        let _ = writeln!(out, "  {}: {} job postings", company, count);
    }

    let insights = &analysis.insights;
    section(&mut out, "KEY BUSINESS INSIGHTS");
    if let Some((role, count)) = &insights.top_role {
        let _ = writeln!(out, "1. HIGHEST DEMAND ROLE\n   {} with {} job postings", role, count);
    }
    if let Some((role, salary)) = &insights.highest_paying_role {
        let _ = writeln!(
            out,
            "\n2. HIGHEST PAYING ROLE\n   {} with average salary {}",
            role,
            money(*salary)
        );
    }
    if let Some((market, count)) = &insights.top_market {
        let _ = writeln!(out, "\n3. TOP JOB MARKET\n   {} with {} job postings", market, count);
    }
    if let Some((company, count)) = &insights.top_company {
        let _ = writeln!(
            out,
            "\n4. TOP HIRING COMPANY\n   {} with {} job postings",
            company, count
        );
    }
    let _ = writeln!(
        out,
        "\n5. MARKET CONCENTRATION\n   Top 5 locations account for {:.1}% of all jobs",
        insights.location_concentration_pct
    );

    let _ = writeln!(out, "\n{}", rule('='));
    out.push_str("END OF REPORT\n");
    out
}

/// Fixed-width role summary printed alongside the insights export.
pub fn render_role_summary(rows: &[RoleInsight]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<25} {:<12} {:<12} {:<8} {:<12} {:<20}",
        "Role", "Risk Score", "Risk Level", "Jobs", "Avg Salary", "Top Location"
    );
    let _ = writeln!(out, "{}", "-".repeat(100));
    for row in rows {
        let salary = row.avg_salary.map(money).unwrap_or_else(|| "N/A".to_string());
        let _ = writeln!(
            out,
            "{:<25} {:<12.2} {:<12} {:<8} {:<12} {:<20}",
            row.role,
            row.automation_risk_score,
            row.risk_level.label(),
            row.job_count,
            salary,
            row.top_location
        );
    }
    out
}

fn csv_string<T, I>(rows: I, what: &str) -> Result<String>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish {}: {}", what, e))?;
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", what))
}

pub async fn save_role_insights(rows: &[RoleInsight], processed_dir: &Path) -> Result<PathBuf> {
    let path = timestamped_file_path(processed_dir, "integrated_insights", "csv", Local::now());
    let content = csv_string(rows, "role insights")?;
    write_file_content(&path, &content).await?;
    info!("Insights exported: {}", path.display());
    Ok(path)
}

pub async fn save_integrated_postings(
    postings: &[IntegratedPosting],
    processed_dir: &Path,
) -> Result<PathBuf> {
    let path = timestamped_file_path(processed_dir, "integrated_jobs", "csv", Local::now());
    let content = csv_string(postings.iter().map(IntegratedPosting::row), "integrated CSV")?;
    write_file_content(&path, &content).await?;
    info!("Integrated dataset written to {}", path.display());
    Ok(path)
}

pub async fn save_market_report(analysis: &MarketAnalysis, processed_dir: &Path) -> Result<PathBuf> {
    let now = Local::now();
    let path = timestamped_file_path(processed_dir, "job_market_report", "txt", now);
    write_file_content(&path, &render_market_report(analysis, now)).await?;
    info!("Market report saved: {}", path.display());
    Ok(path)
}

pub async fn save_risk_report(model: &RiskModel, processed_dir: &Path) -> Result<PathBuf> {
    let now = Local::now();
    let path = timestamped_file_path(processed_dir, "automation_risk_report", "txt", now);
    write_file_content(&path, &render_risk_report(&model.report(), now)).await?;
    info!("Report saved: {}", path.display());
    Ok(path)
}

pub async fn save_risk_export(model: &RiskModel, processed_dir: &Path) -> Result<PathBuf> {
    let path = timestamped_file_path(processed_dir, "automation_risk_scores", "csv", Local::now());
    let mut buffer = Vec::new();
    write_risk_export(model, &mut buffer)?;
    let content = String::from_utf8(buffer).context("Risk export is not valid UTF-8")?;
    write_file_content(&path, &content).await?;
    info!("Risk data exported: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ranking_line_format() {
        let line = ranking_line(&RiskResult {
            role: "Data Scientist".to_string(),
            score: 0.1025,
            level: RiskLevel::VeryLow,
        });
        assert_eq!(line, "Data Scientist            | Risk: 0.10 (Very Low)");
    }

    #[test]
    fn test_render_risk_report() {
        let model = RiskModel::new().unwrap();
        let at = Local.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let report = render_risk_report(&model.report(), at);

        assert!(report.contains("Generated on: 2024-06-01 09:30:00"));
        assert!(report.ends_with("END OF REPORT\n"));
        let first_rank = report
            .lines()
            .find(|l| l.contains("| Risk:"))
            .unwrap();
        assert!(first_rank.starts_with("Data Entry"));
        assert!(first_rank.ends_with("(Very High)"));
    }

    #[test]
    fn test_factor_summary_lists_weights() {
        let summary = render_factor_summary();
        assert!(summary.contains("• Routine, repetitive tasks (30% weight)"));
        assert!(summary.contains("• Creative problem solving (-30% weight)"));
    }

    #[test]
    fn test_risk_export_columns() {
        let model = RiskModel::new().unwrap();
        let mut out = Vec::new();
        write_risk_export(&model, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "role,automation_risk_score,risk_level,routine_tasks,human_interaction,creative_problem_solving,technical_complexity"
        );
        assert!(lines.next().unwrap().starts_with("Data Entry,1.0,Very High,0.95,"));
        assert_eq!(text.lines().count(), 15);
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("workshift_report_{}_{}", name, std::process::id()))
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_save_risk_report_and_export() {
        let model = RiskModel::new().unwrap();
        let dir = temp_dir("risk");

        let report_path = save_risk_report(&model, &dir).await.unwrap();
        let export_path = save_risk_export(&model, &dir).await.unwrap();

        let names = file_names(&dir);
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("automation_risk_report_") && names[0].ends_with(".txt"));
        assert!(names[1].starts_with("automation_risk_scores_") && names[1].ends_with(".csv"));

        let report = std::fs::read_to_string(&report_path).unwrap();
        assert_eq!(
            report.lines().next(),
            Some("WorkShift.AI - Automation Risk Analysis Report")
        );
        let export = std::fs::read_to_string(&export_path).unwrap();
        assert!(export.starts_with("role,automation_risk_score,risk_level,"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    fn integrated_sample(model: &RiskModel) -> Vec<IntegratedPosting> {
        let csv = "\
title,company,location,salary_min,salary_max,search_term,source
DS,Acme,\"Austin, TX\",100000,120000,Data Scientist,adzuna
QA,Beta,Remote,,,QA Tester,adzuna
QA,Beta,Remote,50000,60000,QA Tester,jsearch
";
        crate::postings::integrate(crate::postings::load_postings(csv.as_bytes()).unwrap(), model)
    }

    #[tokio::test]
    async fn test_save_integrated_outputs() {
        let model = RiskModel::new().unwrap();
        let integrated = integrated_sample(&model);
        let insights = crate::postings::analysis::role_insights(&integrated, &model);
        let dir = temp_dir("integrated");

        let jobs_path = save_integrated_postings(&integrated, &dir).await.unwrap();
        let insights_path = save_role_insights(&insights, &dir).await.unwrap();

        let jobs = std::fs::read_to_string(&jobs_path).unwrap();
        let mut lines = jobs.lines();
        assert_eq!(
            lines.next().unwrap(),
            "title,company,location,state,search_term,salary_avg,source,risk_category,automation_risk_score,risk_level"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("DS,Acme,\"Austin, TX\",TX,Data Scientist,110000.0,adzuna,Data Scientist,"));
        assert!(first.ends_with(",Very Low"));

        let text = std::fs::read_to_string(&insights_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Role,Automation_Risk_Score,Risk_Level,Job_Count,Avg_Salary,Min_Salary,Max_Salary,Top_Location,Top_Company"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("Data Scientist,"));
        assert!(first.contains(",Very Low,1,110000.0,110000.0,110000.0,\"Austin, TX\",Acme"));
        assert!(lines.next().unwrap().starts_with("QA Tester,"));
        assert!(insights_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("integrated_insights_"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_role_summary_table() {
        let model = RiskModel::new().unwrap();
        let insights = crate::postings::analysis::role_insights(&integrated_sample(&model), &model);
        let text = render_role_summary(&insights);
        assert!(text.starts_with("Role "));
        let first = text.lines().nth(2).unwrap();
        assert!(first.starts_with("Data Scientist"));
        assert!(first.contains("$110000"));
    }

    #[tokio::test]
    async fn test_save_market_report() {
        let model = RiskModel::new().unwrap();
        let postings: Vec<_> = integrated_sample(&model)
            .into_iter()
            .map(|p| p.posting)
            .collect();
        let analysis = crate::postings::analyze_market(&postings);
        let dir = temp_dir("market");

        let path = save_market_report(&analysis, &dir).await.unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("job_market_report_"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("WorkShift.AI - Job Market Analysis Report\n"));
        assert!(text.contains("Total job postings: 3"));
        assert!(text.contains("  adzuna: 2 jobs"));
        assert!(text.contains("1. HIGHEST DEMAND ROLE\n   QA Tester with 2 job postings"));
        assert!(text.ends_with("END OF REPORT\n"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_mitigation_skips_very_low() {
        let text = render_mitigation();
        assert!(text.starts_with("Very High Risk Roles:"));
        assert!(!text.contains("Very Low Risk Roles:"));
    }
}
