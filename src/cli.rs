// src/cli.rs
use crate::demand;
use crate::environment::EnvironmentConfig;
use crate::postings::{self, analysis::HIGH_RISK_THRESHOLD, analysis::LOW_RISK_THRESHOLD};
use crate::report;
use crate::risk::{map_title_to_role, RiskModel};
use crate::utils::write_file_content;
use crate::web::start_web_server;
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

const POSTINGS_FILE: &str = "consolidated_jobs.csv";

#[derive(Parser)]
#[command(name = "workshift")]
#[command(about = "Automation risk analytics for tech job roles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score a canonical role label
    Score { role: String },
    /// Map a risk score to its risk level
    Classify {
        #[arg(allow_negative_numbers = true)]
        score: f64,
    },
    /// Map a free-text job title to a role label and score it
    MapTitle { title: String },
    /// Print the risk ranking for every known role
    Report {
        /// Also write the report to the processed directory
        #[arg(long)]
        save: bool,
    },
    /// Export risk scores as CSV to the processed directory
    Export,
    /// Run the complete analysis: rankings, factors, timeline, mitigation, report and export
    Analyze,
    /// Attach risk scores to collected postings and summarise them
    Integrate {
        /// Postings CSV (defaults to <raw>/consolidated_jobs.csv)
        postings: Option<PathBuf>,
        /// Minimum postings for a location to be listed
        #[arg(long, default_value_t = 20)]
        min_location_jobs: usize,
    },
    /// Job-market statistics for collected postings
    Market {
        /// Postings CSV (defaults to <raw>/consolidated_jobs.csv)
        postings: Option<PathBuf>,
        /// Also write the report to the processed directory
        #[arg(long)]
        save: bool,
    },
    /// Merge job demand data with the automation risk reference table
    Merge {
        #[arg(long)]
        demand: Option<PathBuf>,
        #[arg(long)]
        reference: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Serve the risk model over HTTP for dashboards
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

fn format_salary(salary: Option<f64>) -> String {
    match salary {
        Some(value) => format!("${:.0}", value),
        None => "N/A".to_string(),
    }
}

pub async fn handle_command(cli: Cli, config: EnvironmentConfig, model: RiskModel) -> Result<()> {
    match cli.command {
        Command::Score { role } => {
            let result = model.assess(&role);
            if cli.json {
                print_json(&result)?;
            } else {
                println!("{}", report::ranking_line(&result));
                if model.profile(&role).is_none() {
                    println!("(unknown role, neutral default score)");
                }
            }
        }

        Command::Classify { score } => {
            let level = model.classify_level(score);
            if cli.json {
                print_json(&serde_json::json!({ "score": score, "level": level }))?;
            } else {
                println!("{:.4} -> {}", score, level);
            }
        }

        Command::MapTitle { title } => {
            let result = model.assess(map_title_to_role(&title));
            if cli.json {
                print_json(&serde_json::json!({ "title": title, "result": result }))?;
            } else {
                println!("{} -> {}", title, report::ranking_line(&result));
            }
        }

        Command::Report { save } => {
            let results = model.report();
            if cli.json {
                print_json(&results)?;
            } else {
                print!("{}", report::render_risk_report(&results, Local::now()));
            }
            if save {
                let path = report::save_risk_report(&model, &config.processed_path).await?;
                println!("✓ Report saved: {}", path.display());
            }
        }

        Command::Export => {
            let path = report::save_risk_export(&model, &config.processed_path).await?;
            println!("✓ Risk data exported: {}", path.display());
        }

        Command::Analyze => {
            print_section("WORKSHIFT.AI - AUTOMATION RISK ANALYSIS");
            print!("{}", report::render_full_analysis(&model));
            let report_path = report::save_risk_report(&model, &config.processed_path).await?;
            let export_path = report::save_risk_export(&model, &config.processed_path).await?;
            println!("\n✓ Report saved: {}", report_path.display());
            println!("✓ Risk data exported: {}", export_path.display());
        }

        Command::Integrate {
            postings: path,
            min_location_jobs,
        } => {
            let path = path.unwrap_or_else(|| config.raw_data_path.join(POSTINGS_FILE));
            let loaded = postings::load_postings_file(&path).await?;
            let integrated = postings::integrate(loaded, &model);
            let output = report::save_integrated_postings(&integrated, &config.processed_path).await?;
            let role_insights = postings::role_insights(&integrated, &model);
            let insights_path =
                report::save_role_insights(&role_insights, &config.processed_path).await?;

            let summary = IntegrationSummary {
                records: integrated.len(),
                demand_by_level: postings::demand_by_level(&integrated),
                salary_by_role: postings::salary_by_role(&integrated),
                salary_risk_correlation: postings::salary_risk_correlation(&integrated),
                high_risk_terms: postings::top_search_terms(
                    &integrated,
                    |p| p.automation_risk_score >= HIGH_RISK_THRESHOLD,
                    5,
                ),
                low_risk_terms: postings::top_search_terms(
                    &integrated,
                    |p| p.automation_risk_score < LOW_RISK_THRESHOLD,
                    5,
                ),
                locations: postings::location_risk(&integrated, min_location_jobs)
                    .into_iter()
                    .take(10)
                    .collect(),
                insights: postings::strategic_insights(&integrated),
                role_insights,
            };

            if cli.json {
                print_json(&summary)?;
            } else {
                print_integration_summary(&summary);
            }
            println!("\n✓ Integrated dataset saved: {}", output.display());
            println!("✓ Insights exported: {}", insights_path.display());
        }

        Command::Market {
            postings: path,
            save,
        } => {
            let path = path.unwrap_or_else(|| config.raw_data_path.join(POSTINGS_FILE));
            let loaded = postings::load_postings_file(&path).await?;
            let analysis = postings::analyze_market(&loaded);
            if cli.json {
                print_json(&analysis)?;
            } else {
                print!("{}", report::render_market_report(&analysis, Local::now()));
            }
            if save {
                let saved = report::save_market_report(&analysis, &config.processed_path).await?;
                println!("✓ Report saved: {}", saved.display());
            }
        }

        Command::Merge {
            demand: demand_path,
            reference,
            output,
        } => {
            let demand_path =
                demand_path.unwrap_or_else(|| config.raw_data_path.join("raw_job_demand.csv"));
            let reference_path = reference
                .unwrap_or_else(|| config.raw_data_path.join("automation_risk_reference.csv"));
            let output =
                output.unwrap_or_else(|| config.processed_path.join("clean_job_trends.csv"));

            let demand_bytes = tokio::fs::read(&demand_path)
                .await
                .with_context(|| format!("Could not find file: {}", demand_path.display()))?;
            let reference_bytes = tokio::fs::read(&reference_path)
                .await
                .with_context(|| format!("Could not find file: {}", reference_path.display()))?;
            let demand_table = demand::load_demand(demand_bytes.as_slice())?;
            let reference_table = demand::load_risk_reference(reference_bytes.as_slice())?;

            let merged = demand::merge(&demand_table, &reference_table)?;
            let mut buffer = Vec::new();
            merged.write_csv(&mut buffer)?;
            let content = String::from_utf8(buffer).context("Merged CSV is not valid UTF-8")?;
            write_file_content(&output, &content).await?;
            println!("✓ Cleaned data saved to {}", output.display());
        }

        Command::Serve { port } => {
            config.ensure_directories().await?;
            start_web_server(model, port.unwrap_or(config.port)).await?;
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct IntegrationSummary {
    records: usize,
    demand_by_level: Vec<postings::LevelDemand>,
    salary_by_role: Vec<postings::RoleSalary>,
    salary_risk_correlation: Option<f64>,
    high_risk_terms: Vec<(String, usize)>,
    low_risk_terms: Vec<(String, usize)>,
    locations: Vec<postings::LocationRisk>,
    insights: postings::StrategicInsights,
    role_insights: Vec<postings::RoleInsight>,
}

fn print_integration_summary(summary: &IntegrationSummary) {
    print_section("INTEGRATED ROLE SUMMARY");
    print!("{}", report::render_role_summary(&summary.role_insights));

    println!("✓ Integrated dataset created with {} records", summary.records);

    print_section("SALARY VS AUTOMATION RISK ANALYSIS");
    if summary.salary_by_role.is_empty() {
        println!("No salary data available for risk analysis");
    }
    for row in &summary.salary_by_role {
        println!(
            "{:25} | Risk: {:.2} ({:10}) | Avg Salary: {} | Jobs: {}",
            row.role,
            row.risk_score,
            crate::risk::RiskLevel::from_score(row.risk_score).label(),
            format_salary(Some(row.avg_salary)),
            row.job_count
        );
    }
    if let Some(correlation) = summary.salary_risk_correlation {
        println!("\nSalary-Risk Correlation: {:.3}", correlation);
        if correlation < -0.3 {
            println!("→ Strong negative correlation: Higher risk jobs tend to pay less");
        } else if correlation > 0.3 {
            println!("→ Strong positive correlation: Higher risk jobs tend to pay more");
        } else {
            println!("→ Weak correlation between automation risk and salary");
        }
    }

    print_section("MARKET DEMAND VS AUTOMATION RISK");
    for demand in &summary.demand_by_level {
        println!(
            "{:15} | {:5} jobs ({:5.1}%)",
            demand.level.label(),
            demand.count,
            demand.percentage
        );
    }
    if !summary.high_risk_terms.is_empty() {
        println!("\nMost Posted High-Risk Jobs (Risk ≥ {}):", HIGH_RISK_THRESHOLD);
        for (term, count) in &summary.high_risk_terms {
            println!("  • {}: {} postings", term, count);
        }
    }
    if !summary.low_risk_terms.is_empty() {
        println!("\nMost Posted Low-Risk Jobs (Risk < {}):", LOW_RISK_THRESHOLD);
        for (term, count) in &summary.low_risk_terms {
            println!("  • {}: {} postings", term, count);
        }
    }

    print_section("LOCATION-BASED RISK PATTERNS");
    for location in &summary.locations {
        println!(
            "{:30} | Risk: {:.3} | Jobs: {:3} | Avg Salary: {:>12}",
            location.location,
            location.avg_risk_score,
            location.job_count,
            format_salary(location.avg_salary)
        );
    }

    print_section("STRATEGIC INSIGHTS & RECOMMENDATIONS");
    let insights = &summary.insights;
    if !insights.safe_havens.is_empty() {
        println!("\n1. SAFE HAVEN CAREERS (Low automation risk + High demand):");
        for role in &insights.safe_havens {
            println!(
                "   • {}: {} openings | Risk: {:.2} | Avg salary: {}",
                role.search_term,
                role.openings,
                role.risk_score,
                format_salary(role.avg_salary)
            );
        }
    }
    if !insights.transition_warnings.is_empty() {
        println!("\n2. TRANSITION WARNING (High risk but still hiring):");
        for role in &insights.transition_warnings {
            println!(
                "   • {}: {} openings | Risk: {:.2} | Avg salary: {}",
                role.search_term,
                role.openings,
                role.risk_score,
                format_salary(role.avg_salary)
            );
        }
    }
    if let Some(premium) = &insights.salary_premium {
        println!("\n3. SALARY ANALYSIS:");
        println!("   • Low-risk roles average: {}", format_salary(Some(premium.low_risk_avg)));
        println!("   • High-risk roles average: {}", format_salary(Some(premium.high_risk_avg)));
        println!("   • Premium for low-risk roles: {:+.1}%", premium.premium_pct);
    }
    if !insights.best_locations.is_empty() {
        println!("\n4. GEOGRAPHIC RECOMMENDATIONS:");
        for location in &insights.best_locations {
            println!(
                "   • {}: Score {:.3} (Risk: {:.2}, Jobs: {}, Avg Salary: {})",
                location.location,
                location.score,
                location.avg_risk_score,
                location.job_count,
                format_salary(location.avg_salary)
            );
        }
    }
}
