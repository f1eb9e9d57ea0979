// src/demand.rs
//! Merge a dated job-demand series with the hand-authored automation-risk reference.

use crate::risk::UNKNOWN_ROLE_SCORE;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use csv::StringRecord;
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use tracing::{info, warn};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Generic table: header plus rows, column order preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    fn require_column(&self, name: &str, what: &str) -> Result<usize> {
        self.column(name)
            .with_context(|| format!("{} is missing the '{}' column", what, name))
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    // Year-month only
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn read_table<R: Read>(reader: R, what: &str) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read {} header", what))?
        .clone();

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        match result {
            Ok(record) => rows.push(record),
            Err(e) => warn!("Skipping unreadable {} row {}: {}", what, line + 1, e),
        }
    }

    info!(
        "Loaded {} with {} rows and {} columns",
        what,
        rows.len(),
        headers.len()
    );
    Ok(Table { headers, rows })
}

/// ISO date, with the time only when it is not midnight.
pub fn format_date(date: NaiveDateTime) -> String {
    if date.num_seconds_from_midnight() == 0 && date.nanosecond() == 0 {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn with_field(row: &StringRecord, index: usize, value: &str) -> StringRecord {
    row.iter()
        .enumerate()
        .map(|(i, field)| if i == index { value } else { field })
        .collect()
}

/// Rows with an unparseable date are dropped. The rest get ISO dates, are
/// sorted by date (stable) and exact duplicates removed.
pub fn load_demand<R: Read>(reader: R) -> Result<Table> {
    let mut table = read_table(reader, "job demand data")?;
    let date_col = table.require_column("date", "Job demand data")?;
    table.require_column("job_title", "Job demand data")?;

    let before = table.rows.len();
    let mut dated: Vec<(NaiveDateTime, StringRecord)> = table
        .rows
        .drain(..)
        .filter_map(|row| {
            let date = parse_date(row.get(date_col).unwrap_or_default())?;
            Some((date, with_field(&row, date_col, &format_date(date))))
        })
        .collect();
    if dated.len() < before {
        warn!("Dropped {} demand rows with invalid dates", before - dated.len());
    }

    dated.sort_by_key(|(date, _)| *date);

    let mut seen = HashSet::new();
    table.rows = dated
        .into_iter()
        .map(|(_, row)| row)
        .filter(|row| seen.insert(row.iter().map(str::to_string).collect::<Vec<_>>()))
        .collect();

    Ok(table)
}

pub fn load_risk_reference<R: Read>(reader: R) -> Result<Table> {
    let mut table = read_table(reader, "automation risk data")?;
    let title_col = table.require_column("job_title", "Automation risk data")?;
    table.require_column("automation_risk_score", "Automation risk data")?;

    for row in table.rows.iter_mut() {
        let title = row.get(title_col).unwrap_or_default().trim().to_string();
        *row = with_field(row, title_col, &title);
    }
    Ok(table)
}

fn merge_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Left join on normalised `job_title`. Demand rows without a usable
/// reference score get [`UNKNOWN_ROLE_SCORE`].
pub fn merge(demand: &Table, reference: &Table) -> Result<Table> {
    let demand_title = demand.require_column("job_title", "Job demand data")?;
    let ref_title = reference.require_column("job_title", "Automation risk data")?;
    let ref_score = reference.require_column("automation_risk_score", "Automation risk data")?;

    // Reference columns other than the join key are appended in their order.
    let extra_cols: Vec<usize> = (0..reference.headers.len())
        .filter(|&i| i != ref_title)
        .collect();
    let score_pos = extra_cols
        .iter()
        .position(|&i| i == ref_score)
        .context("automation_risk_score column vanished")?;

    // Column names present on both sides get _x (demand) and _y (reference).
    let reference_names: HashSet<&str> = extra_cols
        .iter()
        .map(|&i| reference.headers[i].trim())
        .collect();
    let demand_names: HashSet<&str> = demand
        .headers
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != demand_title)
        .map(|(_, header)| header.trim())
        .collect();
    let clashes = reference_names.intersection(&demand_names).count();
    if clashes > 0 {
        warn!("{} columns exist in both inputs; suffixed with _x/_y", clashes);
    }

    let mut headers = StringRecord::new();
    for (index, header) in demand.headers.iter().enumerate() {
        if index == demand_title {
            headers.push_field("job_title");
        } else if reference_names.contains(header.trim()) {
            headers.push_field(&format!("{}_x", header.trim()));
        } else {
            headers.push_field(header);
        }
    }
    for &i in &extra_cols {
        let header = &reference.headers[i];
        if demand_names.contains(header.trim()) {
            headers.push_field(&format!("{}_y", header.trim()));
        } else {
            headers.push_field(header);
        }
    }

    let mut lookup: HashMap<String, Vec<&StringRecord>> = HashMap::new();
    for row in &reference.rows {
        lookup
            .entry(merge_key(row.get(ref_title).unwrap_or_default()))
            .or_default()
            .push(row);
    }

    let fallback = UNKNOWN_ROLE_SCORE.to_string();
    let mut rows: Vec<StringRecord> = Vec::new();
    let mut unmatched = 0usize;

    for row in &demand.rows {
        let key = merge_key(row.get(demand_title).unwrap_or_default());
        let base: Vec<&str> = row
            .iter()
            .enumerate()
            .map(|(i, f)| if i == demand_title { key.as_str() } else { f })
            .collect();

        match lookup.get(&key) {
            Some(matches) => {
                for matched in matches {
                    let mut extras: Vec<&str> = extra_cols
                        .iter()
                        .map(|&i| matched.get(i).unwrap_or_default())
                        .collect();
                    if extras[score_pos].trim().parse::<f64>().is_err() {
                        extras[score_pos] = fallback.as_str();
                    }
                    rows.push(base.iter().chain(extras.iter()).copied().collect());
                }
            }
            None => {
                unmatched += 1;
                let extras = extra_cols.iter().enumerate().map(|(pos, _)| {
                    if pos == score_pos {
                        fallback.as_str()
                    } else {
                        ""
                    }
                });
                rows.push(base.iter().copied().chain(extras).collect());
            }
        }
    }

    if unmatched > 0 {
        warn!(
            "{} demand rows had no risk reference; scored {}",
            unmatched, UNKNOWN_ROLE_SCORE
        );
    }
    info!(
        "Merged dataset has {} rows and {} columns",
        rows.len(),
        headers.len()
    );
    Ok(Table { headers, rows })
}
