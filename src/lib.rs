//! WorkShift: automation-risk analytics for tech job roles.
//!
//! The [`risk`] module holds the scoring model every other part of the crate
//! consumes: posting analysis, the demand merge, text/CSV reports and the
//! dashboard API.

pub mod cli;
pub mod demand;
pub mod environment;
pub mod postings;
pub mod report;
pub mod risk;
pub mod utils;
pub mod web;

pub use risk::{map_title_to_role, RiskLevel, RiskModel, RiskResult};
