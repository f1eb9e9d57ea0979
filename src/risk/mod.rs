// src/risk/mod.rs
//! Automation-risk scoring over a fixed table of role profiles.

pub mod level;
pub mod model;
pub mod normalize;
pub mod profile;

pub use level::RiskLevel;
pub use model::{FactorContribution, RiskModel, RiskResult, UNKNOWN_ROLE_SCORE};
pub use normalize::{map_title_to_role, DEFAULT_ROLE};
pub use profile::{RiskFactor, RoleProfile, RISK_FACTOR_WEIGHTS, ROLE_PROFILES};
