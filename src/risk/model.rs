// src/risk/model.rs
use super::level::RiskLevel;
use super::profile::{RiskFactor, RoleProfile, RISK_FACTOR_WEIGHTS, ROLE_PROFILES};
use anyhow::Result;
use serde::Serialize;
use tracing::debug;

/// Score returned for labels missing from the profile table.
pub const UNKNOWN_ROLE_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskResult {
    pub role: String,
    pub score: f64,
    pub level: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorContribution {
    pub factor: RiskFactor,
    pub weight: f64,
    pub value: f64,
    pub contribution: f64,
}

/// Immutable automation-risk model over a fixed role table.
#[derive(Debug, Clone)]
pub struct RiskModel {
    profiles: Vec<(String, RoleProfile)>,
}

impl RiskModel {
    /// Model over the built-in role table.
    pub fn new() -> Result<Self> {
        Self::with_profiles(
            ROLE_PROFILES
                .iter()
                .map(|(label, profile)| (label.to_string(), *profile))
                .collect(),
        )
    }

    pub fn with_profiles(profiles: Vec<(String, RoleProfile)>) -> Result<Self> {
        let model = Self { profiles };
        model.validate()?;
        debug!("Risk model ready with {} role profiles", model.profiles.len());
        Ok(model)
    }

    /// Check every attribute and base risk lies in [0, 1] and labels are unique.
    pub fn validate(&self) -> Result<()> {
        for (index, (label, profile)) in self.profiles.iter().enumerate() {
            for (name, value) in profile.attributes() {
                if !(0.0..=1.0).contains(&value) {
                    anyhow::bail!(
                        "Role profile '{}' has {} = {} outside [0, 1]",
                        label,
                        name,
                        value
                    );
                }
            }

            if self.profiles[..index].iter().any(|(other, _)| other == label) {
                anyhow::bail!("Role profile '{}' is defined more than once", label);
            }
        }
        Ok(())
    }

    pub fn profile(&self, role: &str) -> Option<&RoleProfile> {
        self.profiles
            .iter()
            .find(|(label, _)| label == role)
            .map(|(_, profile)| profile)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|(label, _)| label.as_str())
    }

    pub fn profiles(&self) -> &[(String, RoleProfile)] {
        &self.profiles
    }

    /// Automation risk in [0, 1]. Unknown roles score [`UNKNOWN_ROLE_SCORE`].
    pub fn score(&self, role: &str) -> f64 {
        match self.profile(role) {
            Some(profile) => score_profile(profile),
            None => UNKNOWN_ROLE_SCORE,
        }
    }

    pub fn classify_level(&self, score: f64) -> RiskLevel {
        RiskLevel::from_score(score)
    }

    pub fn assess(&self, role: &str) -> RiskResult {
        let score = self.score(role);
        RiskResult {
            role: role.to_string(),
            score,
            level: self.classify_level(score),
        }
    }

    /// Every known role, highest risk first. Equal scores keep table order.
    pub fn report(&self) -> Vec<RiskResult> {
        let mut results: Vec<RiskResult> = self.roles().map(|role| self.assess(role)).collect();
        // sort_by is stable
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }

    /// Per-factor terms that move a known role away from its base risk.
    pub fn factor_contributions(&self, role: &str) -> Option<Vec<FactorContribution>> {
        let profile = self.profile(role)?;
        Some(
            RISK_FACTOR_WEIGHTS
                .iter()
                .map(|&(factor, weight)| {
                    let value = profile.factor(factor);
                    FactorContribution {
                        factor,
                        weight,
                        value,
                        contribution: weight * (value - 0.5),
                    }
                })
                .collect(),
        )
    }
}

fn score_profile(profile: &RoleProfile) -> f64 {
    // Factors are recentred on 0.5 so a neutral attribute contributes nothing.
    let raw = RISK_FACTOR_WEIGHTS
        .iter()
        .fold(profile.base_risk, |acc, &(factor, weight)| {
            acc + weight * (profile.factor(factor) - 0.5)
        });
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> RiskModel {
        RiskModel::new().unwrap()
    }

    #[test]
    fn test_builtin_table_is_valid() {
        assert!(model().validate().is_ok());
        assert_eq!(model().roles().count(), 14);
    }

    #[test]
    fn test_data_scientist_end_to_end() {
        let result = model().assess("Data Scientist");
        assert!((result.score - 0.1025).abs() < 1e-9);
        assert_eq!(result.level, RiskLevel::VeryLow);
    }

    #[test]
    fn test_unknown_role_fallback() {
        let model = model();
        assert_eq!(model.score("Nonexistent Role Xyz"), 0.5);
        assert_eq!(model.assess("Nonexistent Role Xyz").level, RiskLevel::High);
        // lookup is exact
        assert_eq!(model.score("data scientist"), 0.5);
    }

    #[test]
    fn test_scores_are_deterministic_and_bounded() {
        let model = model();
        for role in model.roles() {
            let first = model.score(role);
            let second = model.score(role);
            assert_eq!(first.to_bits(), second.to_bits());
            assert!((0.0..=1.0).contains(&first), "{} scored {}", role, first);
        }
    }

    #[test]
    fn test_neutral_profile_scores_base_risk() {
        let model = RiskModel::with_profiles(vec![
            ("Neutral".to_string(), RoleProfile::neutral(0.42)),
            ("Neutral Max".to_string(), RoleProfile::neutral(1.0)),
        ])
        .unwrap();
        assert!((model.score("Neutral") - 0.42).abs() < 1e-12);
        assert_eq!(model.score("Neutral Max"), 1.0);
    }

    #[test]
    fn test_score_is_clamped() {
        let extreme_high = RoleProfile {
            routine_tasks: 1.0,
            data_processing: 1.0,
            human_interaction: 0.0,
            creative_problem_solving: 0.0,
            technical_complexity: 0.0,
            physical_presence: 0.0,
            base_risk: 1.0,
        };
        let extreme_low = RoleProfile {
            routine_tasks: 0.0,
            data_processing: 0.0,
            human_interaction: 1.0,
            creative_problem_solving: 1.0,
            technical_complexity: 1.0,
            physical_presence: 1.0,
            base_risk: 0.0,
        };
        let model = RiskModel::with_profiles(vec![
            ("High".to_string(), extreme_high),
            ("Low".to_string(), extreme_low),
        ])
        .unwrap();
        assert_eq!(model.score("High"), 1.0);
        assert_eq!(model.score("Low"), 0.0);
    }

    #[test]
    fn test_report_is_sorted_descending() {
        let report = model().report();
        assert_eq!(report.len(), 14);
        assert!(report.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert_eq!(report[0].role, "Data Entry");
        assert_eq!(report[0].level, RiskLevel::VeryHigh);
    }

    #[test]
    fn test_report_keeps_table_order_for_ties() {
        let model = RiskModel::with_profiles(vec![
            ("First".to_string(), RoleProfile::neutral(0.3)),
            ("Top".to_string(), RoleProfile::neutral(0.9)),
            ("Second".to_string(), RoleProfile::neutral(0.3)),
        ])
        .unwrap();
        let order: Vec<String> = model.report().into_iter().map(|r| r.role).collect();
        assert_eq!(order, vec!["Top", "First", "Second"]);
    }

    #[test]
    fn test_validate_rejects_out_of_range_attribute() {
        let mut broken = RoleProfile::neutral(0.2);
        broken.technical_complexity = 1.2;
        let err = RiskModel::with_profiles(vec![("Broken".to_string(), broken)]).unwrap_err();
        assert!(err.to_string().contains("technical_complexity"));
    }

    #[test]
    fn test_validate_rejects_duplicate_labels() {
        let result = RiskModel::with_profiles(vec![
            ("Twin".to_string(), RoleProfile::neutral(0.2)),
            ("Twin".to_string(), RoleProfile::neutral(0.4)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_factor_contributions_sum_to_score() {
        let model = model();
        let profile = *model.profile("Data Scientist").unwrap();
        let contributions = model.factor_contributions("Data Scientist").unwrap();
        let total: f64 = contributions.iter().map(|c| c.contribution).sum();
        assert!((profile.base_risk + total - 0.1025).abs() < 1e-9);
        assert!(model.factor_contributions("Astronaut").is_none());
    }
}
