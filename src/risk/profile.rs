// src/risk/profile.rs
use serde::Serialize;

/// Per-role attribute scores feeding the risk model. Every field is in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoleProfile {
    pub routine_tasks: f64,
    pub data_processing: f64,
    pub human_interaction: f64,
    pub creative_problem_solving: f64,
    pub technical_complexity: f64,
    pub physical_presence: f64,
    pub base_risk: f64,
}

impl RoleProfile {
    /// Profile with every factor at its neutral midpoint.
    pub fn neutral(base_risk: f64) -> Self {
        Self {
            routine_tasks: 0.5,
            data_processing: 0.5,
            human_interaction: 0.5,
            creative_problem_solving: 0.5,
            technical_complexity: 0.5,
            physical_presence: 0.5,
            base_risk,
        }
    }

    pub fn factor(&self, factor: RiskFactor) -> f64 {
        match factor {
            RiskFactor::RoutineTasks => self.routine_tasks,
            RiskFactor::DataProcessing => self.data_processing,
            RiskFactor::HumanInteraction => self.human_interaction,
            RiskFactor::CreativeProblemSolving => self.creative_problem_solving,
            RiskFactor::TechnicalComplexity => self.technical_complexity,
            RiskFactor::PhysicalPresence => self.physical_presence,
        }
    }

    /// Named view of every attribute, base risk last.
    pub fn attributes(&self) -> [(&'static str, f64); 7] {
        [
            (RiskFactor::RoutineTasks.name(), self.routine_tasks),
            (RiskFactor::DataProcessing.name(), self.data_processing),
            (RiskFactor::HumanInteraction.name(), self.human_interaction),
            (
                RiskFactor::CreativeProblemSolving.name(),
                self.creative_problem_solving,
            ),
            (
                RiskFactor::TechnicalComplexity.name(),
                self.technical_complexity,
            ),
            (RiskFactor::PhysicalPresence.name(), self.physical_presence),
            ("base_risk", self.base_risk),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    RoutineTasks,
    DataProcessing,
    HumanInteraction,
    CreativeProblemSolving,
    TechnicalComplexity,
    PhysicalPresence,
}

impl RiskFactor {
    pub fn name(self) -> &'static str {
        match self {
            RiskFactor::RoutineTasks => "routine_tasks",
            RiskFactor::DataProcessing => "data_processing",
            RiskFactor::HumanInteraction => "human_interaction",
            RiskFactor::CreativeProblemSolving => "creative_problem_solving",
            RiskFactor::TechnicalComplexity => "technical_complexity",
            RiskFactor::PhysicalPresence => "physical_presence",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RiskFactor::RoutineTasks => "Routine, repetitive tasks",
            RiskFactor::DataProcessing => "Heavy data processing work",
            RiskFactor::HumanInteraction => "High human interaction needs",
            RiskFactor::CreativeProblemSolving => "Creative problem solving",
            RiskFactor::TechnicalComplexity => "Technical complexity",
            RiskFactor::PhysicalPresence => "Physical presence requirements",
        }
    }
}

/// Signed factor weights. Positive weights raise risk, negative ones lower it.
pub const RISK_FACTOR_WEIGHTS: [(RiskFactor, f64); 6] = [
    (RiskFactor::RoutineTasks, 0.30),
    (RiskFactor::DataProcessing, 0.20),
    (RiskFactor::HumanInteraction, -0.25),
    (RiskFactor::CreativeProblemSolving, -0.30),
    (RiskFactor::TechnicalComplexity, -0.15),
    (RiskFactor::PhysicalPresence, -0.10),
];

const fn profile(
    routine_tasks: f64,
    data_processing: f64,
    human_interaction: f64,
    creative_problem_solving: f64,
    technical_complexity: f64,
    physical_presence: f64,
    base_risk: f64,
) -> RoleProfile {
    RoleProfile {
        routine_tasks,
        data_processing,
        human_interaction,
        creative_problem_solving,
        technical_complexity,
        physical_presence,
        base_risk,
    }
}

// Table order is the report tie-break order.
pub static ROLE_PROFILES: [(&str, RoleProfile); 14] = [
    ("Data Entry", profile(0.95, 0.90, 0.10, 0.05, 0.20, 0.05, 0.85)),
    ("QA Tester", profile(0.70, 0.60, 0.30, 0.30, 0.40, 0.10, 0.65)),
    ("Data Analyst", profile(0.60, 0.85, 0.40, 0.50, 0.60, 0.05, 0.55)),
    ("Frontend Developer", profile(0.50, 0.40, 0.50, 0.70, 0.70, 0.05, 0.35)),
    ("Backend Developer", profile(0.55, 0.60, 0.35, 0.65, 0.80, 0.05, 0.40)),
    ("Full Stack Developer", profile(0.45, 0.50, 0.45, 0.75, 0.85, 0.05, 0.30)),
    ("DevOps Engineer", profile(0.65, 0.55, 0.40, 0.60, 0.90, 0.10, 0.45)),
    (
        "Machine Learning Engineer",
        profile(0.40, 0.80, 0.35, 0.85, 0.95, 0.05, 0.25),
    ),
    ("Data Scientist", profile(0.35, 0.85, 0.45, 0.90, 0.90, 0.05, 0.20)),
    ("Software Engineer", profile(0.40, 0.50, 0.50, 0.80, 0.85, 0.05, 0.25)),
    ("Cloud Engineer", profile(0.55, 0.50, 0.35, 0.65, 0.85, 0.05, 0.40)),
    ("Security Engineer", profile(0.45, 0.60, 0.40, 0.80, 0.90, 0.10, 0.30)),
    ("Product Manager", profile(0.30, 0.40, 0.90, 0.85, 0.50, 0.40, 0.15)),
    ("Engineering Manager", profile(0.25, 0.30, 0.95, 0.80, 0.60, 0.50, 0.10)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels_are_unique() {
        let mut labels: Vec<&str> = ROLE_PROFILES.iter().map(|(label, _)| *label).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), ROLE_PROFILES.len());
    }

    #[test]
    fn test_factor_accessor_matches_fields() {
        let (_, data_scientist) = ROLE_PROFILES
            .iter()
            .find(|(label, _)| *label == "Data Scientist")
            .unwrap();
        assert_eq!(data_scientist.factor(RiskFactor::RoutineTasks), 0.35);
        assert_eq!(data_scientist.factor(RiskFactor::DataProcessing), 0.85);
        assert_eq!(data_scientist.factor(RiskFactor::PhysicalPresence), 0.05);
    }

    #[test]
    fn test_weights_cover_every_factor_once() {
        let mut names: Vec<&str> = RISK_FACTOR_WEIGHTS.iter().map(|(f, _)| f.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }
}
