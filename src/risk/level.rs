// src/risk/level.rs
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Levels from lowest to highest.
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::VeryLow,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::VeryHigh,
    ];

    /// Band lower bounds are inclusive; the chain runs from the highest band down.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.70 {
            RiskLevel::VeryHigh
        } else if score >= 0.50 {
            RiskLevel::High
        } else if score >= 0.30 {
            RiskLevel::Medium
        } else if score >= 0.15 {
            RiskLevel::Low
        } else {
            RiskLevel::VeryLow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "Very Low",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }

    pub fn mitigation_strategies(self) -> &'static [&'static str] {
        match self {
            RiskLevel::VeryHigh => &[
                "Immediate upskilling to more complex roles",
                "Focus on creative and strategic aspects",
                "Develop strong human interaction skills",
                "Consider role transition within 1-2 years",
            ],
            RiskLevel::High => &[
                "Start learning AI/ML to work alongside automation",
                "Develop expertise in system design and architecture",
                "Focus on complex problem-solving skills",
                "Build domain expertise that AI cannot easily replicate",
            ],
            RiskLevel::Medium => &[
                "Enhance creative and strategic thinking abilities",
                "Develop leadership and communication skills",
                "Learn to manage and optimize AI systems",
                "Focus on cross-functional collaboration",
            ],
            RiskLevel::Low | RiskLevel::VeryLow => &[
                "Stay updated with AI developments in your field",
                "Learn to leverage AI tools for productivity",
                "Focus on innovation and creative solutions",
                "Develop unique expertise and specializations",
            ],
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    /// Accepts display names and compact spellings ("very-high", "VeryHigh").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match compact.as_str() {
            "verylow" => Ok(RiskLevel::VeryLow),
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "veryhigh" => Ok(RiskLevel::VeryHigh),
            _ => anyhow::bail!(
                "Unknown risk level: {}. Use Very Low, Low, Medium, High or Very High",
                s
            ),
        }
    }
}
