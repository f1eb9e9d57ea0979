// src/web/types.rs
use crate::risk::{FactorContribution, RiskFactor, RiskLevel, RoleProfile};
use rocket::serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: String, error_code: &str, suggestions: Vec<String>) -> Self {
        Self {
            success: false,
            error,
            error_code: error_code.to_string(),
            suggestions,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RoleRiskData {
    pub role: String,
    pub score: f64,
    pub level: RiskLevel,
    pub known: bool,
    pub profile: Option<RoleProfile>,
    pub contributions: Option<Vec<FactorContribution>>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ClassifyData {
    pub score: f64,
    pub level: RiskLevel,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TitleMappingData {
    pub title: String,
    pub role: String,
    pub score: f64,
    pub level: RiskLevel,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct FactorWeightData {
    pub factor: RiskFactor,
    pub weight: f64,
    pub description: &'static str,
}
