// src/web/handlers.rs
use super::types::*;
use crate::risk::{map_title_to_role, RiskLevel, RiskModel, RiskResult, RISK_FACTOR_WEIGHTS};

use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

pub type ApiResult<T> = Result<Json<DataResponse<T>>, Custom<Json<ErrorResponse>>>;

pub async fn health_handler() -> Json<&'static str> {
    info!("Health check");
    Json("OK")
}

pub async fn risk_report_handler(
    level: Option<String>,
    model: &State<RiskModel>,
) -> ApiResult<Vec<RiskResult>> {
    let report = model.report();

    let filtered = match level.as_deref() {
        None | Some("") | Some("All") | Some("all") => report,
        Some(name) => match name.parse::<RiskLevel>() {
            Ok(level) => report.into_iter().filter(|r| r.level == level).collect(),
            Err(e) => {
                warn!("Rejected risk report filter: {}", e);
                return Err(Custom(
                    Status::BadRequest,
                    Json(ErrorResponse::new(
                        e.to_string(),
                        "INVALID_RISK_LEVEL",
                        vec!["Use one of: Very Low, Low, Medium, High, Very High, All".to_string()],
                    )),
                ));
            }
        },
    };

    info!("Serving risk report with {} roles", filtered.len());
    Ok(Json(DataResponse::new(filtered)))
}

/// Unknown labels get the neutral fallback score with `known: false`.
pub async fn role_risk_handler(role: String, model: &State<RiskModel>) -> ApiResult<RoleRiskData> {
    let profile = model.profile(&role).copied();
    let contributions = model.factor_contributions(&role);
    if profile.is_none() {
        warn!("Unknown role requested, using fallback score: {}", role);
    }

    let result = model.assess(&role);
    Ok(Json(DataResponse::new(RoleRiskData {
        role: result.role,
        score: result.score,
        level: result.level,
        known: profile.is_some(),
        profile,
        contributions,
    })))
}

pub async fn classify_handler(score: f64, model: &State<RiskModel>) -> ApiResult<ClassifyData> {
    if !score.is_finite() {
        return Err(Custom(
            Status::BadRequest,
            Json(ErrorResponse::new(
                format!("Score must be a finite number, got {}", score),
                "INVALID_SCORE",
                vec!["Pass a score between 0 and 1".to_string()],
            )),
        ));
    }

    Ok(Json(DataResponse::new(ClassifyData {
        score,
        level: model.classify_level(score),
    })))
}

pub async fn map_title_handler(title: String, model: &State<RiskModel>) -> Json<DataResponse<TitleMappingData>> {
    let result = model.assess(map_title_to_role(&title));
    Json(DataResponse::new(TitleMappingData {
        title,
        role: result.role,
        score: result.score,
        level: result.level,
    }))
}

pub async fn factors_handler() -> Json<DataResponse<Vec<FactorWeightData>>> {
    Json(DataResponse::new(
        RISK_FACTOR_WEIGHTS
            .iter()
            .map(|&(factor, weight)| FactorWeightData {
                factor,
                weight,
                description: factor.description(),
            })
            .collect(),
    ))
}
