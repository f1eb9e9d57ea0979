// src/web/mod.rs
//! Read-only JSON API feeding the dashboards.

pub mod handlers;
pub mod types;

pub use types::*;

use crate::risk::{RiskModel, RiskResult};
use anyhow::Result;
use handlers::ApiResult;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, routes, Build, Request, Response, Rocket, State};
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "GET, OPTIONS"));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/health")]
pub async fn health() -> Json<&'static str> {
    handlers::health_handler().await
}

#[get("/risk?<level>")]
pub async fn risk_report(level: Option<String>, model: &State<RiskModel>) -> ApiResult<Vec<RiskResult>> {
    handlers::risk_report_handler(level, model).await
}

#[get("/risk/<role>")]
pub async fn role_risk(role: String, model: &State<RiskModel>) -> ApiResult<RoleRiskData> {
    handlers::role_risk_handler(role, model).await
}

#[get("/classify?<score>")]
pub async fn classify(score: f64, model: &State<RiskModel>) -> ApiResult<ClassifyData> {
    handlers::classify_handler(score, model).await
}

#[get("/map-title?<title>")]
pub async fn map_title(
    title: String,
    model: &State<RiskModel>,
) -> Json<DataResponse<TitleMappingData>> {
    handlers::map_title_handler(title, model).await
}

#[get("/factors")]
pub async fn factors() -> Json<DataResponse<Vec<FactorWeightData>>> {
    handlers::factors_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST",
        vec!["Check the query parameters".to_string()],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND",
        vec!["Available endpoints: /health, /risk, /risk/<role>, /classify, /map-title, /factors"
            .to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Missing or invalid query parameter".to_string(),
        "UNPROCESSABLE",
        vec!["classify expects ?score=<number>, map-title expects ?title=<text>".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR",
        vec!["Try again in a few moments".to_string()],
    ))
}

pub fn build_rocket(model: RiskModel, figment: rocket::figment::Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Cors)
        .manage(model)
        .register(
            "/api",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                health,
                risk_report,
                role_risk,
                classify,
                map_title,
                factors,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(model: RiskModel, port: u16) -> Result<()> {
    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", port));

    info!("Starting WorkShift risk API on http://0.0.0.0:{}/api", port);

    let _rocket = build_rocket(model, figment)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Risk API server failed: {}", e))?;
    Ok(())
}
