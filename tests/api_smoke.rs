use rocket::http::Status;
use rocket::local::blocking::Client;
use serde_json::Value;
use workshift::risk::RiskModel;
use workshift::web::build_rocket;

fn client() -> Client {
    let model = RiskModel::new().unwrap();
    Client::tracked(build_rocket(model, rocket::Config::figment())).unwrap()
}

#[test]
fn health_is_ok() {
    let client = client();
    let response = client.get("/api/health").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
    assert_eq!(response.into_string().unwrap(), "\"OK\"");
}

#[test]
fn risk_report_is_sorted_and_filterable() {
    let client = client();

    let body: Value = client.get("/api/risk").dispatch().into_json().unwrap();
    let roles = body["data"].as_array().unwrap();
    assert_eq!(roles.len(), 14);
    let scores: Vec<f64> = roles.iter().map(|r| r["score"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let body: Value = client
        .get("/api/risk?level=Very%20Low")
        .dispatch()
        .into_json()
        .unwrap();
    let filtered = body["data"].as_array().unwrap();
    assert!(!filtered.is_empty());
    assert!(filtered.iter().all(|r| r["level"] == "Very Low"));

    let response = client.get("/api/risk?level=extreme").dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["error_code"], "INVALID_RISK_LEVEL");
}

#[test]
fn role_lookup_explains_score() {
    let client = client();

    let response = client.get("/api/risk/Data%20Scientist").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().unwrap();
    let score = body["data"]["score"].as_f64().unwrap();
    assert!((score - 0.1025).abs() < 1e-9);
    assert_eq!(body["data"]["level"], "Very Low");
    assert_eq!(body["data"]["known"], true);
    assert_eq!(body["data"]["contributions"].as_array().unwrap().len(), 6);
}

#[test]
fn unknown_role_gets_neutral_score() {
    let client = client();
    let response = client.get("/api/risk/Astronaut").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["data"]["role"], "Astronaut");
    assert_eq!(body["data"]["score"].as_f64().unwrap(), 0.5);
    assert_eq!(body["data"]["level"], "High");
    assert_eq!(body["data"]["known"], false);
    assert!(body["data"]["profile"].is_null());
    assert!(body["data"]["contributions"].is_null());
}

#[test]
fn classify_and_map_title() {
    let client = client();

    let body: Value = client
        .get("/api/classify?score=0.5")
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(body["data"]["level"], "High");

    let body: Value = client
        .get("/api/map-title?title=Senior%20DevOps%20Lead")
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(body["data"]["role"], "DevOps Engineer");

    let body: Value = client
        .get("/api/map-title?title=Barista")
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(body["data"]["role"], "Software Engineer");
}

#[test]
fn factors_list_all_weights() {
    let client = client();
    let body: Value = client.get("/api/factors").dispatch().into_json().unwrap();
    let factors = body["data"].as_array().unwrap();
    assert_eq!(factors.len(), 6);
    assert_eq!(factors[0]["factor"], "routine_tasks");
    assert_eq!(factors[0]["weight"].as_f64().unwrap(), 0.30);
}

#[test]
fn unknown_route_uses_json_catcher() {
    let client = client();
    let response = client.get("/api/forecast").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["error_code"], "NOT_FOUND");
}
