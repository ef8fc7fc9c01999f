//! End-to-end checks against the recorded fixture model.

use attrition_predictor::dataset::DatasetLoader;
use attrition_predictor::metrics::ServiceMetrics;
use attrition_predictor::server::{build_router, AppState};
use attrition_predictor::{
    assemble, AssemblyError, LoadError, ModelHandle, ModelLoader, PredictionResponse, PredictionService, RawInput,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn scenario() -> Value {
    json!({
        "Age": 35,
        "MonthlyIncome": 6000,
        "OverTime": 1,
        "JobLevel": 2,
        "TotalWorkingYears": 10,
        "YearsAtCompany": 5,
        "BusinessTravel_NonTravel": 0,
        "BusinessTravel_Travel_Rarely": 1,
        "Department_Human_Resources": 0,
        "Department_Sales": 1
    })
}

fn raw(value: Value) -> RawInput {
    value.as_object().cloned().unwrap()
}

fn app(model: PathBuf) -> axum::Router {
    let handle = ModelHandle::new(model, ModelLoader::new());
    build_router(Arc::new(AppState {
        service: PredictionService::new(Arc::new(handle), Arc::new(ServiceMetrics::new())),
        dataset: DatasetLoader::new(fixture("hr_sample.csv").to_string_lossy()),
    }))
}

async fn call(app: axum::Router, method: &str, uri: &str, body: Option<&Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let resp = app.oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn regression_scenario_against_fixture_model() {
    let artifact = ModelLoader::new()
        .load_artifact(fixture("attrition_model.json"))
        .unwrap();

    let row = assemble(&raw(scenario()), artifact.schema()).unwrap();
    // Fixture columns are declared in a different order than the request
    assert_eq!(row.values()[0], 1.0);
    assert_eq!(row.values()[1], 35.0);

    let result = artifact.predict(&row).unwrap();
    assert_eq!(result.label, 1);
    assert!((result.probability - 0.645_656_306).abs() < 1e-6);

    let response = PredictionResponse::from(result);
    assert_eq!(response.probability, 0.6457);

    for _ in 0..5 {
        assert_eq!(artifact.predict(&row).unwrap(), result);
    }
}

#[test]
fn missing_artifact_is_a_load_error() {
    let err = ModelLoader::new()
        .load_artifact(fixture("does_not_exist.json"))
        .unwrap_err();
    assert!(matches!(err, LoadError::NotFound { .. }));
}

#[tokio::test]
async fn api_regression_scenario() {
    let (status, body) = call(
        app(fixture("attrition_model.json")),
        "POST",
        "/predict",
        Some(&scenario()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"prediction": 1, "probability": 0.6457}));
}

#[tokio::test]
async fn api_missing_artifact_returns_500() {
    let (status, body) = call(
        app(fixture("does_not_exist.json")),
        "POST",
        "/predict",
        Some(&scenario()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Error loading model"}));
}

#[tokio::test]
async fn api_rejects_out_of_domain_age() {
    let mut body = scenario();
    body["Age"] = json!(61);

    let (status, body) = call(app(fixture("attrition_model.json")), "POST", "/predict", Some(&body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("Age"));
}

#[test]
fn fixture_rejects_values_the_model_was_not_trained_on() {
    let artifact = ModelLoader::new()
        .load_artifact(fixture("attrition_model.json"))
        .unwrap();

    let cases = [
        ("Department_Sales", json!(7), "Department_Sales"),
        ("OverTime", json!(0.5), "OverTime"),
        ("Age", json!(35.7), "Age"),
        ("BusinessTravel_NonTravel", json!(1), "BusinessTravel"),
        ("MonthlyIncome", json!(1e39), "MonthlyIncome"),
    ];

    for (key, value, field) in cases {
        let mut input = raw(scenario());
        input.insert(key.to_string(), value);

        match assemble(&input, artifact.schema()) {
            Err(AssemblyError::InvalidValue { field: got, .. }) => assert_eq!(got, field, "{key}"),
            other => panic!("{key}: expected invalid value, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn api_overflowing_income_is_an_input_error() {
    let mut body = scenario();
    body["MonthlyIncome"] = json!(1e39);

    let (status, body) = call(app(fixture("attrition_model.json")), "POST", "/predict", Some(&body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("field 'MonthlyIncome' has an invalid value"), "{detail}");
}

#[tokio::test]
async fn dashboard_unseen_categories_fall_back_to_reference_level() {
    let profile = json!({
        "Age": 35,
        "MonthlyIncome": 6000,
        "OverTime": "Yes",
        "JobLevel": 2,
        "TotalWorkingYears": 10,
        "YearsAtCompany": 5,
        "BusinessTravel": "Travel_Frequently",
        "Department": "Research & Development"
    });

    let (status, body) = call(
        app(fixture("attrition_model.json")),
        "POST",
        "/dashboard/predict",
        Some(&profile),
    )
    .await;

    // Every travel and department indicator is 0: logit = -0.1
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level"], "success");
    assert_eq!(body["prediction"], 0);
    assert_eq!(body["probability"], 0.475);
}

#[tokio::test]
async fn dashboard_charts_from_sample_dataset() {
    let app = app(fixture("attrition_model.json"));

    let (status, body) = call(app.clone(), "GET", "/dashboard/charts/distance-by-role", None).await;
    assert_eq!(status, StatusCode::OK);
    let groups = body.as_array().unwrap();
    assert_eq!(groups[0]["job_role"], "Sales Executive");
    assert_eq!(groups[0]["attrition"], 1);
    assert!(groups
        .iter()
        .any(|g| g["job_role"] == "Laboratory Technician" && g["attrition"] == 0));

    let (status, body) = call(app, "GET", "/dashboard/charts/income-by-education", None).await;
    assert_eq!(status, StatusCode::OK);
    let bars = body.as_array().unwrap();
    assert_eq!(bars[0]["education_label"], "Below College");
    assert_eq!(bars[0]["attrition"], 0);
    // 5130, 3468, 2693
    assert_eq!(bars[0]["count"], 3);
    let mean = bars[0]["mean_monthly_income"].as_f64().unwrap();
    assert!((mean - 11291.0 / 3.0).abs() < 1e-9);
}
