//! HTTP surface: the prediction API and the dashboard backend.

use crate::charts::{distance_by_role, income_by_education, DistanceByRole, IncomeByEducation};
use crate::dashboard::{profile_to_raw_input, widgets, Banner, Widget};
use crate::dataset::DatasetLoader;
use crate::error::{DatasetError, ServiceError};
use crate::metrics::MetricsSnapshot;
use crate::service::PredictionService;
use crate::types::{EmployeeProfile, PredictionResponse, RawInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Shared state handed to every handler.
pub struct AppState {
    pub service: PredictionService,
    pub dataset: DatasetLoader,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/health", get(health_handler))
        .route("/dashboard/widgets", get(widgets_handler))
        .route("/dashboard/predict", post(dashboard_predict_handler))
        .route(
            "/dashboard/charts/distance-by-role",
            get(distance_by_role_handler),
        )
        .route(
            "/dashboard/charts/income-by-education",
            get(income_by_education_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl ServiceError {
    /// Every service failure is a 500; `detail` keeps the kinds apart.
    fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Client-facing message. Load failures stay generic.
    fn detail(&self) -> String {
        match self {
            ServiceError::Load(_) => "Error loading model".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

impl IntoResponse for DatasetError {
    fn into_response(self) -> Response {
        error!(error = %self, "Dataset unavailable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "detail": format!("Dataset unavailable: {self}") })),
        )
            .into_response()
    }
}

/// Body that could not be read as the expected JSON, in the `{detail}` shape.
fn rejection_response(rejection: JsonRejection) -> Response {
    warn!(error = %rejection.body_text(), "Rejected request body");
    (
        rejection.status(),
        Json(json!({ "detail": rejection.body_text() })),
    )
        .into_response()
}

/// `POST /predict`: one record in, `{prediction, probability}` out.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawInput>, JsonRejection>,
) -> Response {
    let Json(raw) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match state.service.predict(&raw).await {
        Ok(result) => Json(PredictionResponse::from(result)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    metrics: MetricsSnapshot,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.service.handle().is_loaded(),
        metrics: state.service.metrics().snapshot(),
    })
}

async fn widgets_handler() -> Json<Vec<Widget>> {
    Json(widgets())
}

/// `POST /dashboard/predict`: widget state in, banner out.
async fn dashboard_predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EmployeeProfile>, JsonRejection>,
) -> (StatusCode, Json<Banner>) {
    let Json(profile) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected dashboard profile");
            return (
                rejection.status(),
                Json(Banner::error(rejection.body_text())),
            );
        }
    };

    let outcome = match profile_to_raw_input(&profile) {
        Ok(raw) => state.service.predict(&raw).await,
        Err(err) => {
            let err = ServiceError::from(err);
            state.service.metrics().record_failure(err.kind());
            warn!(kind = err.kind(), error = %err, "Dashboard profile rejected");
            Err(err)
        }
    };

    match outcome {
        Ok(result) => (StatusCode::OK, Json(Banner::from_result(&result))),
        Err(err) => (err.status(), Json(Banner::from_error(&err))),
    }
}

async fn distance_by_role_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DistanceByRole>>, DatasetError> {
    let records = state.dataset.get().await?;
    Ok(Json(distance_by_role(&records)))
}

async fn income_by_education_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<IncomeByEducation>>, DatasetError> {
    let records = state.dataset.get().await?;
    Ok(Json(income_by_education(&records)))
}
