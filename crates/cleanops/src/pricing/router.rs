use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::repository::{ApprovalPublisher, EstimateId, EstimateRepository, RepositoryError};
use super::service::{EstimateService, EstimateServiceError, EstimateSubmission};

/// Router builder exposing HTTP endpoints for the estimate workflow.
pub fn estimate_router<R, A>(service: Arc<EstimateService<R, A>>) -> Router
where
    R: EstimateRepository + 'static,
    A: ApprovalPublisher + 'static,
{
    Router::new()
        .route("/api/v1/estimates", post(submit_handler::<R, A>))
        .route(
            "/api/v1/estimates/:estimate_id",
            get(status_handler::<R, A>),
        )
        .route(
            "/api/v1/estimates/:estimate_id/decision",
            post(decision_handler::<R, A>),
        )
        .with_state(service)
}

/// Body-shape problems, including unrecognized enum spellings, are caller
/// errors and answer 400, not the extractor's default 422.
pub fn json_rejection_response(rejection: JsonRejection) -> Response {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let payload = json!({ "error": err.body_text() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        other => other.into_response(),
    }
}

pub(crate) async fn submit_handler<R, A>(
    State(service): State<Arc<EstimateService<R, A>>>,
    submission: Result<axum::Json<EstimateSubmission>, JsonRejection>,
) -> Response
where
    R: EstimateRepository + 'static,
    A: ApprovalPublisher + 'static,
{
    let axum::Json(submission) = match submission {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };

    match service.submit(submission) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(EstimateServiceError::Quote(error)) if error.is_validation() => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(error @ EstimateServiceError::MarginFloor { .. })
        | Err(error @ EstimateServiceError::JustificationRequired) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(EstimateServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({ "error": "estimate already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<R, A>(
    State(service): State<Arc<EstimateService<R, A>>>,
    Path(estimate_id): Path<String>,
) -> Response
where
    R: EstimateRepository + 'static,
    A: ApprovalPublisher + 'static,
{
    let id = EstimateId(estimate_id);
    match service.get(&id) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(EstimateServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "estimate not found", "estimate_id": id.0 });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionRequest {
    pub(crate) approved: bool,
}

pub(crate) async fn decision_handler<R, A>(
    State(service): State<Arc<EstimateService<R, A>>>,
    Path(estimate_id): Path<String>,
    axum::Json(decision): axum::Json<DecisionRequest>,
) -> Response
where
    R: EstimateRepository + 'static,
    A: ApprovalPublisher + 'static,
{
    let id = EstimateId(estimate_id);
    match service.resolve_approval(&id, decision.approved) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(EstimateServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "estimate not found", "estimate_id": id.0 });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error @ EstimateServiceError::NotAwaitingApproval { .. }) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
