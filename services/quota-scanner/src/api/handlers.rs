use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::types::{ErrorResponse, ScanRequest, ScanResponse};
use super::ApiState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

pub async fn scan_project(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ScanRequest>,
) -> ApiResult<ScanResponse> {
    let project_id = request.project_id.trim();
    if project_id.is_empty() {
        return Err(bad_request("invalid_project_id", "project_id cannot be empty"));
    }

    let summary = state.scanner.scan_project(project_id).await;

    Ok(Json(ScanResponse {
        project_id: project_id.to_string(),
        summary,
    }))
}

pub async fn health_check() -> ApiResult<serde_json::Value> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "quota-scanner"
    })))
}

fn bad_request(code: &str, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details: None,
        }),
    )
}
