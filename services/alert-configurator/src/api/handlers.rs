use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info};

use super::types::{ConfigureRequest, ConfigureResponse, ErrorResponse};
use super::ApiState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

pub async fn configure(
    State(state): State<Arc<ApiState>>,
    payload: Option<Json<ConfigureRequest>>,
) -> ApiResult<ConfigureResponse> {
    if let Some(Json(request)) = &payload {
        if let Some(object) = &request.name {
            info!(object = %object, "configuration triggered by storage event");
        }
    }

    match state.provisioner.run().await {
        Ok(summary) => Ok(Json(ConfigureResponse { summary })),
        Err(err) if err.is_integrity_violation() => Err(conflict(err)),
        Err(err) => Err(internal_error(err)),
    }
}

pub async fn health_check() -> ApiResult<serde_json::Value> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "alert-configurator"
    })))
}

fn conflict<E: std::fmt::Display>(err: E) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %err, "configuration pass aborted on integrity violation");
    (
        StatusCode::CONFLICT,
        Json(ErrorResponse {
            error: err.to_string(),
            code: "integrity_violation".to_string(),
            details: None,
        }),
    )
}

fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %err, "configurator API internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
            code: "internal_error".to_string(),
            details: Some(serde_json::json!({ "message": err.to_string() })),
        }),
    )
}
