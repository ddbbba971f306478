use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info};

use crate::alerts::{build_alert_message, NotifyError};

use super::types::{ErrorResponse, NotifyResponse};
use super::ApiState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// The trigger payload is opaque and ignored; the warehouse alert view is
/// the source of truth for what gets reported.
pub async fn send_notification(
    State(state): State<Arc<ApiState>>,
    _payload: Option<Json<serde_json::Value>>,
) -> ApiResult<NotifyResponse> {
    let alerts = match state.fetcher.fetch_alerts().await {
        Ok(alerts) => alerts,
        Err(err @ NotifyError::Warehouse(_)) => {
            // An unreachable warehouse yields an empty report, not a failure.
            error!(error = %err, "alert view query failed");
            Vec::new()
        }
        Err(err) => return Err(internal_error(err)),
    };

    let message = build_alert_message(&alerts);
    info!(alert_count = alerts.len(), "{}", message);

    Ok(Json(NotifyResponse {
        alert_count: alerts.len(),
    }))
}

pub async fn health_check() -> ApiResult<serde_json::Value> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "alert-notifier"
    })))
}

fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %err, "notifier API internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
            code: "internal_error".to_string(),
            details: Some(serde_json::json!({ "message": err.to_string() })),
        }),
    )
}
