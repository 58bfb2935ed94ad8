//! REST API handlers.
//!
//! Every handler is a pure read against the `HistoryStore` or the target
//! registry.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::error;

use linkwatch_core::TargetId;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn store_failure(e: linkwatch_state::StoreError) -> axum::response::Response {
    error!(error = %e, "history store read failed");
    error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
}

// ── Records ────────────────────────────────────────────────────────

/// GET /api/v1/records
pub async fn list_records(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list() {
        Ok(records) => ApiResponse::ok(records).into_response(),
        Err(e) => store_failure(e),
    }
}

/// GET /api/v1/records/:id
pub async fn get_record(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    // Any integer is a well-formed id; one outside the id range simply
    // names a record that cannot exist.
    let Ok(id) = id.parse::<i64>() else {
        return error_response("invalid record id", StatusCode::BAD_REQUEST).into_response();
    };
    let Ok(id) = TargetId::try_from(id) else {
        return error_response("record not found", StatusCode::NOT_FOUND).into_response();
    };

    match state.store.get(id) {
        Ok(Some(record)) => ApiResponse::ok(record).into_response(),
        Ok(None) => error_response("record not found", StatusCode::NOT_FOUND).into_response(),
        Err(e) => store_failure(e),
    }
}

/// GET /data
///
/// Bare array of records, without the response envelope.
pub async fn legacy_data(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list() {
        Ok(records) => Json(records.into_values().collect::<Vec<_>>()).into_response(),
        Err(e) => {
            error!(error = %e, "history store read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to retrieve ping data" })),
            )
                .into_response()
        }
    }
}

// ── Targets ────────────────────────────────────────────────────────

/// GET /api/v1/targets
pub async fn list_targets(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.registry.as_slice()).into_response()
}

// ── Liveness ───────────────────────────────────────────────────────

/// GET /healthz
pub async fn healthz(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.len() {
        Ok(recorded) => ApiResponse::ok(serde_json::json!({
            "status": "ok",
            "targets": state.registry.len(),
            "recorded": recorded,
        }))
        .into_response(),
        Err(e) => store_failure(e),
    }
}
