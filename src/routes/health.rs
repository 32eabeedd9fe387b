use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

/// 503 until the first refresh has landed.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let snapshot = state.board.borrow().clone();
    match snapshot.fetched_at {
        Some(at) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "last_refresh": at })),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting", "last_refresh": null })),
        ),
    }
}
