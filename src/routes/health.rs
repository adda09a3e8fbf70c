use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "genai_configured": state.genai.is_configured(),
        "sessions": state.sessions.len().await,
    });
    (StatusCode::OK, Json(body))
}

#[axum::debug_handler]
pub async fn hello() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}
