use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::interview_dto::{
    answer_text, CandidatesResponse, StartInterviewRequest, SubmitAnswerRequest,
};
use crate::error::{Error, Result};
use crate::AppState;

#[axum::debug_handler]
pub async fn start_interview(
    State(state): State<AppState>,
    body: Option<Json<StartInterviewRequest>>,
) -> Result<impl IntoResponse> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    req.validate()?;

    let resp = state
        .interview_service
        .start_interview(req.candidate.map(Into::into))
        .await
        .map_err(|e| {
            tracing::error!("start-interview error: {}", e);
            e
        })?;
    Ok(Json(resp))
}

#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    body: Option<Json<SubmitAnswerRequest>>,
) -> Result<impl IntoResponse> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let required =
        || Error::BadRequest("sessionId, questionIndex and answer are required".to_string());

    let session_id = req
        .session_id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(required)?;
    let question_index = req
        .question_index
        .as_ref()
        .and_then(|v| v.as_i64())
        .ok_or_else(required)?;
    let answer = req.answer.as_ref().map(answer_text).ok_or_else(required)?;

    // An id that is not a UUID cannot name a stored session.
    let session_id = Uuid::parse_str(session_id.trim())
        .map_err(|_| Error::NotFound("session not found".to_string()))?;

    let resp = state
        .interview_service
        .submit_answer(session_id, question_index, answer)
        .await
        .map_err(|e| {
            tracing::error!(%session_id, "submit-answer error: {}", e);
            e
        })?;
    Ok(Json(resp))
}

#[axum::debug_handler]
pub async fn list_candidates(State(state): State<AppState>) -> impl IntoResponse {
    let candidates = state.interview_service.list_candidates().await;
    Json(CandidatesResponse {
        ok: true,
        candidates,
    })
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let status = state.interview_service.session_status(session_id).await?;
    Ok(Json(status))
}
