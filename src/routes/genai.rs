use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{self, Stream};
use serde_json::json;
use tokio::sync::mpsc;
use validator::Validate;

use crate::dto::genai_dto::{
    GeneratePayload, GenerateResult, GradePayload, GradeResult, QuestionPayload, QuestionResult,
};
use crate::dto::interview_dto::answer_text;
use crate::error::{Error, Result};
use crate::models::question::Difficulty;
use crate::services::genai_client::GenerateRequest;
use crate::AppState;

fn to_request(state: &AppState, payload: GeneratePayload) -> GenerateRequest {
    GenerateRequest {
        model: payload
            .model
            .unwrap_or_else(|| state.genai.default_model().to_string()),
        contents: payload.contents,
        config: payload.config,
    }
}

fn failure(error: &str, err: &Error) -> Response {
    if let Error::NotConfigured(msg) = err {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": msg }))).into_response();
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": error, "details": err.to_string() })),
    )
        .into_response()
}

#[axum::debug_handler]
pub async fn generate(
    State(state): State<AppState>,
    body: Option<Json<GeneratePayload>>,
) -> Result<Response> {
    let payload = body.map(|Json(p)| p).unwrap_or_default();
    payload.validate()?;
    let req = to_request(&state, payload);

    match state.genai.generate_with_retry(&req).await {
        Ok(res) => Ok(Json(GenerateResult {
            ok: true,
            text: res.text,
            raw: res.raw,
        })
        .into_response()),
        Err(e) => {
            tracing::error!("GenAI generate error: {}", e);
            Ok(failure("Generation failed", &e))
        }
    }
}

enum StreamPhase {
    Streaming(mpsc::Receiver<Result<String>>),
    Closing,
    Finished,
}

fn sse_events(
    rx: mpsc::Receiver<Result<String>>,
) -> impl Stream<Item = std::result::Result<Event, Infallible>> {
    stream::unfold(StreamPhase::Streaming(rx), |phase| async move {
        let done = || Event::default().event("done").data("{}");
        match phase {
            StreamPhase::Streaming(mut rx) => match rx.recv().await {
                Some(Ok(text)) => Some((
                    Ok(Event::default().data(json!({ "text": text }).to_string())),
                    StreamPhase::Streaming(rx),
                )),
                Some(Err(e)) => {
                    tracing::error!("Stream iteration error: {}", e);
                    Some((
                        Ok(Event::default()
                            .event("error")
                            .data(json!({ "error": e.to_string() }).to_string())),
                        StreamPhase::Closing,
                    ))
                }
                None => Some((Ok(done()), StreamPhase::Finished)),
            },
            StreamPhase::Closing => Some((Ok(done()), StreamPhase::Finished)),
            StreamPhase::Finished => None,
        }
    })
}

#[axum::debug_handler]
pub async fn stream(
    State(state): State<AppState>,
    body: Option<Json<GeneratePayload>>,
) -> Result<Response> {
    let payload = body.map(|Json(p)| p).unwrap_or_default();
    payload.validate()?;
    let req = to_request(&state, payload);

    match state.genai.stream(&req).await {
        Ok(rx) => Ok(Sse::new(sse_events(rx))
            .keep_alive(KeepAlive::default())
            .into_response()),
        Err(e) => {
            tracing::error!("GenAI stream error: {}", e);
            Ok(failure("Streaming failed", &e))
        }
    }
}

#[axum::debug_handler]
pub async fn question(
    State(state): State<AppState>,
    body: Option<Json<QuestionPayload>>,
) -> Result<impl IntoResponse> {
    let payload = body.map(|Json(p)| p).unwrap_or_default();
    let difficulty = match payload.difficulty.as_deref() {
        None => Difficulty::default(),
        Some(raw) => Difficulty::parse(raw)
            .ok_or_else(|| Error::BadRequest(format!("invalid difficulty: {}", raw)))?,
    };

    let question = state
        .question_service
        .generate_question(difficulty)
        .await
        .map_err(|e| {
            tracing::error!("Question generation error: {}", e);
            e
        })?;
    Ok(Json(QuestionResult { ok: true, question }))
}

#[axum::debug_handler]
pub async fn grade(
    State(state): State<AppState>,
    body: Option<Json<GradePayload>>,
) -> Result<impl IntoResponse> {
    let payload = body.map(|Json(p)| p).unwrap_or_default();
    let (Some(question), Some(answer)) = (
        payload.question.filter(|q| !q.trim().is_empty()),
        payload.answer,
    ) else {
        return Err(Error::BadRequest(
            "question and answer are required".to_string(),
        ));
    };

    let grade = state
        .question_service
        .grade_answer(&question, &answer_text(&answer))
        .await
        .map_err(|e| {
            tracing::error!("Grade error: {}", e);
            e
        })?;
    Ok(Json(GradeResult { ok: true, grade }))
}
