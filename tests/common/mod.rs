#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Path, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use interview_backend::config::Config;
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;
use tower::ServiceExt;

#[derive(Clone)]
struct MockState {
    hits: Arc<AtomicUsize>,
    fail_first: usize,
    fail_status: u16,
    grade_delay: Duration,
}

pub struct MockGemini {
    pub base_url: String,
    pub hits: Arc<AtomicUsize>,
}

impl MockGemini {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a local server speaking enough of the Gemini REST API for the
/// backend. The first `fail_first` calls answer with `fail_status`.
pub async fn spawn_mock_gemini(fail_first: usize, fail_status: u16) -> MockGemini {
    start_mock(fail_first, fail_status, Duration::ZERO).await
}

/// Same as `spawn_mock_gemini` but every grading call takes `delay`.
pub async fn spawn_slow_grader(delay: Duration) -> MockGemini {
    start_mock(0, 503, delay).await
}

async fn start_mock(fail_first: usize, fail_status: u16, grade_delay: Duration) -> MockGemini {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = MockState {
        hits: hits.clone(),
        fail_first,
        fail_status,
        grade_delay,
    };
    let app = Router::new()
        .route("/v1beta/models/:call", post(handle))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });

    MockGemini {
        base_url: format!("http://{}", addr),
        hits,
    }
}

fn candidate(text: &str) -> JsonValue {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

async fn handle(
    State(state): State<MockState>,
    Path(call): Path<String>,
    Json(body): Json<JsonValue>,
) -> Response {
    let n = state.hits.fetch_add(1, Ordering::SeqCst);
    if n < state.fail_first {
        let status = StatusCode::from_u16(state.fail_status).expect("status");
        return (status, Json(json!({ "error": { "message": "try again later" } }))).into_response();
    }

    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    if call.ends_with(":streamGenerateContent") {
        let events = format!(
            "data: {}\r\n\r\ndata: {}\r\n\r\n",
            candidate("Hel"),
            candidate("lo")
        );
        return ([(header::CONTENT_TYPE, "text/event-stream")], events).into_response();
    }

    let text = if prompt.contains("interview question generator") {
        let difficulty = prompt
            .split("difficulty level: ")
            .nth(1)
            .and_then(|rest| rest.split('.').next())
            .unwrap_or("medium");
        json!({
            "difficulty": difficulty,
            "question": format!("Explain a {} concept #{}", difficulty, n),
            "expected": "A secret guideline"
        })
        .to_string()
    } else if prompt.contains("interview grader") {
        tokio::time::sleep(state.grade_delay).await;
        format!(
            "Here is the grade:\n```json\n{}\n```",
            json!({
                "score": 7,
                "strengths": ["clear"],
                "weaknesses": ["brief"],
                "explanation": "Reasonable answer."
            })
        )
    } else {
        format!("echo: {}", prompt)
    };

    Json(candidate(&text)).into_response()
}

pub fn test_config(base_url: &str) -> Config {
    Config {
        genai_api_key: Some("test-key".to_string()),
        genai_base_url: base_url.to_string(),
        genai_base_delay_ms: 1,
        public_rps: 1000,
        ..Config::default()
    }
}

pub fn app(config: &Config) -> Router {
    let state = interview_backend::AppState::new(config).expect("app state");
    interview_backend::routes::router(state, config)
}

pub async fn post_json(app: &Router, uri: &str, body: JsonValue) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, body)
}
