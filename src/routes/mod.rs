pub mod genai;
pub mod health;
pub mod interviews;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::{cors::permissive_cors, rate_limit};
use crate::AppState;

pub fn router(state: AppState, config: &Config) -> Router {
    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api/hello", get(health::hello));

    let public_api = Router::new()
        .route("/api/upload", post(upload::upload_resume))
        .route("/api/genai/generate", post(genai::generate))
        .route("/api/genai/stream", post(genai::stream))
        .route("/api/genai/question", post(genai::question))
        .route("/api/genai/grade", post(genai::grade))
        .route(
            "/api/interviews/start-interview",
            post(interviews::start_interview),
        )
        .route(
            "/api/interviews/submit-answer",
            post(interviews::submit_answer),
        )
        .route(
            "/api/interviews/candidates",
            get(interviews::list_candidates),
        )
        .route("/api/interviews/:id", get(interviews::get_session))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(config.public_rps),
            rate_limit::rps_middleware,
        ));

    base_routes
        .merge(public_api)
        .with_state(state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
}
