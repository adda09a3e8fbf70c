use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Browser client is served from a different origin during development.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any)
}
