use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const WINDOW: Duration = Duration::from_secs(1);

/// Requests-per-second budget shared by every route behind the layer.
/// Windows are numbered from the limiter's creation; a request in a newer
/// window resets the counter.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    limit: u32,
    origin: Instant,
    // (window number, requests seen in it)
    usage: Arc<Mutex<(u64, u32)>>,
}

impl RateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            origin: Instant::now(),
            usage: Arc::new(Mutex::new((0, 0))),
        }
    }

    fn window_of(&self, at: Instant) -> u64 {
        (at.saturating_duration_since(self.origin).as_millis() / WINDOW.as_millis()) as u64
    }

    fn try_acquire_at(&self, at: Instant) -> bool {
        let window = self.window_of(at);
        let mut usage = self.usage.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if window > usage.0 {
            *usage = (window, 0);
        }
        if usage.1 >= self.limit {
            return false;
        }
        usage.1 += 1;
        true
    }

    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if limiter.try_acquire() {
        return next.run(req).await;
    }
    tracing::warn!(method = %req.method(), path = %req.uri().path(), "Rate limit exceeded");
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, "1")],
        "rate_limit_exceeded",
    )
        .into_response()
}
