use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest client-supplied request id that is echoed back.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Correlation id for one request, available to handlers as an extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Uses the caller's `x-request-id` when it is short and made of
    /// `[A-Za-z0-9._-]`; otherwise mints a `UUIDv4`.
    fn from_headers(headers: &HeaderMap) -> Self {
        let supplied = headers
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| is_acceptable_request_id(id));
        Self(supplied.map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned))
    }
}

fn is_acceptable_request_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Tags the request with a [`RequestId`] and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = RequestId::from_headers(req.headers());
    let echoed = HeaderValue::from_str(&id.0).ok();
    req.extensions_mut().insert(id);

    let mut response = next.run(req).await;
    if let Some(value) = echoed {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[derive(Debug)]
struct Window {
    opened: Instant,
    used: usize,
}

/// Fixed-window request budget shared by every rate-limited route.
///
/// The window opens on construction and reopens on the first request after
/// it has elapsed; there is no per-client accounting.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    budget: usize,
    window: Duration,
    current: Arc<Mutex<Window>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(budget: usize, window: Duration) -> Self {
        Self {
            budget,
            window,
            current: Arc::new(Mutex::new(Window {
                opened: Instant::now(),
                used: 0,
            })),
        }
    }

    #[must_use]
    pub fn per_minute(budget: usize) -> Self {
        Self::new(budget, Duration::from_secs(60))
    }

    /// Spends one request from the window containing `now`.
    ///
    /// # Errors
    ///
    /// Returns the time left until the window reopens when the budget is spent.
    pub async fn try_acquire(&self, now: Instant) -> Result<(), Duration> {
        let mut current = self.current.lock().await;
        let elapsed = now.saturating_duration_since(current.opened);
        if elapsed >= self.window {
            *current = Window {
                opened: now,
                used: 0,
            };
        } else if current.used >= self.budget {
            return Err(self.window - elapsed);
        }
        current.used += 1;
        Ok(())
    }
}

/// Rejects requests over the [`RateLimiter`] budget with `429 rate_limited`
/// and a `Retry-After` header in whole seconds.
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let Err(retry_after) = limiter.try_acquire(Instant::now()).await else {
        return next.run(req).await;
    };

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let retry_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    tracing::warn!(
        request_id = %request_id,
        path = %req.uri().path(),
        retry_secs,
        "rate limit exceeded"
    );

    let mut response =
        ApiError::new(request_id, "rate_limited", "rate limit exceeded").into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_secs));
    response
}
