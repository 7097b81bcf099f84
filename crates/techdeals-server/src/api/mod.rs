mod cart;
mod categories;
mod featured;
mod health;
mod posts;
mod products;
mod sitemap;

use std::sync::Arc;

use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use techdeals_catalog::{Catalog, CatalogError, DEFAULT_PAGE_LIMIT};
use techdeals_core::AppConfig;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimiter, REQUEST_ID_HEADER};

const MAX_PAGE_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub affiliate_tag: Arc<str>,
    /// Public base URL without a trailing slash.
    pub site_url: Arc<str>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, config: &AppConfig) -> Self {
        Self {
            catalog,
            affiliate_tag: Arc::from(config.affiliate_tag.as_str()),
            site_url: Arc::from(config.site_url.as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub fn not_found(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, "not_found", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

pub(super) fn normalize_page(page: Option<usize>) -> usize {
    page.unwrap_or(1).max(1)
}

pub(super) fn map_catalog_error(request_id: &str, error: &CatalogError) -> ApiError {
    tracing::error!(error = %error, "catalog query failed");
    ApiError::new(request_id, "internal_error", "catalog query failed")
}

/// Runs a synchronous catalog operation on the blocking pool.
pub(super) async fn run_catalog<T, F>(
    state: &AppState,
    request_id: &str,
    op: F,
) -> Result<T, ApiError>
where
    F: FnOnce(&Catalog) -> Result<T, CatalogError> + Send + 'static,
    T: Send + 'static,
{
    let catalog = Arc::clone(&state.catalog);
    match tokio::task::spawn_blocking(move || op(&catalog)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(map_catalog_error(request_id, &e)),
        Err(e) => {
            tracing::error!(error = %e, "catalog task failed");
            Err(ApiError::new(
                request_id,
                "internal_error",
                "catalog query failed",
            ))
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, REQUEST_ID_HEADER])
        .expose_headers([REQUEST_ID_HEADER, header::RETRY_AFTER])
}

fn api_router(rate_limit: RateLimiter) -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/{title}", get(products::get_product))
        .route("/api/v1/products/{title}/buy", get(products::buy_product))
        .route("/api/v1/categories", get(categories::list_categories))
        .route(
            "/api/v1/categories/{category}/products",
            get(categories::list_category_products),
        )
        .route("/api/v1/featured", get(featured::list_featured))
        .route("/api/v1/posts", get(posts::list_posts))
        .route("/api/v1/posts/{slug}", get(posts::get_post))
        .route("/api/v1/cart/summary", post(cart::summarize))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimiter) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health::health))
        .route("/sitemap.xml", get(sitemap::sitemap));

    Router::new()
        .merge(public_routes)
        .merge(api_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
