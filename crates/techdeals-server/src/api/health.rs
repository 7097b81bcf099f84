use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct HealthData {
    status: &'static str,
    data_dir: &'static str,
}

pub(super) async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let catalog = Arc::clone(&state.catalog);
    let probe = tokio::task::spawn_blocking(move || catalog.data_dir().probe()).await;

    match probe {
        Ok(Ok(())) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    data_dir: "ok",
                },
                meta,
            }),
        ),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "health check: data directory unavailable");
            degraded(meta)
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check: probe task failed");
            degraded(meta)
        }
    }
}

fn degraded(meta: ResponseMeta) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiResponse {
            data: HealthData {
                status: "degraded",
                data_dir: "unavailable",
            },
            meta,
        }),
    )
}
