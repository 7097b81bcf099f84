use axum::{Extension, Json};
use serde::Deserialize;
use techdeals_core::{summarize_cart, CartLine, CartSummary};

use crate::middleware::RequestId;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub(super) struct CartRequest {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

/// Totals a client-held cart. Nothing is stored server-side.
pub(super) async fn summarize(
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CartRequest>,
) -> Json<ApiResponse<CartSummary>> {
    ApiResponse::new(summarize_cart(&body.items), req_id.0)
}
