use axum::{extract::State, Extension, Json};

use crate::middleware::RequestId;

use super::products::ProductCard;
use super::{run_catalog, ApiError, ApiResponse, AppState};

pub(super) async fn list_featured(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductCard>>>, ApiError> {
    let featured = run_catalog(&state, &req_id.0, |catalog| catalog.featured()).await?;
    let data = featured.into_iter().map(ProductCard::from).collect();
    Ok(ApiResponse::new(data, req_id.0))
}
