use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use techdeals_catalog::ListQuery;
use techdeals_core::{CategorySummary, ProductFilters};

use crate::middleware::RequestId;

use super::products::{list_page, parse_price_range, ProductListData};
use super::{normalize_limit, normalize_page, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CategoryProductsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    #[serde(rename = "priceRange")]
    pub price_range: Option<String>,
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<CategorySummary>>> {
    ApiResponse::new(state.catalog.category_summaries(), req_id.0)
}

pub(super) async fn list_category_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
    Query(query): Query<CategoryProductsQuery>,
) -> Result<Json<ApiResponse<ProductListData>>, ApiError> {
    let list_query = ListQuery {
        page: normalize_page(query.page),
        limit: normalize_limit(query.limit),
        filters: ProductFilters {
            category: Some(category),
            search: query.search,
            price_range: parse_price_range(query.price_range.as_deref()),
        },
        max_products: None,
    };

    let data = list_page(&state, &req_id.0, list_query).await?;
    Ok(ApiResponse::new(data, req_id.0))
}
