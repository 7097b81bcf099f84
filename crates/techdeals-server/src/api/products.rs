use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use techdeals_catalog::{encode_title, ListQuery, Page};
use techdeals_core::{affiliate_link, to_cents, PriceRange, Product, ProductFilters};

use crate::middleware::RequestId;

use super::{normalize_limit, normalize_page, run_catalog, ApiError, ApiResponse, AppState};

/// A product plus the URL-safe identifier clients link to.
#[derive(Debug, Serialize)]
pub(super) struct ProductCard {
    id: String,
    #[serde(flatten)]
    product: Product,
}

impl From<Product> for ProductCard {
    fn from(product: Product) -> Self {
        Self {
            id: encode_title(product.title.as_deref().unwrap_or_default()),
            product,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ProductListData {
    products: Vec<ProductCard>,
    total: usize,
    page: usize,
    limit: usize,
    total_pages: usize,
}

impl From<Page<Product>> for ProductListData {
    fn from(page: Page<Product>) -> Self {
        let total_pages = page.total_pages();
        Self {
            products: page.items.into_iter().map(ProductCard::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ProductDetail {
    id: String,
    #[serde(flatten)]
    product: Product,
    affiliate_url: String,
    savings: Option<Decimal>,
    /// Current price in minor units, for clients that do arithmetic.
    price_cents: Option<i64>,
    primary_category: String,
    key_features: Vec<String>,
    description: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "priceRange")]
    pub price_range: Option<String>,
}

/// Unknown price-range values are ignored rather than rejected.
pub(super) fn parse_price_range(raw: Option<&str>) -> Option<PriceRange> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(range) => Some(range),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring price range filter");
            None
        }
    }
}

pub(super) async fn list_page(
    state: &AppState,
    request_id: &str,
    query: ListQuery,
) -> Result<ProductListData, ApiError> {
    let page = run_catalog(state, request_id, move |catalog| catalog.list(&query)).await?;
    Ok(ProductListData::from(page))
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<ProductListData>>, ApiError> {
    let list_query = ListQuery {
        page: normalize_page(query.page),
        limit: normalize_limit(query.limit),
        filters: ProductFilters {
            category: query.category,
            search: query.search,
            price_range: parse_price_range(query.price_range.as_deref()),
        },
        max_products: None,
    };

    let data = list_page(&state, &req_id.0, list_query).await?;
    Ok(ApiResponse::new(data, req_id.0))
}

async fn lookup(state: &AppState, request_id: &str, title: String) -> Result<Product, ApiError> {
    let found = run_catalog(state, request_id, move |catalog| {
        catalog.find_by_title(&title)
    })
    .await?;
    found.ok_or_else(|| ApiError::not_found(request_id, "product not found"))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(title): Path<String>,
) -> Result<Json<ApiResponse<ProductDetail>>, ApiError> {
    let product = lookup(&state, &req_id.0, title).await?;

    let data = ProductDetail {
        id: encode_title(product.title.as_deref().unwrap_or_default()),
        affiliate_url: affiliate_link(&product.product_url, &state.affiliate_tag),
        savings: product.savings(),
        price_cents: product.new_price_amount().and_then(to_cents),
        primary_category: product.primary_category().to_string(),
        key_features: product.key_features(),
        description: product.clean_description(),
        product,
    };
    Ok(ApiResponse::new(data, req_id.0))
}

/// Redirects to the tagged affiliate link and records the click.
pub(super) async fn buy_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(title): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = lookup(&state, &req_id.0, title).await?;
    let target = affiliate_link(&product.product_url, &state.affiliate_tag);

    tracing::info!(
        request_id = %req_id.0,
        title = product.trimmed_title().unwrap_or_default(),
        price = %product.new_price,
        target = %target,
        "affiliate_click"
    );

    Ok(Redirect::temporary(&target))
}
