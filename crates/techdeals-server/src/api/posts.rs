use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use techdeals_catalog::DEFAULT_POSTS_PER_PAGE;
use techdeals_core::Post;

use crate::middleware::RequestId;

use super::{normalize_page, run_catalog, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct PostQuery {
    pub page: Option<usize>,
}

/// A post plus the values its page header needs.
#[derive(Debug, Serialize)]
pub(super) struct PostDetail {
    #[serde(flatten)]
    post: Post,
    featured_image: Option<String>,
    primary_category: String,
}

impl From<Post> for PostDetail {
    fn from(post: Post) -> Self {
        Self {
            featured_image: post.featured_image().map(ToOwned::to_owned),
            primary_category: post.primary_category().to_string(),
            post,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PostListData {
    posts: Vec<Post>,
    total: usize,
    page: usize,
    total_pages: usize,
}

pub(super) async fn list_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PostQuery>,
) -> Result<Json<ApiResponse<PostListData>>, ApiError> {
    let page = normalize_page(query.page);
    let posts = run_catalog(&state, &req_id.0, move |catalog| {
        catalog.posts(page, DEFAULT_POSTS_PER_PAGE)
    })
    .await?;

    let data = PostListData {
        total_pages: posts.total_pages(),
        total: posts.total,
        page: posts.page,
        posts: posts.items,
    };
    Ok(ApiResponse::new(data, req_id.0))
}

pub(super) async fn get_post(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<PostDetail>>, ApiError> {
    let post = run_catalog(&state, &req_id.0, move |catalog| catalog.post_by_slug(&slug))
        .await?
        .ok_or_else(|| ApiError::not_found(req_id.0.clone(), "post not found"))?;
    Ok(ApiResponse::new(PostDetail::from(post), req_id.0))
}
