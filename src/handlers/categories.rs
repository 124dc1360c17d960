//! Handler for the paginated category listing.

use crate::{
    Auth,
    backend::{AuthBackend, Category},
    error::AuthError,
    notify::NotificationSender,
};
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

pub const CATEGORIES_PATH: &str = "/api/categories";

const PAGE_DEFAULT: u64 = 1;
const LIMIT_DEFAULT: i64 = 6;

#[derive(OpenApi)]
#[openapi(
    paths(categories_get),
    components(schemas(
        CategoriesResponse,
        Category,
        crate::error::AuthErrorResponse
    ))
)]
pub(crate) struct CategoriesApi;

/// Returns routes for the categories endpoint.
pub fn categories_routes<B: AuthBackend, N: NotificationSender>() -> Router<Auth<B, N>> {
    Router::new().route(CATEGORIES_PATH, get(categories_get::<B, N>))
}

/// Pagination query parameters.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CategoriesQuery {
    /// 1-based page number (default: 1).
    pub page: Option<u64>,
    /// Page size (default: 6).
    pub limit: Option<i64>,
}

/// One page of categories.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesResponse {
    /// Categories on this page.
    pub categories: Vec<Category>,
    /// The page that was returned.
    pub current_page: u64,
    /// Total number of pages at this page size.
    pub total_pages: u64,
    /// Total number of categories.
    pub total_count: u64,
}

/// List categories, paginated. Public endpoint.
#[utoipa::path(
    get,
    path = "",
    params(CategoriesQuery),
    responses(
        (status = OK, body = CategoriesResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::AuthErrorResponse)
    )
)]
pub async fn categories_get<B: AuthBackend, N: NotificationSender>(
    State(auth): State<Auth<B, N>>,
    Query(query): Query<CategoriesQuery>,
) -> Result<Json<CategoriesResponse>, AuthError> {
    let page = query.page.unwrap_or(PAGE_DEFAULT).max(1);
    let limit = query.limit.unwrap_or(LIMIT_DEFAULT).max(1);
    let skip = (page - 1) * limit as u64;

    let (categories, total_count) = auth
        .backend()
        .categories_page(skip, limit)
        .await
        .map_err(AuthError::from_backend)?;

    let total_pages = total_count.div_ceil(limit as u64);

    Ok(Json(CategoriesResponse {
        categories,
        current_page: page,
        total_pages,
        total_count,
    }))
}
