//! Handler for getting current session information.

use crate::extractors::CurrentUser;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

pub const ME_PATH: &str = "/api/auth/me";

#[derive(OpenApi)]
#[openapi(
    paths(me_get),
    components(schemas(MeResponse, crate::error::AuthErrorResponse))
)]
pub(crate) struct MeApi;

/// Returns routes for the me endpoint.
pub fn me_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(ME_PATH, get(me_get))
}

/// Current session data.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// User ID from session claims.
    pub user_id: String,
    /// User email from session claims.
    pub email: String,
    /// User display name from session claims.
    pub name: String,
}

/// Get the current authenticated session.
///
/// Answers straight from the session claims without a store lookup.
///
/// # Requires
/// - Valid session token (httpOnly cookie or `Authorization: Bearer`)
/// - `middleware::base` applied to the route
#[utoipa::path(
    get,
    path = "",
    responses(
        (status = OK, body = MeResponse),
        (status = UNAUTHORIZED, body = crate::error::AuthErrorResponse)
    )
)]
pub async fn me_get(current_user: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: current_user.user_id.to_string(),
        email: current_user.email,
        name: current_user.name,
    })
}
