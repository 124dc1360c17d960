//! Handler for session logout.

use crate::{
    Auth, backend::AuthBackend, cookies::session_cookie_clear, notify::NotificationSender,
};
use axum::{Json, Router, extract::State, routing::post};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

pub const LOGOUT_PATH: &str = "/api/auth/logout";

#[derive(OpenApi)]
#[openapi(paths(logout), components(schemas(LogoutResponse)))]
pub(crate) struct LogoutApi;

/// Returns routes for the logout endpoint.
pub fn logout_routes<B: AuthBackend, N: NotificationSender>() -> Router<Auth<B, N>> {
    Router::new().route(LOGOUT_PATH, post(logout::<B, N>))
}

/// Response for logout.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    /// Logout success status.
    pub success: bool,
    /// Message instructing client to clear state.
    pub message: String,
}

/// Log out by clearing the session cookie.
///
/// Sessions are stateless JWTs, so there is nothing to revoke server-side;
/// a copied token stays valid until it expires.
#[utoipa::path(
    post,
    path = "",
    responses((status = OK, body = LogoutResponse))
)]
pub async fn logout<B: AuthBackend, N: NotificationSender>(
    State(auth): State<Auth<B, N>>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar.add(session_cookie_clear(auth.config()));

    let response_body = LogoutResponse {
        success: true,
        message: "Signed out successfully. Session cookie has been cleared.".to_string(),
    };

    (jar, Json(response_body))
}
