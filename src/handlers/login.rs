//! Handler for session login.

use crate::{
    Auth,
    backend::{AuthBackend, AuthUser},
    cookies::session_cookie_create,
    email::email_normalize,
    error::AuthError,
    notify::NotificationSender,
    password::password_verify,
    tokens::session_token_generate,
};
use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

pub const LOGIN_PATH: &str = "/api/auth/login";

#[derive(OpenApi)]
#[openapi(
    paths(login),
    components(schemas(LoginRequest, LoginResponse, crate::error::AuthErrorResponse))
)]
pub(crate) struct LoginApi;

/// Returns routes for the login endpoint.
pub fn login_routes<B: AuthBackend, N: NotificationSender>() -> Router<Auth<B, N>> {
    Router::new().route(LOGIN_PATH, post(login::<B, N>))
}

/// Request body for login.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// User email address.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Response for login.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Success message.
    pub message: String,
}

/// Log in an existing user.
///
/// Authenticates with email and password and sets the session token as an
/// httpOnly cookie. An unverified email does not block login.
#[utoipa::path(
    post,
    path = "",
    request_body = LoginRequest,
    responses(
        (status = OK, body = LoginResponse),
        (status = UNAUTHORIZED, body = crate::error::AuthErrorResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::AuthErrorResponse)
    )
)]
pub async fn login<B: AuthBackend, N: NotificationSender>(
    State(auth): State<Auth<B, N>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let config = auth.config();

    // Normalize email for consistent lookup
    let email = email_normalize(&req.email).map_err(|_| AuthError::InvalidCredentials)?;

    // Find user by normalized email
    let user = auth
        .backend()
        .user_find_by_email(&email)
        .await
        .map_err(AuthError::from_backend)?
        .ok_or(AuthError::InvalidCredentials)?;

    // Verify password (constant-time comparison)
    let password_valid = password_verify(&req.password, user.password_hash())?;

    if !password_valid {
        return Err(AuthError::InvalidCredentials);
    }

    let token = session_token_generate(
        user.id(),
        user.email().to_owned(),
        user.name().to_owned(),
        config,
    )?;

    let jar = CookieJar::new().add(session_cookie_create(token, config));

    let response_body = LoginResponse {
        message: "Login successful".to_string(),
    };

    Ok((jar, Json(response_body)).into_response())
}
