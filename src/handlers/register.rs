//! Handler for account registration.

use crate::{
    Auth,
    backend::{AuthBackend, AuthUser, NewUser},
    email::email_normalize,
    error::AuthError,
    notify::{NotificationSender, otp_email_send},
    otp::{OtpMode, otp_code_generate, otp_expiry_calculate},
    password::{password_hash, password_validate},
};
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

pub const REGISTER_PATH: &str = "/api/auth/register";

#[derive(OpenApi)]
#[openapi(
    paths(register),
    components(schemas(
        RegisterRequest,
        RegisterResponse,
        crate::error::AuthErrorResponse
    ))
)]
pub(crate) struct RegisterApi;

/// Returns routes for the registration endpoint.
pub fn register_routes<B: AuthBackend, N: NotificationSender>() -> Router<Auth<B, N>> {
    Router::new().route(REGISTER_PATH, post(register::<B, N>))
}

/// Request body for registration.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password (plaintext, will be hashed).
    pub password: String,
}

/// Response for registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// Success message.
    pub message: String,
    /// Id of the newly created user.
    pub user_id: String,
    /// Whether the verification code was accepted for delivery.
    pub delivered: bool,
    /// The verification code, echoed back in relaxed mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

/// Register a new account.
///
/// Creates an unverified user carrying an embedded verification challenge,
/// then best-effort emails the code. A failed send is reported through
/// `delivered`, never as an error; the account exists either way.
#[utoipa::path(
    post,
    path = "",
    request_body = RegisterRequest,
    responses(
        (status = CREATED, body = RegisterResponse),
        (status = BAD_REQUEST, body = crate::error::AuthErrorResponse),
        (status = CONFLICT, body = crate::error::AuthErrorResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::AuthErrorResponse)
    )
)]
pub async fn register<B: AuthBackend, N: NotificationSender>(
    State(auth): State<Auth<B, N>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AuthError::MissingField("name"));
    }

    let email = email_normalize(&req.email)?;
    password_validate(&req.password, auth.config())?;

    // Check if user exists
    let existing = auth
        .backend()
        .user_find_by_email(&email)
        .await
        .map_err(AuthError::from_backend)?;

    if existing.is_some() {
        return Err(AuthError::UserAlreadyExists);
    }

    let hashed = password_hash(&req.password)?;
    let code = otp_code_generate();
    let otp_expires_at = otp_expiry_calculate(auth.config().otp_expiry)?;

    // Create user (not verified yet)
    let user = auth
        .backend()
        .user_insert(NewUser {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.clone(),
            password_hash: hashed,
            otp_code: code.clone(),
            otp_expires_at,
        })
        .await
        .map_err(AuthError::from_backend)?;

    let delivered = otp_email_send(&auth, &email, user.name(), &code).await;

    let message = if delivered {
        "User created successfully. Please check your email for the verification code."
    } else {
        "User created successfully. Please verify your email with the OTP."
    };

    let dev_code = matches!(auth.config().otp_mode, OtpMode::Relaxed).then_some(code);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: message.to_string(),
            user_id: user.id().to_string(),
            delivered,
            dev_code,
        }),
    ))
}
