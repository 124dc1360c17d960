//! Handlers for issuing and verifying one-time codes.

use crate::{
    Auth,
    backend::{AuthBackend, AuthUser},
    email::email_normalize,
    error::AuthError,
    notify::NotificationSender,
    otp::{OTP_CODE_LENGTH, otp_issue, otp_submission_check, otp_verify},
};
use axum::{Json, Router, extract::State, routing::post};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

pub const OTP_SEND_PATH: &str = "/api/auth/send-otp";
pub const OTP_VERIFY_PATH: &str = "/api/auth/verify-otp";
pub const OTP_VERIFY_ANY_PATH: &str = "/api/auth/verify-any-otp";

#[derive(OpenApi)]
#[openapi(
    paths(otp_send),
    components(schemas(
        OtpSendRequest,
        OtpSendResponse,
        crate::error::AuthErrorResponse
    ))
)]
pub(crate) struct OtpSendApi;

#[derive(OpenApi)]
#[openapi(
    paths(otp_verify_user),
    components(schemas(
        OtpVerifyRequest,
        OtpVerifyResponse,
        crate::error::AuthErrorResponse
    ))
)]
pub(crate) struct OtpVerifyApi;

#[derive(OpenApi)]
#[openapi(
    paths(otp_verify_any),
    components(schemas(
        OtpVerifyRequest,
        OtpVerifyAnyResponse,
        crate::error::AuthErrorResponse
    ))
)]
pub(crate) struct OtpVerifyAnyApi;

/// Returns routes for the one-time-code endpoints.
pub fn otp_routes<B: AuthBackend, N: NotificationSender>() -> Router<Auth<B, N>> {
    Router::new()
        .route(OTP_SEND_PATH, post(otp_send::<B, N>))
        .route(OTP_VERIFY_PATH, post(otp_verify_user::<B, N>))
        .route(OTP_VERIFY_ANY_PATH, post(otp_verify_any::<B, N>))
}

/// Request body for issuing a code.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OtpSendRequest {
    /// Email identity to issue the code for.
    pub email: String,
    /// Workflow tag; defaults to "verification".
    #[serde(default)]
    pub purpose: Option<String>,
}

/// Response for issuing a code.
#[derive(Debug, Serialize, ToSchema)]
pub struct OtpSendResponse {
    /// Success message.
    pub message: String,
    /// Whether the code was accepted for delivery.
    pub delivered: bool,
    /// The generated code, echoed back in relaxed mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

/// Request body for submitting a code.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OtpVerifyRequest {
    /// Email identity the code was issued for.
    pub email: String,
    /// The submitted 8-digit code.
    pub code: String,
}

/// Response for verifying a registration challenge.
#[derive(Debug, Serialize, ToSchema)]
pub struct OtpVerifyResponse {
    /// Success message.
    pub message: String,
}

/// Response for verifying a standalone code.
#[derive(Debug, Serialize, ToSchema)]
pub struct OtpVerifyAnyResponse {
    /// Success message.
    pub message: String,
    /// Normalized identity that was verified.
    pub email: String,
    /// Purpose tag carried by the verified record.
    pub purpose: String,
}

/// Issue a one-time code for an email identity.
///
/// Persists a pending record and best-effort delivers the code. Delivery
/// failure is reported through `delivered`, never as an error.
#[utoipa::path(
    post,
    path = "",
    request_body = OtpSendRequest,
    responses(
        (status = OK, body = OtpSendResponse),
        (status = BAD_REQUEST, body = crate::error::AuthErrorResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::AuthErrorResponse)
    )
)]
pub async fn otp_send<B: AuthBackend, N: NotificationSender>(
    State(auth): State<Auth<B, N>>,
    Json(req): Json<OtpSendRequest>,
) -> Result<Json<OtpSendResponse>, AuthError> {
    let issued = otp_issue(&auth, &req.email, req.purpose, "User").await?;

    let message = if issued.delivered {
        "OTP sent successfully to your email"
    } else {
        "OTP generated successfully (email delivery unavailable)"
    };

    Ok(Json(OtpSendResponse {
        message: message.to_string(),
        delivered: issued.delivered,
        dev_code: issued.dev_code,
    }))
}

/// Verify the embedded registration challenge on a user record.
///
/// On success the user's email is marked verified and the embedded code and
/// expiry are cleared, so the challenge cannot be replayed. The transition
/// is conditional on the user still being unverified at write time.
#[utoipa::path(
    post,
    path = "",
    request_body = OtpVerifyRequest,
    responses(
        (status = OK, body = OtpVerifyResponse),
        (status = BAD_REQUEST, body = crate::error::AuthErrorResponse),
        (status = NOT_FOUND, body = crate::error::AuthErrorResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::AuthErrorResponse)
    )
)]
pub async fn otp_verify_user<B: AuthBackend, N: NotificationSender>(
    State(auth): State<Auth<B, N>>,
    Json(req): Json<OtpVerifyRequest>,
) -> Result<Json<OtpVerifyResponse>, AuthError> {
    if req.code.len() != OTP_CODE_LENGTH {
        return Err(AuthError::OtpMalformed);
    }

    let email = email_normalize(&req.email)?;

    let user = auth
        .backend()
        .user_find_by_email(&email)
        .await
        .map_err(AuthError::from_backend)?
        .ok_or(AuthError::UserNotFound)?;

    if user.email_verified() {
        return Err(AuthError::AlreadyVerified);
    }

    // A verified user has the challenge cleared, so both fields are present
    // exactly while a challenge is outstanding.
    let (stored_code, expires_at) = match (user.otp_code(), user.otp_expires_at()) {
        (Some(code), Some(expires_at)) => (code, expires_at),
        _ => return Err(AuthError::OtpNotFound),
    };

    let now = Utc::now();
    otp_submission_check(stored_code, expires_at, &req.code, auth.config().otp_mode, now)?;

    let applied = auth
        .backend()
        .user_email_verify_apply(user.id(), now)
        .await
        .map_err(AuthError::from_backend)?;

    if !applied {
        // A concurrent attempt completed the transition first.
        return Err(AuthError::AlreadyVerified);
    }

    Ok(Json(OtpVerifyResponse {
        message: "Email verified successfully".to_string(),
    }))
}

/// Verify a standalone code against the newest pending record.
///
/// Returns the purpose tag the record was issued with, so callers can route
/// multiple concurrent workflows over the same identity.
#[utoipa::path(
    post,
    path = "",
    request_body = OtpVerifyRequest,
    responses(
        (status = OK, body = OtpVerifyAnyResponse),
        (status = BAD_REQUEST, body = crate::error::AuthErrorResponse),
        (status = NOT_FOUND, body = crate::error::AuthErrorResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::AuthErrorResponse)
    )
)]
pub async fn otp_verify_any<B: AuthBackend, N: NotificationSender>(
    State(auth): State<Auth<B, N>>,
    Json(req): Json<OtpVerifyRequest>,
) -> Result<Json<OtpVerifyAnyResponse>, AuthError> {
    let verified = otp_verify(&auth, &req.email, &req.code).await?;

    Ok(Json(OtpVerifyAnyResponse {
        message: "OTP verified successfully".to_string(),
        email: verified.email,
        purpose: verified.purpose,
    }))
}
