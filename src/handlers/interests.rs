//! Handlers for per-user category interests.

use crate::{
    Auth,
    backend::{AuthBackend, AuthUser},
    error::AuthError,
    extractors::CurrentUser,
    notify::NotificationSender,
};
use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

pub const INTERESTS_PATH: &str = "/api/user/interests";

#[derive(OpenApi)]
#[openapi(
    paths(interests_get, interests_replace, interests_update),
    components(schemas(
        InterestsResponse,
        InterestsReplaceRequest,
        InterestUpdateRequest,
        InterestAction,
        InterestsMessageResponse,
        crate::error::AuthErrorResponse
    ))
)]
pub(crate) struct InterestsApi;

/// Returns routes for the interests endpoints.
pub fn interests_routes<B: AuthBackend, N: NotificationSender>() -> Router<Auth<B, N>> {
    Router::new().route(
        INTERESTS_PATH,
        get(interests_get::<B, N>)
            .post(interests_replace::<B, N>)
            .put(interests_update::<B, N>),
    )
}

/// The user's selected category ids.
#[derive(Debug, Serialize, ToSchema)]
pub struct InterestsResponse {
    /// Category ids the user has marked as interests.
    pub interests: Vec<String>,
}

/// Request body replacing the interest list wholesale.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InterestsReplaceRequest {
    /// The complete new interest list.
    pub category_ids: Vec<String>,
}

/// Single-interest mutation.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InterestAction {
    /// Add the category to the user's interests (no-op when present).
    Add,
    /// Remove the category from the user's interests.
    Remove,
}

/// Request body adding or removing one interest.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InterestUpdateRequest {
    /// The category id to add or remove.
    pub category_id: String,
    /// Which mutation to apply.
    pub action: InterestAction,
}

/// Confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct InterestsMessageResponse {
    /// Success message.
    pub message: String,
}

/// Get the current user's interest list.
#[utoipa::path(
    get,
    path = "",
    responses(
        (status = OK, body = InterestsResponse),
        (status = UNAUTHORIZED, body = crate::error::AuthErrorResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::AuthErrorResponse)
    )
)]
pub async fn interests_get<B: AuthBackend, N: NotificationSender>(
    current_user: CurrentUser,
    State(auth): State<Auth<B, N>>,
) -> Result<Json<InterestsResponse>, AuthError> {
    let interests = auth
        .backend()
        .user_get_by_id(current_user.user_id)
        .await
        .map_err(AuthError::from_backend)?
        .map(|user| user.interests().to_vec())
        .unwrap_or_default();

    Ok(Json(InterestsResponse { interests }))
}

/// Replace the current user's interest list wholesale.
#[utoipa::path(
    post,
    path = "",
    request_body = InterestsReplaceRequest,
    responses(
        (status = OK, body = InterestsMessageResponse),
        (status = UNAUTHORIZED, body = crate::error::AuthErrorResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::AuthErrorResponse)
    )
)]
pub async fn interests_replace<B: AuthBackend, N: NotificationSender>(
    current_user: CurrentUser,
    State(auth): State<Auth<B, N>>,
    Json(req): Json<InterestsReplaceRequest>,
) -> Result<Json<InterestsMessageResponse>, AuthError> {
    auth.backend()
        .user_interests_replace(current_user.user_id, &req.category_ids)
        .await
        .map_err(AuthError::from_backend)?;

    Ok(Json(InterestsMessageResponse {
        message: "Interests saved successfully".to_string(),
    }))
}

/// Add or remove a single interest.
#[utoipa::path(
    put,
    path = "",
    request_body = InterestUpdateRequest,
    responses(
        (status = OK, body = InterestsMessageResponse),
        (status = UNAUTHORIZED, body = crate::error::AuthErrorResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::AuthErrorResponse)
    )
)]
pub async fn interests_update<B: AuthBackend, N: NotificationSender>(
    current_user: CurrentUser,
    State(auth): State<Auth<B, N>>,
    Json(req): Json<InterestUpdateRequest>,
) -> Result<Json<InterestsMessageResponse>, AuthError> {
    match req.action {
        InterestAction::Add => auth
            .backend()
            .user_interest_add(current_user.user_id, &req.category_id)
            .await
            .map_err(AuthError::from_backend)?,
        InterestAction::Remove => auth
            .backend()
            .user_interest_remove(current_user.user_id, &req.category_id)
            .await
            .map_err(AuthError::from_backend)?,
    }

    Ok(Json(InterestsMessageResponse {
        message: "Interest updated successfully".to_string(),
    }))
}
