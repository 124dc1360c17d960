//! Request extractors for authentication.

use crate::{error::AuthError, middleware::UserContext};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

/// Authenticated user extractor.
///
/// Extracts the authenticated user from the [`UserContext`] injected by the
/// base middleware. This extractor will return an error if the user is not
/// authenticated.
///
/// **Requires**: The `shop_auth::middleware::base` middleware must be applied
/// to the route.
///
/// **Does not** fetch the user from the store - this is a stateless session
/// check. If you need the full user record, query the backend in your
/// handler using the user_id.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User ID from session claims.
    pub user_id: Uuid,
    /// User email from session claims.
    pub email: String,
    /// User display name from session claims.
    pub name: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Extract UserContext from request extensions
        let context = parts
            .extensions
            .get::<UserContext>()
            .ok_or(AuthError::InvalidToken)?;

        // Check if user is authenticated
        match (&context.user_id, &context.email, &context.name) {
            (Some(user_id), Some(email), Some(name)) => Ok(CurrentUser {
                user_id: *user_id,
                email: email.clone(),
                name: name.clone(),
            }),
            _ => Err(AuthError::InvalidToken),
        }
    }
}
