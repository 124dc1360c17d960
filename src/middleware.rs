//! Authentication middleware for Axum.

use crate::{
    Auth, backend::AuthBackend, cookies::session_cookie_clear, notify::NotificationSender,
    tokens::session_token_validate,
};
use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

/// Internal user context carried through request extensions.
///
/// Populated by `base` and consumed by crate extractors; not part of the
/// public API.
#[derive(Debug, Clone, Default)]
pub(crate) struct UserContext {
    /// User ID if authenticated, None if anonymous.
    pub user_id: Option<Uuid>,
    /// User email if authenticated, None if anonymous.
    pub email: Option<String>,
    /// User display name if authenticated, None if anonymous.
    pub name: Option<String>,
}

/// Base authentication middleware.
///
/// Validates the session token and injects a [`UserContext`] into request
/// extensions. It should be applied to all routes that may need
/// authentication.
///
/// # Behavior
/// - **Bearer token present**: Validated first, `Authorization: Bearer ...`
///   wins over the cookie
/// - **Session cookie present**: Validated and injects authenticated context
/// - **Token invalid or expired**: Clears the session cookie (stale or
///   tampered) and injects anonymous context
/// - **No token**: Injects anonymous context
pub async fn base<B: AuthBackend, N: NotificationSender>(
    State(auth): State<Auth<B, N>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let mut jar = CookieJar::from_headers(request.headers());
    let mut context = UserContext::default();
    let config = auth.config();

    let bearer_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);
    let cookie_token = jar.get(&config.cookie_name).map(|c| c.value().to_string());
    let from_cookie = bearer_token.is_none();

    if let Some(token) = bearer_token.or(cookie_token) {
        match session_token_validate(&token, config) {
            Ok(claims) => {
                if let Ok(user_id) = Uuid::parse_str(&claims.sub) {
                    context.user_id = Some(user_id);
                    context.email = Some(claims.email);
                    context.name = Some(claims.name);
                }
            }
            Err(_) => {
                // Expired or tampered session cookie - clear it
                if from_cookie {
                    jar = jar.add(session_cookie_clear(config));
                }
            }
        }
    }

    // Inject context into request extensions
    request.extensions_mut().insert(context);

    let response = next.run(request).await;

    // Merge cookie updates with response
    (jar, response).into_response()
}
