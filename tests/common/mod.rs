//! Shared harness for the integration suites: an in-process app over the
//! memory backend, driven through `tower::ServiceExt::oneshot`.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
    middleware,
};
use http_body_util::BodyExt;
use serde_json::Value;
use shop_auth::{Auth, AuthConfig, NotificationSender, OtpMode, testing::MemoryBackend};
use tower::util::ServiceExt;

pub fn test_config(mode: OtpMode) -> AuthConfig {
    AuthConfig {
        jwt_secret: "test_secret_key_at_least_32_chars_long_for_security".to_string(),
        otp_mode: mode,
        ..Default::default()
    }
}

/// Build the full app with a custom notification sender.
pub fn app_with_sender<N: NotificationSender>(mode: OtpMode, sender: N) -> (Router, MemoryBackend) {
    let backend = MemoryBackend::new();
    backend.seed_categories();

    let auth = Auth::new(test_config(mode), backend.clone())
        .expect("valid test config")
        .with_sender(sender);

    let router = auth
        .routes::<Auth<MemoryBackend, N>>()
        .layer(middleware::from_fn_with_state(
            auth.clone(),
            shop_auth::middleware::base::<MemoryBackend, N>,
        ))
        .with_state(auth);

    (router, backend)
}

/// Build the full app with the no-op sender.
pub fn app(mode: OtpMode) -> (Router, MemoryBackend) {
    app_with_sender(mode, ())
}

/// Fire one request and decode the JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = builder
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .expect("request builds");

    let response = app.clone().oneshot(request).await.expect("app responds");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };

    (status, headers, json)
}

pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let (status, _, json) = send(app, "POST", path, Some(body), None).await;
    (status, json)
}

/// Extract the non-empty session cookie pair from Set-Cookie headers.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers.get_all(header::SET_COOKIE).iter().find_map(|v| {
        let raw = v.to_str().ok()?;
        let pair = raw.split(';').next()?;
        let (name, value) = pair.split_once('=')?;
        (name == "token" && !value.is_empty()).then(|| format!("{name}={value}"))
    })
}
