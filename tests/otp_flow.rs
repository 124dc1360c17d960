//! Integration tests for the standalone one-time-code workflow.

mod common;

use axum::http::StatusCode;
use common::{app, app_with_sender, post_json};
use serde_json::json;
use shop_auth::OtpMode;
use shop_auth::testing::{FailingSender, RecordingSender};

#[tokio::test]
async fn verify_without_prior_record_returns_not_found() {
    let (app, _backend) = app(OtpMode::Strict);

    let (status, body) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "nobody@example.com", "code": "12345678" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No valid OTP found for this email");
}

#[tokio::test]
async fn issued_code_verifies_exactly_once() {
    let (app, backend) = app(OtpMode::Strict);

    let (status, body) = post_json(&app, "/api/auth/send-otp", json!({ "email": "a@b.com" })).await;
    assert_eq!(status, StatusCode::OK);
    // Strict mode never echoes the code back.
    assert!(body.get("dev_code").is_none());

    let code = backend.otp_latest_code("a@b.com").expect("pending record");

    let (status, body) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "a@b.com", "code": code }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["purpose"], "verification");

    // The record is consumed; replaying the same code finds no target.
    let (status, body) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "a@b.com", "code": code }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No valid OTP found for this email");
}

#[tokio::test]
async fn only_the_latest_issued_code_is_a_valid_target() {
    let (app, backend) = app(OtpMode::Strict);

    post_json(&app, "/api/auth/send-otp", json!({ "email": "x@y.com" })).await;
    let first_code = backend.otp_latest_code("x@y.com").expect("first record");

    post_json(&app, "/api/auth/send-otp", json!({ "email": "x@y.com" })).await;
    let second_code = backend.otp_latest_code("x@y.com").expect("second record");
    assert_ne!(
        backend.otp_records("x@y.com").len(),
        1,
        "both records should coexist"
    );

    // The superseded first code no longer matches anything.
    if first_code != second_code {
        let (status, body) = post_json(
            &app,
            "/api/auth/verify-any-otp",
            json!({ "email": "x@y.com", "code": first_code }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid OTP");
    }

    let (status, _) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "x@y.com", "code": second_code }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn strict_mode_rejects_correct_code_after_expiry() {
    let (app, backend) = app(OtpMode::Strict);

    post_json(&app, "/api/auth/send-otp", json!({ "email": "x@y.com" })).await;
    let code = backend.otp_latest_code("x@y.com").expect("pending record");
    backend.otp_expire_latest("x@y.com");

    let (status, body) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "x@y.com", "code": code }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "OTP has expired. Please request a new one.");
}

#[tokio::test]
async fn relaxed_mode_accepts_any_well_formed_code_past_expiry() {
    let (app, backend) = app(OtpMode::Relaxed);

    let (status, body) = post_json(&app, "/api/auth/send-otp", json!({ "email": "a@b.com" })).await;
    assert_eq!(status, StatusCode::OK);
    // Relaxed mode echoes the generated code for diagnostics.
    assert!(body["dev_code"].is_string());

    backend.otp_expire_latest("a@b.com");

    let (status, _) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "a@b.com", "code": "00000000" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn relaxed_mode_still_rejects_malformed_codes() {
    let (app, _backend) = app(OtpMode::Relaxed);

    post_json(&app, "/api/auth/send-otp", json!({ "email": "a@b.com" })).await;

    let (status, body) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "a@b.com", "code": "abcdefgh" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid OTP");
}

#[tokio::test]
async fn wrong_length_code_is_rejected_before_any_lookup() {
    let (app, _backend) = app(OtpMode::Strict);

    let (status, body) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "a@b.com", "code": "1234567" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "OTP must be 8 digits");
}

#[tokio::test]
async fn purpose_tag_round_trips_through_verification() {
    let (app, backend) = app(OtpMode::Strict);

    post_json(
        &app,
        "/api/auth/send-otp",
        json!({ "email": "a@b.com", "purpose": "registration" }),
    )
    .await;
    let code = backend.otp_latest_code("a@b.com").expect("pending record");

    let (status, body) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "a@b.com", "code": code }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["purpose"], "registration");
}

#[tokio::test]
async fn issuance_rejects_malformed_identity_before_persisting() {
    let (app, backend) = app(OtpMode::Strict);

    let (status, _) = post_json(
        &app,
        "/api/auth/send-otp",
        json!({ "email": "not-an-email" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(backend.otp_records("not-an-email").is_empty());
}

#[tokio::test]
async fn issuance_normalizes_identity_case() {
    let (app, backend) = app(OtpMode::Strict);

    post_json(
        &app,
        "/api/auth/send-otp",
        json!({ "email": "Mixed@Example.COM" }),
    )
    .await;
    let code = backend
        .otp_latest_code("mixed@example.com")
        .expect("record stored under normalized identity");

    let (status, _) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "MIXED@example.com", "code": code }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delivery_failure_reports_flag_but_keeps_the_record() {
    let (app, backend) = app_with_sender(OtpMode::Strict, FailingSender);

    let (status, body) = post_json(&app, "/api/auth/send-otp", json!({ "email": "a@b.com" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], false);

    // The record survived the failed send and verifies normally.
    let code = backend.otp_latest_code("a@b.com").expect("record persisted");
    let (status, _) = post_json(
        &app,
        "/api/auth/verify-any-otp",
        json!({ "email": "a@b.com", "code": code }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delivery_sends_the_code_to_the_identity() {
    let sender = RecordingSender::new();
    let (app, backend) = app_with_sender(OtpMode::Strict, sender.clone());

    let (status, body) = post_json(&app, "/api/auth/send-otp", json!({ "email": "a@b.com" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], true);

    let code = backend.otp_latest_code("a@b.com").expect("pending record");
    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@b.com");
    assert_eq!(sent[0].subject, "Verify Your Email");
    assert!(sent[0].body.contains(&code));
}
