//! Backend trait abstraction for storage-agnostic auth and verification.
//!
//! This module defines the traits and record types that let the crate work
//! with any document-oriented storage backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use utoipa::ToSchema;
use uuid::Uuid;

/// Minimal user interface required by the auth and verification flows.
///
/// Implement this trait for your user type to use with [`AuthBackend`].
/// This decouples the crate from any specific user schema.
pub trait AuthUser: Send + Sync + Clone {
    /// Returns the user's unique identifier.
    fn id(&self) -> Uuid;

    /// Returns the user's display name.
    fn name(&self) -> &str;

    /// Returns the user's email address.
    fn email(&self) -> &str;

    /// Returns the user's hashed password.
    fn password_hash(&self) -> &str;

    /// Whether the user's email address has been verified.
    fn email_verified(&self) -> bool;

    /// The embedded verification code awaiting confirmation, if any.
    ///
    /// Cleared (not just flagged) once the email is verified.
    fn otp_code(&self) -> Option<&str>;

    /// When the embedded verification code stops being valid.
    fn otp_expires_at(&self) -> Option<DateTime<Utc>>;

    /// Category ids the user has marked as interests.
    fn interests(&self) -> &[String];

    /// Returns when the user was created.
    fn created_at(&self) -> DateTime<Utc>;
}

/// Fields for creating a new, unverified user.
///
/// The embedded OTP challenge is set at creation time so the registration
/// flow never has a verified-but-unchallenged window.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// App-generated unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Normalized email address.
    pub email: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Verification code to embed on the record.
    pub otp_code: String,
    /// When the embedded code expires.
    pub otp_expires_at: DateTime<Utc>,
}

/// A standalone one-time-code record, keyed on an email identity.
///
/// Multiple records may exist per identity; only the most recently created
/// unverified one is ever a valid verification target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRecord {
    /// App-generated unique identifier.
    pub id: Uuid,
    /// Email identity the code was issued for.
    pub email: String,
    /// The 8-digit code.
    pub code: String,
    /// Workflow tag, e.g. "verification" or "registration".
    pub purpose: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the code stops being valid.
    pub expires_at: DateTime<Utc>,
    /// Whether the code has been successfully verified. Monotonic.
    pub verified: bool,
    /// Set exactly once, on the pending-to-verified transition.
    pub verified_at: Option<DateTime<Utc>>,
}

/// A product category available for interest selection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Store-assigned identifier.
    pub id: String,
    /// Category name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Display icon (emoji).
    pub icon: String,
    /// Whether the category is selectable.
    pub is_active: bool,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

/// Backend storage trait for auth, verification and interest operations.
///
/// Implement this trait to use any document store with the crate. The two
/// `*_apply` transitions must be conditional writes (compare-and-set on the
/// unverified state) so concurrent verification attempts commit at most once.
pub trait AuthBackend: Clone + Send + Sync + 'static {
    /// The user type stored in this backend.
    type User: AuthUser;

    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Find a user by email address.
    ///
    /// Returns `None` if no user exists with the given email.
    fn user_find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Self::User>, Self::Error>> + Send;

    /// Find a user by their unique ID.
    ///
    /// Returns `None` if no user exists with the given ID.
    fn user_get_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Self::User>, Self::Error>> + Send;

    /// Create a new unverified user with an embedded OTP challenge.
    fn user_insert(
        &self,
        user: NewUser,
    ) -> impl Future<Output = Result<Self::User, Self::Error>> + Send;

    /// Mark a user's email verified and clear the embedded OTP challenge.
    ///
    /// Must be conditional on `email_verified` being false at write time.
    /// Returns `false` when no unverified user matched (absent or already
    /// verified), in which case nothing was written.
    fn user_email_verify_apply(
        &self,
        id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Replace the user's interest list wholesale.
    fn user_interests_replace(
        &self,
        id: Uuid,
        category_ids: &[String],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Add a single category id to the user's interests (set semantics).
    fn user_interest_add(
        &self,
        id: Uuid,
        category_id: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Remove a single category id from the user's interests.
    fn user_interest_remove(
        &self,
        id: Uuid,
        category_id: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Persist a new standalone OTP record.
    fn otp_record_insert(
        &self,
        record: &OtpRecord,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Fetch the most recently created unverified OTP record for an identity.
    ///
    /// Ties on `created_at` resolve to the latest inserted record, so the
    /// result is the issuance-order newest pending code.
    fn otp_find_latest_pending(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<OtpRecord>, Self::Error>> + Send;

    /// Transition one OTP record from pending to verified.
    ///
    /// Must be conditional on `verified` being false at write time. Returns
    /// `false` when the record was absent or already verified.
    fn otp_verify_apply(
        &self,
        id: Uuid,
        verified_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Fetch one page of categories plus the total category count.
    fn categories_page(
        &self,
        skip: u64,
        limit: i64,
    ) -> impl Future<Output = Result<(Vec<Category>, u64), Self::Error>> + Send;
}
