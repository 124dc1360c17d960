//! One-time-code generation and the verification workflow engine.
//!
//! The engine drives the full lifecycle of a standalone code: issue a
//! pending record for an email identity, best-effort deliver the code, and
//! later transition the newest pending record to verified when a matching
//! code is submitted. Per (identity, purpose) a record is in one of four
//! states: pending, expired, verified (terminal), or absent. Older pending
//! records for the same identity become permanently unreachable once a newer
//! one is issued.
//!
//! There is no attempt counter, lockout, or retention sweep here; verified
//! and superseded records stay in the store and guesses are unlimited.
//! Callers wanting either must layer it in front of the engine.

use crate::{
    Auth,
    backend::{AuthBackend, OtpRecord},
    email::email_normalize,
    error::AuthError,
    notify::{NotificationSender, otp_email_send},
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

/// Submitted codes of any other length are rejected before a store lookup.
pub const OTP_CODE_LENGTH: usize = 8;

/// Purpose tag applied when issuance does not name one.
pub const OTP_PURPOSE_DEFAULT: &str = "verification";

/// Code/expiry check leniency.
///
/// A process-wide configuration value threaded into every check as an
/// explicit argument. Relaxed mode is a local diagnostic convenience and
/// must never guard a trust boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpMode {
    /// Submitted code must equal the stored code; expiry is enforced.
    Strict,
    /// Any syntactically valid 8-digit code is accepted in addition to the
    /// stored code, and expiry enforcement is skipped entirely.
    Relaxed,
}

/// Outcome of issuing a one-time code.
#[derive(Debug, Clone)]
pub struct OtpIssued {
    /// Normalized identity the code was issued for.
    pub email: String,
    /// Whether the notification sender accepted the code for delivery.
    /// Delivery failure never rolls back the persisted record.
    pub delivered: bool,
    /// The generated code, echoed back in relaxed mode only.
    pub dev_code: Option<String>,
}

/// Outcome of a successful verification.
#[derive(Debug, Clone)]
pub struct OtpVerified {
    /// Normalized identity that was verified.
    pub email: String,
    /// Purpose tag carried by the verified record.
    pub purpose: String,
}

/// Generate a one-time code of exactly [`OTP_CODE_LENGTH`] ASCII digits.
///
/// Codes are drawn uniformly from [10000000, 99999999]. Collisions between
/// calls are tolerated; uniqueness of effect comes from the store record,
/// not the code value.
pub fn otp_code_generate() -> String {
    let mut rng = rand::rng();
    rng.random_range(10_000_000u32..=99_999_999).to_string()
}

/// Whether a submitted code is syntactically a well-formed one-time code.
pub fn otp_code_shape_valid(code: &str) -> bool {
    code.len() == OTP_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Calculate the expiry instant for a code issued now.
pub fn otp_expiry_calculate(window: std::time::Duration) -> Result<DateTime<Utc>, AuthError> {
    let window = Duration::from_std(window)
        .map_err(|_| AuthError::Internal("otp expiry overflow".to_string()))?;
    Ok(Utc::now() + window)
}

/// Check a submitted code against a pending challenge.
///
/// State is resolved before the code comparison: in strict mode an expired
/// challenge fails with [`AuthError::OtpExpired`] regardless of code
/// correctness. Relaxed mode skips the expiry check and additionally accepts
/// any well-formed 8-digit code.
pub fn otp_submission_check(
    stored_code: &str,
    expires_at: DateTime<Utc>,
    submitted: &str,
    mode: OtpMode,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    match mode {
        OtpMode::Relaxed => {
            if otp_code_shape_valid(submitted) || submitted == stored_code {
                Ok(())
            } else {
                Err(AuthError::OtpInvalid)
            }
        }
        OtpMode::Strict => {
            if now > expires_at {
                return Err(AuthError::OtpExpired);
            }
            if submitted != stored_code {
                return Err(AuthError::OtpInvalid);
            }
            Ok(())
        }
    }
}

/// Issue a one-time code for an identity.
///
/// Generates a code, persists a pending record, then asks the notifier to
/// deliver it. Delivery runs in its own failure domain: a failed send is
/// reported through [`OtpIssued::delivered`], never as an error, and the
/// record stays persisted either way.
pub async fn otp_issue<B: AuthBackend, N: NotificationSender>(
    auth: &Auth<B, N>,
    email: &str,
    purpose: Option<String>,
    display_name: &str,
) -> Result<OtpIssued, AuthError> {
    let email = email_normalize(email)?;
    let code = otp_code_generate();

    let record = OtpRecord {
        id: Uuid::new_v4(),
        email: email.clone(),
        code: code.clone(),
        purpose: purpose.unwrap_or_else(|| OTP_PURPOSE_DEFAULT.to_string()),
        created_at: Utc::now(),
        expires_at: otp_expiry_calculate(auth.config().otp_expiry)?,
        verified: false,
        verified_at: None,
    };

    auth.backend()
        .otp_record_insert(&record)
        .await
        .map_err(AuthError::from_backend)?;

    let delivered = otp_email_send(auth, &email, display_name, &code).await;

    let dev_code = matches!(auth.config().otp_mode, OtpMode::Relaxed).then_some(code);

    Ok(OtpIssued {
        email,
        delivered,
        dev_code,
    })
}

/// Verify a submitted code against the newest pending record for an identity.
///
/// The transition to verified is a conditional write on the unverified
/// state, so of two concurrent attempts with the correct code exactly one
/// commits; the loser observes [`AuthError::OtpNotFound`].
pub async fn otp_verify<B: AuthBackend, N: NotificationSender>(
    auth: &Auth<B, N>,
    email: &str,
    submitted: &str,
) -> Result<OtpVerified, AuthError> {
    let email = email_normalize(email)?;

    if submitted.len() != OTP_CODE_LENGTH {
        return Err(AuthError::OtpMalformed);
    }

    let record = auth
        .backend()
        .otp_find_latest_pending(&email)
        .await
        .map_err(AuthError::from_backend)?
        .ok_or(AuthError::OtpNotFound)?;

    let now = Utc::now();
    otp_submission_check(
        &record.code,
        record.expires_at,
        submitted,
        auth.config().otp_mode,
        now,
    )?;

    let applied = auth
        .backend()
        .otp_verify_apply(record.id, now)
        .await
        .map_err(AuthError::from_backend)?;

    if !applied {
        // Another attempt won the transition between our read and write.
        return Err(AuthError::OtpNotFound);
    }

    Ok(OtpVerified {
        email,
        purpose: record.purpose,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_always_eight_digits() {
        for _ in 0..10_000 {
            let code = otp_code_generate();
            assert_eq!(code.len(), OTP_CODE_LENGTH);
            assert!(code.bytes().all(|b| b.is_ascii_digit()), "code: {code}");
            assert_ne!(code.as_bytes()[0], b'0', "code: {code}");
        }
    }

    #[test]
    fn generated_codes_pass_shape_check() {
        for _ in 0..100 {
            assert!(otp_code_shape_valid(&otp_code_generate()));
        }
    }

    #[test]
    fn shape_check_rejects_wrong_lengths_and_non_digits() {
        assert!(otp_code_shape_valid("12345678"));
        assert!(!otp_code_shape_valid("1234567"));
        assert!(!otp_code_shape_valid("123456789"));
        assert!(!otp_code_shape_valid("1234567a"));
        assert!(!otp_code_shape_valid(""));
        assert!(!otp_code_shape_valid("１２３４５６７８")); // fullwidth digits
    }

    #[test]
    fn strict_accepts_exact_match_before_expiry() {
        let now = Utc::now();
        let expires = now + Duration::minutes(10);
        assert!(otp_submission_check("12345678", expires, "12345678", OtpMode::Strict, now).is_ok());
    }

    #[test]
    fn strict_rejects_mismatch_as_invalid() {
        let now = Utc::now();
        let expires = now + Duration::minutes(10);
        let result = otp_submission_check("12345678", expires, "87654321", OtpMode::Strict, now);
        assert!(matches!(result, Err(AuthError::OtpInvalid)));
    }

    #[test]
    fn strict_rejects_expired_regardless_of_code() {
        let now = Utc::now();
        let expires = now - Duration::seconds(1);

        // Even the correct code fails once expired.
        let correct = otp_submission_check("12345678", expires, "12345678", OtpMode::Strict, now);
        assert!(matches!(correct, Err(AuthError::OtpExpired)));

        // A wrong code reports expired too; expiry dominates.
        let wrong = otp_submission_check("12345678", expires, "00000000", OtpMode::Strict, now);
        assert!(matches!(wrong, Err(AuthError::OtpExpired)));
    }

    #[test]
    fn relaxed_accepts_any_well_formed_code_past_expiry() {
        let now = Utc::now();
        let expires = now - Duration::hours(1);
        assert!(
            otp_submission_check("12345678", expires, "99999999", OtpMode::Relaxed, now).is_ok()
        );
    }

    #[test]
    fn relaxed_still_rejects_malformed_codes() {
        let now = Utc::now();
        let expires = now + Duration::minutes(10);
        let result = otp_submission_check("12345678", expires, "abcdefgh", OtpMode::Relaxed, now);
        assert!(matches!(result, Err(AuthError::OtpInvalid)));
    }

    #[test]
    fn expiry_calculation_lands_in_the_future() {
        let expires = otp_expiry_calculate(std::time::Duration::from_secs(600)).unwrap();
        assert!(expires > Utc::now());
        assert!(expires <= Utc::now() + Duration::minutes(11));
    }
}
