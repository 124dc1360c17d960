//! Notification delivery for one-time codes.
//!
//! Implement [`NotificationSender`] to provide out-of-band delivery for
//! verification codes. Delivery is always best-effort: issuance persists the
//! code first and folds the delivery result into its response.

use crate::{Auth, backend::AuthBackend};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::future::Future;
use thiserror::Error;

/// Error type for notification sending operations.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// Failed to build or deliver the message.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// Trait for async out-of-band delivery.
///
/// The default implementation (`()`) is a no-op that silently succeeds,
/// which is what local development and tests want.
pub trait NotificationSender: Send + Sync + Clone + 'static {
    /// Send a message asynchronously.
    ///
    /// Implementations may queue messages for background delivery or send
    /// immediately.
    fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// No-op sender (default).
impl NotificationSender for () {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// SMTP-backed sender built on `lettre`.
#[derive(Clone)]
pub struct SmtpSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpSender {
    /// Build a relay transport against the given SMTP host.
    ///
    /// `smtp_user` doubles as the from-address, matching the usual app-mail
    /// setup where the authenticated account is the sender.
    pub fn new(smtp_host: &str, smtp_user: &str, smtp_pass: &str) -> Result<Self, NotifyError> {
        let creds = Credentials::new(smtp_user.to_string(), smtp_pass.to_string());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
            .map_err(|e| NotifyError::Smtp(e.to_string()))?
            .credentials(creds)
            .build();

        let from = smtp_user
            .parse()
            .map_err(|_| NotifyError::Delivery(format!("invalid from address: {smtp_user}")))?;

        Ok(Self { mailer, from })
    }
}

impl NotificationSender for SmtpSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|_| NotifyError::Delivery(format!("invalid recipient address: {to}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        Ok(())
    }
}

/// Build the verification email body shown to the user.
fn otp_email_body(display_name: &str, code: &str, expiry_minutes: u64) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #000; text-align: center;">Verify Your Email</h2>
  <p>Hi {display_name},</p>
  <p>Please use the following 8-digit code to verify your email address:</p>
  <div style="background-color: #f5f5f5; padding: 20px; text-align: center; margin: 20px 0; border-radius: 8px;">
    <h1 style="color: #000; font-size: 32px; letter-spacing: 4px; margin: 0;">{code}</h1>
  </div>
  <p>This code will expire in {expiry_minutes} minutes for security reasons.</p>
  <p>If you didn't request this verification, please ignore this email.</p>
</div>"#
    )
}

/// Attempt to deliver a verification code, reporting success as a flag.
///
/// Delivery failures are logged and absorbed so they never abort the
/// issuance flow that persisted the code.
pub(crate) async fn otp_email_send<B: AuthBackend, N: NotificationSender>(
    auth: &Auth<B, N>,
    to: &str,
    display_name: &str,
    code: &str,
) -> bool {
    let expiry_minutes = auth.config().otp_expiry.as_secs() / 60;
    let body = otp_email_body(display_name, code, expiry_minutes);

    match auth.notifier().send(to, "Verify Your Email", &body).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = ?e, "Failed to send verification code email");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_body_includes_name_code_and_window() {
        let body = otp_email_body("Ada", "12345678", 10);
        assert!(body.contains("Hi Ada,"));
        assert!(body.contains("12345678"));
        assert!(body.contains("expire in 10 minutes"));
    }

    #[tokio::test]
    async fn noop_sender_always_succeeds() {
        let result = ().send("user@example.com", "subject", "body").await;
        assert!(result.is_ok());
    }
}
