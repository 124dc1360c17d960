//! Session token generation and validation utilities.

use crate::{config::AuthConfig, error::AuthError};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims structure for the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// User email.
    pub email: String,
    /// User display name.
    pub name: String,
}

/// Generate a session token (JWT).
pub fn session_token_generate(
    user_id: Uuid,
    email: String,
    name: String,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let session_expiry = Duration::from_std(config.session_expiry)
        .map_err(|_| AuthError::Internal("session expiry overflow".to_string()))?;
    let expiry = now + session_expiry;

    let claims = SessionClaims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        iss: config.jwt_issuer.clone(),
        aud: config.jwt_audience.clone(),
        email,
        name,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate and decode a session token.
pub fn session_token_validate(
    token: &str,
    config: &AuthConfig,
) -> Result<SessionClaims, AuthError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_audience(&[&config.jwt_audience]);

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test_secret_key_at_least_32_chars_long_for_security".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_and_validate_session_token() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let email = "test@example.com".to_string();
        let name = "Test User".to_string();

        let token =
            session_token_generate(user_id, email.clone(), name.clone(), &config).unwrap();
        let claims = session_token_validate(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, email);
        assert_eq!(claims.name, name);
        assert_eq!(claims.iss, config.jwt_issuer);
        assert_eq!(claims.aud, config.jwt_audience);
    }

    #[test]
    fn test_invalid_token_fails() {
        let config = test_config();
        let result = session_token_validate("invalid_token", &config);
        assert!(result.is_err());
    }

    #[test]
    fn test_token_with_wrong_secret_fails() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = session_token_generate(
            user_id,
            "test@example.com".to_string(),
            "Test User".to_string(),
            &config,
        )
        .unwrap();

        let mut wrong_config = config;
        wrong_config.jwt_secret =
            "wrong_secret_key_at_least_32_chars_long_for_security".to_string();

        let result = session_token_validate(&token, &wrong_config);
        assert!(result.is_err());
    }
}
