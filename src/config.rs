use crate::otp::OtpMode;
use std::time::Duration;
use thiserror::Error;

/// Errors when loading or validating authentication configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthConfigError {
    /// Required environment variable was not provided.
    #[error("missing env var {0}")]
    MissingEnv(&'static str),

    /// Configuration failed validation checks.
    #[error("invalid auth config: {0}")]
    Invalid(String),
}

/// Cookie SameSite policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieSameSite {
    /// Cookies are sent in all contexts
    None,
    /// Cookies are sent in same-site and cross-site top-level navigations
    Lax,
    /// Cookies are only sent in same-site contexts
    Strict,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for signing session JWTs
    pub jwt_secret: String,

    /// Session token expiry duration (default: 7 days)
    pub session_expiry: Duration,

    /// JWT issuer claim (default: "shop-auth")
    pub jwt_issuer: String,

    /// JWT audience claim (default: "authenticated")
    pub jwt_audience: String,

    /// Minimum password length (default: 6)
    pub password_min_length: usize,

    /// Maximum password length (default: 128)
    pub password_max_length: usize,

    /// Cookie name for the session token (default: "token")
    pub cookie_name: String,

    /// Cookie domain (optional, default: None)
    pub cookie_domain: Option<String>,

    /// Cookie path (default: "/")
    pub cookie_path: String,

    /// Cookie secure flag - only send over HTTPS (default: true in production, false in debug)
    pub cookie_secure: bool,

    /// Cookie SameSite policy (default: Lax)
    pub cookie_same_site: CookieSameSite,

    // --- OTP Settings ---
    /// How long an issued one-time code stays valid (default: 10 minutes)
    pub otp_expiry: Duration,

    /// OTP check leniency (default: strict). Relaxed mode accepts any
    /// syntactically valid 8-digit code and skips expiry checks; it is a
    /// local diagnostic convenience, never a trust boundary.
    pub otp_mode: OtpMode,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(), // Must be provided by user
            session_expiry: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
            jwt_issuer: "shop-auth".to_string(),
            jwt_audience: "authenticated".to_string(),
            password_min_length: 6,
            password_max_length: 128,
            cookie_name: "token".to_string(),
            cookie_domain: None,
            cookie_path: "/".to_string(),
            cookie_secure: !cfg!(debug_assertions), // true in release, false in debug
            cookie_same_site: CookieSameSite::Lax,
            otp_expiry: Duration::from_secs(10 * 60), // 10 minutes
            otp_mode: OtpMode::Strict,
        }
    }
}

impl AuthConfig {
    /// Build auth config from environment variables.
    ///
    /// Required:
    /// - `AUTH_JWT_SECRET`
    ///
    /// Optional variables fall back to `Default` values when not provided.
    pub fn from_env() -> Result<Self, AuthConfigError> {
        let mut cfg = Self::default();
        cfg.jwt_secret = env_var_required("AUTH_JWT_SECRET")?;
        cfg.session_expiry = Duration::from_secs(env_var_parse_or_default(
            "AUTH_SESSION_EXPIRY_SECS",
            cfg.session_expiry.as_secs(),
            "u64",
        )?);
        cfg.password_min_length =
            env_var_parse_or_default("AUTH_PASSWORD_MIN_LENGTH", cfg.password_min_length, "usize")?;
        cfg.password_max_length =
            env_var_parse_or_default("AUTH_PASSWORD_MAX_LENGTH", cfg.password_max_length, "usize")?;
        cfg.cookie_secure = env_var_bool_or_default("AUTH_COOKIE_SECURE", cfg.cookie_secure)?;
        cfg.cookie_same_site =
            env_var_cookie_same_site_or_default("AUTH_COOKIE_SAME_SITE", cfg.cookie_same_site)?;
        cfg.otp_expiry = Duration::from_secs(env_var_parse_or_default(
            "AUTH_OTP_EXPIRY_SECS",
            cfg.otp_expiry.as_secs(),
            "u64",
        )?);
        cfg.otp_mode = env_var_otp_mode_or_default("AUTH_OTP_MODE", cfg.otp_mode)?;

        if let Some(v) = env_var_optional("AUTH_JWT_ISSUER") {
            cfg.jwt_issuer = v;
        }
        if let Some(v) = env_var_optional("AUTH_JWT_AUDIENCE") {
            cfg.jwt_audience = v;
        }
        if let Some(v) = env_var_optional("AUTH_COOKIE_NAME") {
            cfg.cookie_name = v;
        }
        if let Some(v) = env_var_optional("AUTH_COOKIE_PATH") {
            cfg.cookie_path = v;
        }
        cfg.cookie_domain = env_var_optional("AUTH_COOKIE_DOMAIN");

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), AuthConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(AuthConfigError::Invalid(
                "JWT secret cannot be empty".to_string(),
            ));
        }

        if self.jwt_secret.len() < 32 {
            return Err(AuthConfigError::Invalid(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.session_expiry.as_secs() == 0 {
            return Err(AuthConfigError::Invalid(
                "Session expiry must be greater than 0".to_string(),
            ));
        }

        if self.otp_expiry.as_secs() == 0 {
            return Err(AuthConfigError::Invalid(
                "OTP expiry must be greater than 0".to_string(),
            ));
        }

        if self.password_min_length == 0 {
            return Err(AuthConfigError::Invalid(
                "Minimum password length must be greater than 0".to_string(),
            ));
        }

        if self.password_max_length < self.password_min_length {
            return Err(AuthConfigError::Invalid(
                "Maximum password length must be greater than or equal to minimum password length"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn env_var_required(key: &'static str) -> Result<String, AuthConfigError> {
    std::env::var(key).map_err(|_| AuthConfigError::MissingEnv(key))
}

fn env_var_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_var_parse_or_default<T: std::str::FromStr>(
    key: &str,
    default: T,
    type_name: &str,
) -> Result<T, AuthConfigError> {
    match env_var_optional(key) {
        Some(v) => v
            .parse::<T>()
            .map_err(|_| AuthConfigError::Invalid(format!("{key} must be a valid {type_name}"))),
        _ => Ok(default),
    }
}

fn env_var_bool_or_default(key: &str, default: bool) -> Result<bool, AuthConfigError> {
    match env_var_optional(key) {
        Some(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AuthConfigError::Invalid(format!(
                "{key} must be a valid boolean"
            ))),
        },
        _ => Ok(default),
    }
}

fn env_var_cookie_same_site_or_default(
    key: &str,
    default: CookieSameSite,
) -> Result<CookieSameSite, AuthConfigError> {
    match env_var_optional(key) {
        Some(v) => match v.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CookieSameSite::None),
            "lax" => Ok(CookieSameSite::Lax),
            "strict" => Ok(CookieSameSite::Strict),
            _ => Err(AuthConfigError::Invalid(format!(
                "{key} must be one of: none, lax, strict"
            ))),
        },
        _ => Ok(default),
    }
}

fn env_var_otp_mode_or_default(key: &str, default: OtpMode) -> Result<OtpMode, AuthConfigError> {
    match env_var_optional(key) {
        Some(v) => match v.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(OtpMode::Strict),
            "relaxed" => Ok(OtpMode::Relaxed),
            _ => Err(AuthConfigError::Invalid(format!(
                "{key} must be one of: strict, relaxed"
            ))),
        },
        _ => Ok(default),
    }
}
