//! # shop-auth
//!
//! Email/OTP verification and session auth for a small storefront, over any
//! document store.
//!
//! ## Features
//!
//! - **8-digit one-time codes** with a 10-minute expiry window, issued per
//!   email identity and verified against the newest pending record
//! - **Registration challenge** embedded on the user record and cleared on
//!   successful verification
//! - **Session JWTs** in httpOnly cookies, with `Authorization: Bearer`
//!   accepted as an alternative
//! - **Per-user category interests** and a paginated category listing
//! - **Extensible backend trait** for any document store, with MongoDB and
//!   in-memory implementations included
//! - **Best-effort delivery** through a notification sender trait; a failed
//!   send never rolls back the persisted code
//!
//! ## Quick Start
//!
//! Build an `Auth` from a config and a backend, then mount its routes:
//!
//! ```rust,ignore
//! use axum::{Router, middleware};
//! use shop_auth::{Auth, AuthConfig, SmtpSender, mongo::MongoBackend};
//!
//! let backend = MongoBackend::connect("mongodb://localhost:27017", "storefront").await?;
//! let sender = SmtpSender::new("smtp.example.com", "noreply@example.com", "app-password")?;
//! let auth = Auth::new(AuthConfig::from_env()?, backend)?.with_sender(sender);
//!
//! let app: Router = Router::new()
//!     .merge(auth.routes::<()>())
//!     .layer(middleware::from_fn_with_state(
//!         auth.clone(),
//!         shop_auth::middleware::base,
//!     ));
//! ```
//!
//! For tests and local development, swap in the in-memory backend and the
//! default no-op sender:
//!
//! ```rust,ignore
//! use shop_auth::{Auth, AuthConfig, testing::MemoryBackend};
//!
//! let backend = MemoryBackend::new();
//! backend.seed_categories();
//! let auth = Auth::new(config, backend)?;
//! ```
//!
//! ## Endpoints
//!
//! - `POST /api/auth/register` - Create an unverified account with an embedded code
//! - `POST /api/auth/login` - Authenticate and set the session cookie
//! - `POST /api/auth/logout` - Clear the session cookie
//! - `GET /api/auth/me` - Current session claims (requires auth)
//! - `POST /api/auth/send-otp` - Issue a standalone code for an identity
//! - `POST /api/auth/verify-otp` - Verify the registration challenge
//! - `POST /api/auth/verify-any-otp` - Verify a standalone code
//! - `GET/POST/PUT /api/user/interests` - Read and edit interests (requires auth)
//! - `GET /api/categories` - Paginated category listing

mod backend;
mod config;
mod cookies;
mod email;
mod error;
mod extractors;
pub mod handlers;
pub mod middleware;
pub mod mongo;
mod notify;
pub mod openapi;
pub mod otp;
mod password;
pub mod testing;
pub mod tokens;

use axum::Router;
use std::sync::Arc;

pub use backend::{AuthBackend, AuthUser, Category, NewUser, OtpRecord};
pub use config::{AuthConfig, AuthConfigError, CookieSameSite};
pub use error::{AuthError, AuthErrorResponse};
pub use extractors::CurrentUser;
pub use handlers::{LoginRequest, LogoutResponse, RegisterRequest};
pub use notify::{NotificationSender, NotifyError, SmtpSender};
pub use otp::OtpMode;

/// Email/OTP verification and session auth service. Cheap to clone.
///
/// # Type Parameters
///
/// - `B`: The storage backend implementing [`AuthBackend`]
/// - `N`: Optional notification sender implementing [`NotificationSender`]
///   (defaults to the no-op `()`)
///
/// # Example
///
/// ```rust,ignore
/// use shop_auth::{Auth, AuthConfig};
///
/// let auth = Auth::new(AuthConfig::from_env()?, backend)?;
///
/// // With SMTP delivery
/// let auth = Auth::new(config, backend)?
///     .with_sender(smtp_sender);
/// ```
#[derive(Clone)]
pub struct Auth<B: AuthBackend, N: NotificationSender = ()> {
    config: Arc<AuthConfig>,
    backend: B,
    notifier: N,
}

impl<B: AuthBackend> Auth<B, ()> {
    /// Create an auth instance with the default (no-op) sender.
    pub fn new(config: AuthConfig, backend: B) -> Result<Self, AuthConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            backend,
            notifier: (),
        })
    }
}

impl<B: AuthBackend, N: NotificationSender> Auth<B, N> {
    /// Attach a notification sender for code delivery.
    pub fn with_sender<NewN: NotificationSender>(self, notifier: NewN) -> Auth<B, NewN> {
        Auth {
            config: self.config,
            backend: self.backend,
            notifier,
        }
    }

    /// Returns a router with all endpoints.
    ///
    /// Endpoints:
    /// - `POST /api/auth/register`
    /// - `POST /api/auth/login`
    /// - `POST /api/auth/logout`
    /// - `GET /api/auth/me`
    /// - `POST /api/auth/send-otp`
    /// - `POST /api/auth/verify-otp`
    /// - `POST /api/auth/verify-any-otp`
    /// - `GET/POST/PUT /api/user/interests`
    /// - `GET /api/categories`
    pub fn routes<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
        Auth<B, N>: axum::extract::FromRef<S>,
    {
        Router::new()
            .merge(handlers::register_routes::<B, N>())
            .merge(handlers::login_routes::<B, N>())
            .merge(handlers::logout_routes::<B, N>())
            .merge(handlers::me_routes::<Auth<B, N>>())
            .merge(handlers::otp_routes::<B, N>())
            .merge(handlers::interests_routes::<B, N>())
            .merge(handlers::categories_routes::<B, N>())
            .with_state(self.clone())
    }

    /// Returns a reference to the auth configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Returns a reference to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn notifier(&self) -> &N {
        &self.notifier
    }
}
