//! HTTP handlers for auth, verification, interests and categories.

pub mod categories;
pub mod interests;
pub mod login;
pub mod logout;
pub mod me;
pub mod otp;
pub mod register;

pub use categories::{CATEGORIES_PATH, categories_routes};
pub use interests::{INTERESTS_PATH, interests_routes};
pub use login::{LOGIN_PATH, LoginRequest, login_routes};
pub use logout::{LOGOUT_PATH, LogoutResponse, logout_routes};
pub use me::{ME_PATH, me_routes};
pub use otp::{OTP_SEND_PATH, OTP_VERIFY_ANY_PATH, OTP_VERIFY_PATH, otp_routes};
pub use register::{REGISTER_PATH, RegisterRequest, register_routes};
