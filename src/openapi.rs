//! OpenAPI generation for the public HTTP endpoints.

use std::path::{Path, PathBuf};

use crate::handlers;
use thiserror::Error;
use utoipa::OpenApi;

/// OpenAPI document for all public HTTP endpoints.
#[derive(OpenApi)]
#[openapi(
    nest(
        (path = handlers::REGISTER_PATH, api = handlers::register::RegisterApi, tags = ["auth"]),
        (path = handlers::LOGIN_PATH, api = handlers::login::LoginApi, tags = ["auth"]),
        (path = handlers::LOGOUT_PATH, api = handlers::logout::LogoutApi, tags = ["auth"]),
        (path = handlers::ME_PATH, api = handlers::me::MeApi, tags = ["auth"]),
        (path = handlers::OTP_SEND_PATH, api = handlers::otp::OtpSendApi, tags = ["verification"]),
        (
            path = handlers::OTP_VERIFY_PATH,
            api = handlers::otp::OtpVerifyApi,
            tags = ["verification"]
        ),
        (
            path = handlers::OTP_VERIFY_ANY_PATH,
            api = handlers::otp::OtpVerifyAnyApi,
            tags = ["verification"]
        ),
        (
            path = handlers::INTERESTS_PATH,
            api = handlers::interests::InterestsApi,
            tags = ["interests"]
        ),
        (
            path = handlers::CATEGORIES_PATH,
            api = handlers::categories::CategoriesApi,
            tags = ["categories"]
        )
    ),
    tags(
        (name = "auth", description = "Account and session management"),
        (name = "verification", description = "One-time-code issuance and verification"),
        (name = "interests", description = "Per-user category interests"),
        (name = "categories", description = "Category listing")
    )
)]
pub struct ShopApiDoc;

/// OpenAPI generation and file-write errors.
#[derive(Debug, Error)]
pub enum OpenApiError {
    /// OpenAPI serialization failed.
    #[error("failed to serialize openapi spec: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// Creating the docs directory failed.
    #[error("failed to create docs directory at {path}: {source}")]
    CreateDir {
        /// Target directory path.
        path: PathBuf,
        /// I/O source error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the OpenAPI file failed.
    #[error("failed to write openapi spec at {path}: {source}")]
    WriteFile {
        /// Target file path.
        path: PathBuf,
        /// I/O source error.
        #[source]
        source: std::io::Error,
    },
}

/// Build the OpenAPI document.
pub fn openapi_build() -> utoipa::openapi::OpenApi {
    ShopApiDoc::openapi()
}

/// Generate the OpenAPI document as YAML.
pub fn openapi_yaml_generate() -> Result<String, OpenApiError> {
    Ok(serde_yaml::to_string(&openapi_build())?)
}

/// Write the OpenAPI YAML document to an arbitrary path.
pub fn openapi_yaml_write(path: impl AsRef<Path>) -> Result<(), OpenApiError> {
    let path = path.as_ref();
    let docs_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    std::fs::create_dir_all(&docs_dir).map_err(|source| OpenApiError::CreateDir {
        path: docs_dir.clone(),
        source,
    })?;

    let spec = openapi_yaml_generate()?;
    std::fs::write(path, spec).map_err(|source| OpenApiError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Write `docs/openapi.yml` under the crate root and return the written path.
pub fn openapi_yaml_write_default() -> Result<PathBuf, OpenApiError> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("docs")
        .join("openapi.yml");
    openapi_yaml_write(&path)?;
    Ok(path)
}
