//! Error types for msgraph-client.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Secret store error: {0}")]
    Secret(#[from] SecretStoreError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Config file is empty")]
    Empty,

    #[error("Missing required value: {0}")]
    Missing(&'static str),

    #[error("Invalid {field} URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },
}

/// Credential store errors.
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open credential database: {0}")]
    Open(String),

    #[error("Entry '{0}' not found in credential database")]
    NotFound(String),

    #[error("Entry '{0}' has no password")]
    EmptyPassword(String),
}

/// Token acquisition errors.
///
/// Structured OAuth2 errors returned by the identity provider are not errors
/// at this level; they arrive as `TokenResult::Failure`.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid client configuration: {0}")]
    InvalidClient(String),

    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected token endpoint response: {0}")]
    InvalidResponse(String),
}

/// Microsoft Graph API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Graph API request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse API response: {0}")]
    ParseFailed(String),

    #[error("Invalid Graph request: {0}")]
    InvalidRequest(String),
}

impl AppError {
    /// Returns true if the run stopped before touching the credential store or network.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
