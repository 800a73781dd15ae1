//! Error types for the API clients

/// Errors from the Live, Core, and community clients.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Non-2xx status from an endpoint, with the body when readable.
    #[error("endpoint error: {0}")]
    Status(String),

    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Auth(#[from] nadeo_auth::Error),
}

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;
