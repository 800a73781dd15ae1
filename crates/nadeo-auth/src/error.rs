//! Error types for token acquisition

/// Errors from token acquisition and refresh.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Ubisoft rejected the account email/password. Not retryable.
    #[error("credentials rejected: {0}")]
    CredentialsRejected(String),

    /// The exchange endpoint rejected the session ticket. The broker
    /// absorbs the first occurrence per acquisition by discarding the
    /// ticket; a second occurrence surfaces.
    #[error("session ticket rejected: {0}")]
    TicketRejected(String),

    #[error("unexpected token endpoint response: {0}")]
    InvalidResponse(String),

    #[error("token store error: {0}")]
    Store(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
