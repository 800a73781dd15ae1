//! Shared error type
//!
//! Covers the two concerns every crate in the workspace touches: reading
//! configuration and moving JSON documents on and off disk. Domain errors
//! (auth failures, endpoint errors) live in their own crates and do not
//! funnel through here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed toml: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
