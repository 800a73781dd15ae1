//! Nadeo authentication library
//!
//! Implements the two-tier login used by Trackmania's web services: a
//! Ubisoft account session (email/password over Basic auth) is traded for
//! audience-scoped access/refresh token pairs. This crate is a standalone
//! library with no dependency on the CLI binary.
//!
//! Token flow:
//! 1. Caller asks `TokenBroker::access_token(audience)`
//! 2. A record younger than the reuse window is returned without a network
//!    call (`store` mirrors records to disk between runs)
//! 3. A stale record is refreshed via `wire::refresh_tokens`
//! 4. Otherwise `wire::ubisoft_session` + `wire::exchange_ticket` re-login;
//!    a ticket the exchange rejects is discarded and re-acquired once
//! 5. Every new pair is persisted through `store::TokenStore`

pub mod audience;
pub mod broker;
pub mod constants;
pub mod error;
pub mod store;
pub mod wire;

pub use audience::Audience;
pub use broker::TokenBroker;
pub use constants::*;
pub use error::{Error, Result};
pub use store::{TokenRecord, TokenStore};
pub use wire::{AuthEndpoints, TokenPair};
