//! Nadeo authentication constants
//!
//! Endpoint addresses and the public Ubisoft application id sent by every
//! Trackmania client. None of these are secrets - the account password and
//! the issued tokens are the sensitive values, and those live in the config
//! and the token store.

/// Ubisoft session endpoint (upstream identity provider)
pub const UBI_SESSIONS_URL: &str = "https://public-ubiservices.ubi.com/v3/profiles/sessions";

/// Public application id the session endpoint expects in `Ubi-AppId`
pub const UBI_APP_ID: &str = "86263886-327a-4328-ac69-527f0d20a237";

/// Ticket-to-token exchange endpoint
pub const TOKEN_EXCHANGE_URL: &str =
    "https://prod.trackmania.core.nadeo.online/v2/authentication/token/ubiservices";

/// Refresh endpoint (accepts the refresh token of either audience)
pub const TOKEN_REFRESH_URL: &str =
    "https://prod.trackmania.core.nadeo.online/v2/authentication/token/refresh";

/// Access tokens are reused for 55 minutes, safely under their one-hour
/// lifetime.
pub const TOKEN_MAX_AGE_SECS: i64 = 3300;
