//! Ubisoft session and Nadeo token endpoint interactions
//!
//! Handles the three wire calls of the token protocol:
//! 1. Ubisoft session (Basic auth with account credentials, yields a ticket)
//! 2. Ticket exchange (yields an access/refresh pair for one audience)
//! 3. Token refresh (trades the refresh token for a new pair)
//!
//! All three are POSTs. 401/403 is classified per endpoint: a rejected
//! login is fatal (`CredentialsRejected`), a rejected ticket is retryable
//! once by the broker (`TicketRejected`), and a failed refresh is always
//! absorbed by falling back to full authentication, so refresh reports
//! every non-success status uniformly as `Http`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::audience::Audience;
use crate::constants::{TOKEN_EXCHANGE_URL, TOKEN_REFRESH_URL, UBI_APP_ID, UBI_SESSIONS_URL};
use crate::error::{Error, Result};

/// The three endpoint URLs the protocol talks to.
///
/// `Default` points at production. Tests substitute local mock servers.
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub session_url: String,
    pub exchange_url: String,
    pub refresh_url: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            session_url: UBI_SESSIONS_URL.into(),
            exchange_url: TOKEN_EXCHANGE_URL.into(),
            refresh_url: TOKEN_REFRESH_URL.into(),
        }
    }
}

/// Access/refresh pair returned by both the exchange and refresh endpoints.
///
/// The wire format uses camelCase keys; they are kept as-is on disk so
/// token files stay interchangeable with other tools reading them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    ticket: String,
}

/// Open a Ubisoft session and return the session ticket.
///
/// Credentials travel as HTTP Basic auth. A 401/403 here means the
/// email/password pair itself is wrong, which no amount of retrying
/// fixes, so it maps to the fatal `CredentialsRejected`.
pub async fn ubisoft_session(
    client: &reqwest::Client,
    endpoints: &AuthEndpoints,
    email: &str,
    password: &str,
) -> Result<String> {
    let basic = STANDARD.encode(format!("{email}:{password}"));
    let response = client
        .post(&endpoints.session_url)
        .header("Authorization", format!("Basic {basic}"))
        .header("Content-Type", "application/json")
        .header("Ubi-AppId", UBI_APP_ID)
        .send()
        .await
        .map_err(|e| Error::Http(format!("ubisoft session request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::CredentialsRejected(format!(
                "ubisoft sessions returned {status}: {body}"
            )));
        }

        return Err(Error::Http(format!(
            "ubisoft sessions returned {status}: {body}"
        )));
    }

    let session = response
        .json::<SessionResponse>()
        .await
        .map_err(|e| Error::InvalidResponse(format!("invalid session response: {e}")))?;

    Ok(session.ticket)
}

/// Exchange a Ubisoft session ticket for tokens scoped to one audience.
///
/// A 401/403 here means the ticket went stale between acquisition and
/// use. The caller can discard it and open a fresh session, so this maps
/// to the retryable `TicketRejected` rather than a credentials failure.
pub async fn exchange_ticket(
    client: &reqwest::Client,
    endpoints: &AuthEndpoints,
    ticket: &str,
    audience: Audience,
) -> Result<TokenPair> {
    let response = client
        .post(&endpoints.exchange_url)
        .header("Authorization", format!("ubi_v1 t={ticket}"))
        .json(&serde_json::json!({ "audience": audience.service_name() }))
        .send()
        .await
        .map_err(|e| Error::Http(format!("ticket exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::TicketRejected(format!(
                "token exchange returned {status}: {body}"
            )));
        }

        return Err(Error::Http(format!(
            "token exchange returned {status}: {body}"
        )));
    }

    response
        .json::<TokenPair>()
        .await
        .map_err(|e| Error::InvalidResponse(format!("invalid token response: {e}")))
}

/// Refresh an expired access token using the stored refresh token.
pub async fn refresh_tokens(
    client: &reqwest::Client,
    endpoints: &AuthEndpoints,
    refresh_token: &str,
) -> Result<TokenPair> {
    let response = client
        .post(&endpoints.refresh_url)
        .header("Authorization", format!("nadeo_v1 t={refresh_token}"))
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        return Err(Error::Http(format!(
            "token refresh returned {status}: {body}"
        )));
    }

    response
        .json::<TokenPair>()
        .await
        .map_err(|e| Error::InvalidResponse(format!("invalid refresh response: {e}")))
}
