//! Token acquisition and lifecycle
//!
//! `TokenBroker` hands out access tokens per audience, doing the least
//! work that yields a usable token:
//!
//! 1. A stored token younger than `TOKEN_MAX_AGE_SECS` is returned as-is,
//!    with no network traffic.
//! 2. A stale token is refreshed against the refresh endpoint. Any
//!    refresh failure falls through to step 3; it is never fatal.
//! 3. Full authentication: open a Ubisoft session for a ticket, then
//!    exchange the ticket for the audience. The ticket is cached and
//!    reused across audiences; when the exchange rejects it as stale it
//!    is discarded and the session reopened once before giving up.
//!
//! One tokio Mutex guards the whole load/decide/persist sequence, so
//! concurrent callers for the same audience trigger at most one wire
//! round-trip.

use std::collections::HashMap;

use common::Secret;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::audience::Audience;
use crate::constants::TOKEN_MAX_AGE_SECS;
use crate::error::{Error, Result};
use crate::store::{TokenRecord, TokenStore};
use crate::wire::{self, AuthEndpoints, TokenPair};

/// Exchange attempts per acquisition: the first try plus one retry
/// after a rejected ticket.
const MAX_EXCHANGE_ATTEMPTS: u32 = 2;

struct BrokerState {
    /// Ubisoft session ticket, reused across audiences until rejected
    ticket: Option<String>,
    /// Records already loaded from or written to the store
    records: HashMap<Audience, TokenRecord>,
}

/// Issues access tokens, hiding refresh and re-authentication from callers.
pub struct TokenBroker {
    client: reqwest::Client,
    endpoints: AuthEndpoints,
    email: String,
    password: Secret,
    store: TokenStore,
    state: Mutex<BrokerState>,
}

impl TokenBroker {
    pub fn new(
        client: reqwest::Client,
        endpoints: AuthEndpoints,
        email: impl Into<String>,
        password: Secret,
        store: TokenStore,
    ) -> Self {
        Self {
            client,
            endpoints,
            email: email.into(),
            password,
            store,
            state: Mutex::new(BrokerState {
                ticket: None,
                records: HashMap::new(),
            }),
        }
    }

    /// Return a usable access token for the audience.
    ///
    /// Fatal errors are a rejected login (`CredentialsRejected`) and a
    /// ticket rejected twice in a row (`TicketRejected`); everything else
    /// is absorbed by the fallback ladder where possible.
    pub async fn access_token(&self, audience: Audience) -> Result<String> {
        let mut state = self.state.lock().await;

        if !state.records.contains_key(&audience) {
            if let Some(record) = self.store.load(audience).await {
                state.records.insert(audience, record);
            }
        }

        let now = common::epoch_seconds();
        if let Some(record) = state.records.get(&audience) {
            if record.is_fresh(now, TOKEN_MAX_AGE_SECS) {
                debug!(%audience, "stored token still fresh");
                return Ok(record.access_token.clone());
            }
        }

        // Stale record: try the refresh endpoint before re-authenticating.
        if let Some(refresh_token) = state
            .records
            .get(&audience)
            .map(|r| r.refresh_token.clone())
        {
            match wire::refresh_tokens(&self.client, &self.endpoints, &refresh_token).await {
                Ok(pair) => {
                    info!(%audience, "token refreshed");
                    return self.store_pair(&mut state, audience, pair).await;
                }
                Err(e) => {
                    warn!(%audience, error = %e, "refresh failed, falling back to full authentication");
                }
            }
        }

        let mut attempts = 0;
        loop {
            let ticket = match state.ticket.clone() {
                Some(ticket) => ticket,
                None => {
                    let ticket = wire::ubisoft_session(
                        &self.client,
                        &self.endpoints,
                        &self.email,
                        self.password.expose(),
                    )
                    .await?;
                    info!("opened ubisoft session");
                    state.ticket = Some(ticket.clone());
                    ticket
                }
            };

            attempts += 1;
            match wire::exchange_ticket(&self.client, &self.endpoints, &ticket, audience).await {
                Ok(pair) => {
                    info!(%audience, "authenticated");
                    return self.store_pair(&mut state, audience, pair).await;
                }
                Err(Error::TicketRejected(msg)) if attempts < MAX_EXCHANGE_ATTEMPTS => {
                    // Ticket went stale between session and exchange;
                    // drop it so the next iteration opens a new session.
                    warn!(%audience, error = %msg, "session ticket rejected, reopening session");
                    state.ticket = None;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Persist a new pair and record it in memory, returning the access token.
    async fn store_pair(
        &self,
        state: &mut BrokerState,
        audience: Audience,
        pair: TokenPair,
    ) -> Result<String> {
        let record = TokenRecord::from_pair(pair, common::epoch_seconds());
        self.store.save(audience, &record).await?;
        let access = record.access_token.clone();
        state.records.insert(audience, record);
        Ok(access)
    }
}
