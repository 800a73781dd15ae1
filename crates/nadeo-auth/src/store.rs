//! On-disk token records
//!
//! Each audience persists to its own JSON file named after the service
//! (`NadeoLiveServices.json`, `NadeoServices.json`) under the token
//! directory. Files keep the wire's camelCase keys plus a `timestamp`
//! recording when the pair was obtained, so they stay interchangeable
//! with other tools that read the same layout.
//!
//! Loading is lenient: a missing or unreadable file means no stored
//! record, and the broker falls through to full authentication.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::audience::Audience;
use crate::error::{Error, Result};
use crate::wire::TokenPair;

/// A persisted token pair plus the unix second it was obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    /// Unix seconds when the pair was obtained (not an expiry)
    pub timestamp: i64,
}

impl TokenRecord {
    /// Build a record from a freshly obtained pair.
    pub fn from_pair(pair: TokenPair, timestamp: i64) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            timestamp,
        }
    }

    /// Whether the access token is still usable without a refresh.
    pub fn is_fresh(&self, now: i64, max_age: i64) -> bool {
        now - self.timestamp < max_age
    }
}

/// Maps audiences to token files under one directory.
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, audience: Audience) -> PathBuf {
        self.dir.join(format!("{}.json", audience.service_name()))
    }

    /// Load the stored record for an audience, if a readable one exists.
    ///
    /// A missing file is the normal first-run state and loads as `None`
    /// without noise. Anything else unreadable is logged and also treated
    /// as absent, so the caller re-authenticates instead of failing.
    pub async fn load(&self, audience: Audience) -> Option<TokenRecord> {
        let path = self.path(audience);
        match common::read_json(&path).await {
            Ok(record) => Some(record),
            Err(common::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable token file");
                None
            }
        }
    }

    /// Persist a record for an audience, replacing any previous one.
    pub async fn save(&self, audience: Audience, record: &TokenRecord) -> Result<()> {
        let path = self.path(audience);
        common::write_json_atomic(&path, record)
            .await
            .map_err(|e| Error::Store(format!("persisting {}: {e}", path.display())))
    }
}
