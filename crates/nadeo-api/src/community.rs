//! Community API client (trackmania.io)
//!
//! trackmania.io needs no Nadeo token, only an identifying User-Agent,
//! which the shared HTTP client carries. Used to map account ids to club
//! member display names.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const COMMUNITY_BASE_URL: &str = "https://trackmania.io/api";

#[derive(Debug, Deserialize)]
struct MembersPage {
    #[serde(default)]
    members: Vec<MemberEntry>,
}

#[derive(Debug, Deserialize)]
struct MemberEntry {
    player: Player,
}

#[derive(Debug, Deserialize)]
struct Player {
    id: String,
    name: String,
}

pub struct CommunityClient {
    client: reqwest::Client,
    base_url: String,
}

impl CommunityClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn production(client: reqwest::Client) -> Self {
        Self::new(client, COMMUNITY_BASE_URL)
    }

    /// Fetch the first page of club members as account id -> display name.
    pub async fn club_members(&self, club_id: u64) -> Result<HashMap<String, String>> {
        let url = format!("{}/club/{club_id}/members/0", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Status(format!("GET {url} returned {status}: {body}")));
        }

        let page = response
            .json::<MembersPage>()
            .await
            .map_err(|e| Error::InvalidResponse(format!("invalid members page: {e}")))?;

        debug!(club_id, members = page.members.len(), "fetched club members");
        Ok(page
            .members
            .into_iter()
            .map(|m| (m.player.id, m.player.name))
            .collect())
    }
}
