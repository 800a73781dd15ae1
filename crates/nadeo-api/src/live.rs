//! Live services client
//!
//! Wraps `live-services.trackmania.nadeo.live`: weekly-shorts campaign
//! pages, the authenticated account's club, and club-scoped leaderboards.
//! Every request asks the broker for a token first, so callers never see
//! the token lifecycle.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use nadeo_auth::{Audience, TokenBroker};

use crate::error::{Error, Result};
use crate::format;

pub const LIVE_BASE_URL: &str = "https://live-services.trackmania.nadeo.live/api";

/// Leaderboard group for overall personal bests.
pub const PERSONAL_BEST_GROUP: &str = "Personal_Best";

/// One page of the weekly-shorts campaign listing.
#[derive(Debug, Deserialize)]
pub struct CampaignPage {
    #[serde(rename = "campaignList", default)]
    pub campaigns: Vec<CampaignInfo>,
}

#[derive(Debug, Deserialize)]
pub struct CampaignInfo {
    pub name: String,
    #[serde(rename = "startTimestamp", default)]
    pub start: i64,
    #[serde(rename = "endTimestamp", default)]
    pub end: i64,
    #[serde(default)]
    pub playlist: Vec<PlaylistEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistEntry {
    #[serde(rename = "mapUid")]
    pub map_uid: String,
}

#[derive(Debug, Deserialize)]
struct ClubPage {
    #[serde(rename = "clubList", default)]
    clubs: Vec<ClubInfo>,
}

#[derive(Debug, Deserialize)]
struct ClubInfo {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct LeaderboardPage {
    #[serde(default)]
    top: Vec<RecordRow>,
}

/// One leaderboard row. `score` is the run time in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordRow {
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub position: u32,
    pub score: u64,
}

pub struct LiveClient {
    client: reqwest::Client,
    base_url: String,
    broker: Arc<TokenBroker>,
}

impl LiveClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        broker: Arc<TokenBroker>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            broker,
        }
    }

    pub fn production(client: reqwest::Client, broker: Arc<TokenBroker>) -> Self {
        Self::new(client, LIVE_BASE_URL, broker)
    }

    /// Fetch one page of weekly-shorts campaigns.
    pub async fn campaign_page(&self, length: u32, offset: u32) -> Result<CampaignPage> {
        debug!(length, offset, "fetching weekly shorts page");
        let response = self
            .get(&format!("campaign/weekly-shorts?length={length}&offset={offset}"))
            .await?;
        response
            .json::<CampaignPage>()
            .await
            .map_err(|e| Error::InvalidResponse(format!("invalid campaign page: {e}")))
    }

    /// Look up the first club the authenticated account belongs to.
    pub async fn my_club_id(&self) -> Result<Option<(u64, String)>> {
        let response = self.get("token/club/mine?length=1&offset=0").await?;
        let page = response
            .json::<ClubPage>()
            .await
            .map_err(|e| Error::InvalidResponse(format!("invalid club page: {e}")))?;

        Ok(page.clubs.into_iter().next().map(|club| {
            let name = format::clean(&club.name);
            info!(id = club.id, name = %name, "found club");
            (club.id, name)
        }))
    }

    /// Fetch the club-scoped leaderboard of one map for a group.
    pub async fn leaderboard(
        &self,
        map_uid: &str,
        club_id: u64,
        group: &str,
        length: u32,
        offset: u32,
    ) -> Result<Vec<RecordRow>> {
        debug!(map_uid, club_id, group, "fetching leaderboard");
        let path = format!(
            "token/leaderboard/group/{group}/map/{map_uid}/club/{club_id}/top?length={length}&offset={offset}"
        );
        let response = self.get(&path).await?;
        let page = response
            .json::<LeaderboardPage>()
            .await
            .map_err(|e| Error::InvalidResponse(format!("invalid leaderboard page: {e}")))?;
        Ok(page.top)
    }

    /// Personal-best leaderboard, first 100 rows.
    pub async fn personal_best(&self, map_uid: &str, club_id: u64) -> Result<Vec<RecordRow>> {
        self.leaderboard(map_uid, club_id, PERSONAL_BEST_GROUP, 100, 0)
            .await
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let token = self.broker.access_token(Audience::Live).await?;
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("nadeo_v1 t={token}"))
            .header("Accept", "application/json")
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
        Ok(response)
    }
}
