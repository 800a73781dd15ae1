//! Weekly summary orchestration
//!
//! Resolves the campaign, enriches it with map names, loads club member
//! names, then fans out one leaderboard fetch per map. Enrichment
//! failures degrade (uids instead of names, ids instead of players,
//! empty boards) rather than abort: a partial summary beats none.

use std::collections::{BTreeMap, HashMap};

use futures_util::{StreamExt, stream};
use tracing::{info, warn};

use crate::campaign::CampaignCache;
use crate::community::CommunityClient;
use crate::core::CoreClient;
use crate::live::{LiveClient, PERSONAL_BEST_GROUP, RecordRow};

/// Leaderboard fetches in flight at once.
const LEADERBOARD_CONCURRENCY: usize = 5;

/// Leaderboard rows of one campaign map.
#[derive(Debug)]
pub struct MapBoard {
    pub map_uid: String,
    pub map_name: String,
    pub rows: Vec<RecordRow>,
}

/// Everything the renderer needs for one week.
#[derive(Debug)]
pub struct WeeklySummary {
    pub campaign_name: String,
    pub boards: Vec<MapBoard>,
    pub member_names: HashMap<String, String>,
}

impl WeeklySummary {
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

/// Build the weekly summary for one club.
///
/// `group` selects the leaderboard (usually `Personal_Best`); `offset`
/// selects the week, 1 being the current rotation.
pub async fn weekly_summary(
    cache: &CampaignCache,
    live: &LiveClient,
    core: &CoreClient,
    community: &CommunityClient,
    club_id: u64,
    group: &str,
    offset: u32,
) -> WeeklySummary {
    let campaign = cache.campaign(live, offset).await;
    if campaign.is_empty() {
        warn!(offset, "no campaign available");
        return WeeklySummary {
            campaign_name: String::new(),
            boards: Vec::new(),
            member_names: HashMap::new(),
        };
    }
    info!(name = %campaign.name, maps = campaign.map_uids.len(), "building weekly summary");

    let map_names = if campaign.map_names.is_empty() {
        match core.map_names(&campaign.map_uids).await {
            Ok(names) => {
                cache.set_map_names(&campaign.name, &names).await;
                names
            }
            Err(e) => {
                warn!(error = %e, "map name lookup failed, falling back to uids");
                BTreeMap::new()
            }
        }
    } else {
        campaign.map_names.clone()
    };

    let member_names = match community.club_members(club_id).await {
        Ok(members) => {
            info!(members = members.len(), "loaded club members");
            members
        }
        Err(e) => {
            warn!(error = %e, "member lookup failed, falling back to account ids");
            HashMap::new()
        }
    };

    let boards = stream::iter(campaign.map_uids.iter().cloned())
        .map(|map_uid| {
            let map_name = map_names
                .get(&map_uid)
                .cloned()
                .unwrap_or_else(|| map_uid.clone());
            async move {
                let fetched = if group == PERSONAL_BEST_GROUP {
                    live.personal_best(&map_uid, club_id).await
                } else {
                    live.leaderboard(&map_uid, club_id, group, 100, 0).await
                };
                let rows = match fetched {
                    Ok(rows) => rows,
                    Err(e) => {
                        warn!(map_uid = %map_uid, error = %e, "leaderboard fetch failed");
                        Vec::new()
                    }
                };
                MapBoard {
                    map_uid,
                    map_name,
                    rows,
                }
            }
        })
        .buffered(LEADERBOARD_CONCURRENCY)
        .collect::<Vec<_>>()
        .await;

    WeeklySummary {
        campaign_name: campaign.name,
        boards,
        member_names,
    }
}
