//! Trackmania web API clients
//!
//! Three upstream surfaces, one crate:
//!
//! - Live services: weekly-shorts campaigns, clubs, club leaderboards
//! - Core services: map metadata
//! - trackmania.io: club member names (no Nadeo token, User-Agent only)
//!
//! `campaign` adds the file-backed weekly campaign cache on top of the
//! Live client, and `summary` glues everything into the one-shot weekly
//! club leaderboard summary.

pub mod campaign;
pub mod community;
pub mod core;
pub mod error;
pub mod format;
pub mod live;
pub mod summary;

#[cfg(test)]
mod testutil;

pub use campaign::{CampaignCache, CampaignSnapshot};
pub use community::CommunityClient;
pub use error::{Error, Result};
pub use live::{LiveClient, PERSONAL_BEST_GROUP, RecordRow};
pub use self::core::CoreClient;
pub use summary::{MapBoard, WeeklySummary, weekly_summary};
