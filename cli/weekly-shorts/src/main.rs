//! Weekly shorts leaderboard CLI
//!
//! One run does four things:
//! 1. loads config and builds the shared HTTP client
//! 2. authenticates against Ubisoft/Nadeo, reusing tokens cached on disk
//! 3. resolves the campaign week and the club roster
//! 4. prints one leaderboard table per map

mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use nadeo_api::{CampaignCache, CommunityClient, CoreClient, LiveClient, PERSONAL_BEST_GROUP};
use nadeo_auth::{Audience, AuthEndpoints, TokenBroker, TokenStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

/// Club leaderboards for the Trackmania weekly shorts
#[derive(Debug, Parser)]
#[command(name = "weekly-shorts", version, about)]
struct Args {
    /// Path to the TOML config file
    #[arg(long, env = "WEEKLY_SHORTS_CONFIG", default_value = "weekly-shorts.toml")]
    config: PathBuf,

    /// Club id (overrides club.id from the config)
    #[arg(long)]
    club: Option<u64>,

    /// Campaign rotation: 1 is the week currently running, 2 the week before
    #[arg(long, default_value_t = 1)]
    offset: u32,

    /// Leaderboard group to query
    #[arg(long, default_value = PERSONAL_BEST_GROUP)]
    group: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;
    let password = config
        .identity
        .password
        .take()
        .context("no password configured")?;

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent())
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let broker = Arc::new(TokenBroker::new(
        client.clone(),
        AuthEndpoints::default(),
        config.identity.email.clone(),
        password,
        TokenStore::new(config.token_dir()),
    ));
    let live = LiveClient::production(client.clone(), broker.clone());
    let core = CoreClient::production(client.clone(), broker.clone());
    let community = CommunityClient::production(client);
    let cache = CampaignCache::new(config.cache_file());

    // Warm the Live token up front. Rejected credentials abort the run;
    // transient failures are left to the per-section fallbacks, which can
    // still serve cached data.
    if let Err(e) = broker.access_token(Audience::Live).await {
        match e {
            nadeo_auth::Error::CredentialsRejected(_) | nadeo_auth::Error::TicketRejected(_) => {
                return Err(e).context("authentication failed");
            }
            _ => warn!(error = %e, "authentication incomplete, relying on cached data"),
        }
    }

    let club_id = match args.club.or(config.club.id) {
        Some(id) => id,
        None => {
            info!("no club configured, using the account's first club");
            match club_id_from_lookup(live.my_club_id().await) {
                Some(id) => id,
                None => return Ok(()),
            }
        }
    };

    let summary = nadeo_api::weekly_summary(
        &cache,
        &live,
        &core,
        &community,
        club_id,
        &args.group,
        args.offset,
    )
    .await;
    if summary.is_empty() {
        warn!(offset = args.offset, "nothing to show: no campaign data available");
        return Ok(());
    }

    print!("{}", output::render(&summary));
    Ok(())
}

/// First club from a roster lookup. A failed lookup and a clubless
/// account both resolve to `None`: there is nothing to report on, which
/// is not an error.
fn club_id_from_lookup(lookup: nadeo_api::Result<Option<(u64, String)>>) -> Option<u64> {
    match lookup {
        Ok(Some((id, _name))) => Some(id),
        Ok(None) => {
            warn!("account is not in any club, nothing to report; set club.id or --club");
            None
        }
        Err(e) => {
            warn!(error = %e, "club lookup failed, nothing to report");
            None
        }
    }
}
