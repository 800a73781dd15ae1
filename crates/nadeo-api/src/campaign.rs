//! Weekly-shorts campaign cache
//!
//! Campaigns are weekly, so one snapshot per week is enough. Snapshots
//! live in a single JSON file, newest first. A lookup resolves the
//! reference time `now - offset * WEEK_SECS` against the cached windows
//! and only goes to the wire on a miss.
//!
//! The cache degrades instead of failing: a missing or corrupt file is
//! an empty cache, and a failed fetch falls back to the newest cached
//! entry, or to an empty sentinel snapshot when there is none. A week
//! the server lists no campaign for resolves to the sentinel directly,
//! never to stale cache.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::Result;
use crate::format;
use crate::live::LiveClient;

const WEEK_SECS: i64 = 7 * 24 * 60 * 60;

/// Second of the weekly reset inside an epoch-aligned week. Weekly shorts
/// roll over Monday 03:00 UTC+9, i.e. Sunday 18:00 UTC; the unix epoch
/// fell on a Thursday, so that instant sits three days and eighteen hours
/// into each week.
const RESET_IN_WEEK: i64 = 3 * 86_400 + 18 * 3_600;

/// One cached campaign: its validity window, cleaned display name, the
/// playlist map UIDs, and (once resolved) their display names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub start: i64,
    pub end: i64,
    pub name: String,
    pub map_uids: Vec<String>,
    #[serde(default)]
    pub map_names: BTreeMap<String, String>,
}

impl CampaignSnapshot {
    /// Sentinel for "no campaign available".
    pub fn empty() -> Self {
        Self {
            start: 0,
            end: 0,
            name: String::new(),
            map_uids: Vec::new(),
            map_names: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.map_uids.is_empty()
    }

    /// Whether `instant` falls inside the half-open window `[start, end)`.
    pub fn covers(&self, instant: i64) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// File-backed campaign store. The Mutex serializes the whole
/// lookup/fetch/persist sequence so concurrent callers cannot race the
/// file or fetch the same week twice.
pub struct CampaignCache {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CampaignCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Resolve the campaign covering `now - offset * WEEK_SECS`.
    ///
    /// Offset 1 is the campaign of the current rotation, 2 the week
    /// before, and so on. Never fails: transport errors degrade to the
    /// newest cached entry, or to `CampaignSnapshot::empty()` when the
    /// cache has nothing either. A week with no published campaign is
    /// the empty snapshot outright.
    pub async fn campaign(&self, live: &LiveClient, offset: u32) -> CampaignSnapshot {
        let _guard = self.lock.lock().await;
        let now = common::epoch_seconds();
        let reference = now - i64::from(offset) * WEEK_SECS;

        let mut entries = self.load_entries().await;
        if let Some(entry) = entries.iter().find(|e| e.covers(reference)) {
            info!(name = %entry.name, "campaign served from cache");
            return entry.clone();
        }

        info!(offset, "fetching weekly shorts campaign");
        match self.fetch_snapshot(live, offset, now).await {
            Ok(Some(snapshot)) => {
                self.replace_entry(&mut entries, snapshot.clone()).await;
                snapshot
            }
            Ok(None) => {
                warn!(offset, "no campaign published for this week");
                CampaignSnapshot::empty()
            }
            Err(e) => {
                warn!(error = %e, "campaign fetch failed, serving cached data");
                entries
                    .into_iter()
                    .next()
                    .unwrap_or_else(CampaignSnapshot::empty)
            }
        }
    }

    /// Attach resolved map names to the cached entry named `campaign_name`.
    pub async fn set_map_names(&self, campaign_name: &str, names: &BTreeMap<String, String>) {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_entries().await;
        match entries.iter_mut().find(|e| e.name == campaign_name) {
            Some(entry) => {
                entry.map_names = names.clone();
                if let Err(e) = common::write_json_atomic(&self.path, &entries).await {
                    warn!(path = %self.path.display(), error = %e, "failed to persist campaign cache");
                }
            }
            None => warn!(campaign_name, "campaign not in cache, map names not persisted"),
        }
    }

    /// Read all cached entries, newest first. A missing or unreadable
    /// file is an empty cache.
    async fn load_entries(&self) -> Vec<CampaignSnapshot> {
        let mut entries: Vec<CampaignSnapshot> = match common::read_json(&self.path).await {
            Ok(entries) => entries,
            Err(common::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable campaign cache");
                Vec::new()
            }
        };
        entries.sort_by(|a, b| b.start.cmp(&a.start));
        entries
    }

    /// `Ok(None)` means the server answered but lists no campaign at this
    /// offset; `Err` is reserved for transport and malformed-body failures.
    async fn fetch_snapshot(
        &self,
        live: &LiveClient,
        offset: u32,
        now: i64,
    ) -> Result<Option<CampaignSnapshot>> {
        let page = live.campaign_page(1, offset).await?;
        let campaign = match page.campaigns.into_iter().next() {
            Some(campaign) => campaign,
            None => return Ok(None),
        };

        // Prefer the server-provided window; recompute locally only when
        // the response omits or mangles it.
        let (start, end) = if campaign.end > campaign.start && campaign.start > 0 {
            (campaign.start, campaign.end)
        } else {
            (now, next_weekly_reset(now))
        };

        Ok(Some(CampaignSnapshot {
            start,
            end,
            name: format::clean(&campaign.name),
            map_uids: campaign.playlist.into_iter().map(|m| m.map_uid).collect(),
            map_names: BTreeMap::new(),
        }))
    }

    /// Insert `snapshot`, dropping any previous entry with the same name,
    /// and persist the set newest-first. Persist failures are logged, not
    /// fatal: the caller still gets its snapshot.
    async fn replace_entry(&self, entries: &mut Vec<CampaignSnapshot>, snapshot: CampaignSnapshot) {
        entries.retain(|e| e.name != snapshot.name);
        entries.push(snapshot);
        entries.sort_by(|a, b| b.start.cmp(&a.start));
        if let Err(e) = common::write_json_atomic(&self.path, entries).await {
            warn!(path = %self.path.display(), error = %e, "failed to persist campaign cache");
        }
    }
}

/// Next weekly reset strictly after `now`.
fn next_weekly_reset(now: i64) -> i64 {
    let week_start = now.div_euclid(WEEK_SECS) * WEEK_SECS;
    let reset = week_start + RESET_IN_WEEK;
    if reset > now { reset } else { reset + WEEK_SECS }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use axum::Json;
    use axum::http::StatusCode;
    use axum::routing::get;

    use super::*;
    use crate::testutil::{serve, stub_broker};

    fn snapshot(name: &str, start: i64, end: i64) -> CampaignSnapshot {
        CampaignSnapshot {
            start,
            end,
            name: name.into(),
            map_uids: vec!["uid-one".into()],
            map_names: BTreeMap::new(),
        }
    }

    fn campaign_json(name: &str, start: i64, end: i64) -> serde_json::Value {
        serde_json::json!({
            "campaignList": [{
                "name": name,
                "startTimestamp": start,
                "endTimestamp": end,
                "playlist": [ { "mapUid": "uid-one" }, { "mapUid": "uid-two" } ],
            }],
        })
    }

    /// Campaign endpoint that always answers `status`/`body`, counting calls.
    async fn mock_campaigns(body: serde_json::Value, status: StatusCode) -> (String, Arc<AtomicU64>) {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let app = axum::Router::new().route(
            "/campaign/weekly-shorts",
            get(move || {
                let counter = counter.clone();
                let body = body.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, Json(body))
                }
            }),
        );
        (serve(app).await, calls)
    }

    async fn seed(path: &Path, entries: &[CampaignSnapshot]) {
        common::write_json_atomic(path, &entries).await.unwrap();
    }

    async fn read_entries(path: &Path) -> Vec<CampaignSnapshot> {
        common::read_json(path).await.unwrap()
    }

    #[test]
    fn window_is_half_open() {
        let snapshot = snapshot("w", 100, 200);
        assert!(snapshot.covers(100));
        assert!(snapshot.covers(199));
        assert!(!snapshot.covers(200));
        assert!(!snapshot.covers(99));
    }

    #[test]
    fn weekly_reset_is_monday_three_am_jst() {
        use chrono::{Datelike, FixedOffset, TimeZone, Timelike, Utc, Weekday};

        let now = 1_755_000_000;
        let reset = next_weekly_reset(now);
        assert!(reset > now);
        assert!(reset - now <= WEEK_SECS);

        let utc = Utc.timestamp_opt(reset, 0).unwrap();
        assert_eq!(utc.weekday(), Weekday::Sun);
        assert_eq!(utc.hour(), 18);

        let jst = utc.with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap());
        assert_eq!(jst.weekday(), Weekday::Mon);
        assert_eq!(jst.hour(), 3);
        assert_eq!(jst.minute(), 0);
    }

    #[test]
    fn weekly_reset_is_strictly_after_now() {
        let now = 1_755_000_000;
        let reset = next_weekly_reset(now);
        // At the reset instant itself the next one is a week out
        assert_eq!(next_weekly_reset(reset), reset + WEEK_SECS);
        assert_eq!(next_weekly_reset(reset - 1), reset);
    }

    #[tokio::test]
    async fn covering_entry_is_served_without_network() {
        let now = common::epoch_seconds();
        let (base, calls) =
            mock_campaigns(campaign_json("From Server", 0, 0), StatusCode::OK).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly_shorts.json");
        // Window generous enough to cover the reference a week back
        seed(&path, &[snapshot("Cached Week", now - 2 * WEEK_SECS, now + WEEK_SECS)]).await;

        let live = LiveClient::new(reqwest::Client::new(), base, stub_broker(&dir).await);
        let cache = CampaignCache::new(&path);
        let result = cache.campaign(&live, 1).await;

        assert_eq!(result.name, "Cached Week");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_entry_triggers_a_fetch() {
        let now = common::epoch_seconds();
        let (base, calls) = mock_campaigns(
            campaign_json("$oFresh$z Week", now - 2 * WEEK_SECS, now + WEEK_SECS),
            StatusCode::OK,
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly_shorts.json");
        // Ends exactly at the reference: half-open, so it does not cover
        seed(&path, &[snapshot("Old Week", now - 3 * WEEK_SECS, now - WEEK_SECS)]).await;

        let live = LiveClient::new(reqwest::Client::new(), base, stub_broker(&dir).await);
        let cache = CampaignCache::new(&path);
        let result = cache.campaign(&live, 1).await;

        assert_eq!(result.name, "Fresh Week");
        assert_eq!(result.map_uids, vec!["uid-one", "uid-two"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Both weeks persisted, newest first
        let entries = read_entries(&path).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Fresh Week");
        assert_eq!(entries[1].name, "Old Week");
    }

    #[tokio::test]
    async fn refetch_replaces_entry_with_same_name() {
        let now = common::epoch_seconds();
        let (base, _calls) = mock_campaigns(
            campaign_json("Week 33", now - 2 * WEEK_SECS, now + WEEK_SECS),
            StatusCode::OK,
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly_shorts.json");
        seed(
            &path,
            &[
                snapshot("Week 33", now - 30 * WEEK_SECS, now - 29 * WEEK_SECS),
                snapshot("Week 20", now - 40 * WEEK_SECS, now - 39 * WEEK_SECS),
            ],
        )
        .await;

        let live = LiveClient::new(reqwest::Client::new(), base, stub_broker(&dir).await);
        let cache = CampaignCache::new(&path);
        let result = cache.campaign(&live, 1).await;
        assert_eq!(result.name, "Week 33");

        // Same entry count: the stale "Week 33" was replaced, not duplicated
        let entries = read_entries(&path).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Week 33");
        assert_eq!(entries[0].start, now - 2 * WEEK_SECS);
        assert_eq!(entries[1].name, "Week 20");
    }

    #[tokio::test]
    async fn corrupt_cache_is_refetched_and_rewritten() {
        let now = common::epoch_seconds();
        let (base, calls) = mock_campaigns(
            campaign_json("Recovered Week", now - WEEK_SECS - 10, now + WEEK_SECS),
            StatusCode::OK,
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly_shorts.json");
        tokio::fs::write(&path, "{definitely not json").await.unwrap();

        let live = LiveClient::new(reqwest::Client::new(), base, stub_broker(&dir).await);
        let cache = CampaignCache::new(&path);
        let result = cache.campaign(&live, 1).await;

        assert_eq!(result.name, "Recovered Week");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The file is valid again with exactly the fetched entry
        let entries = read_entries(&path).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Recovered Week");
    }

    #[tokio::test]
    async fn fetch_failure_serves_newest_cached_entry() {
        let now = common::epoch_seconds();
        let (base, calls) =
            mock_campaigns(serde_json::json!({}), StatusCode::INTERNAL_SERVER_ERROR).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly_shorts.json");
        seed(
            &path,
            &[
                snapshot("Older", now - 10 * WEEK_SECS, now - 9 * WEEK_SECS),
                snapshot("Newer", now - 5 * WEEK_SECS, now - 4 * WEEK_SECS),
            ],
        )
        .await;

        let live = LiveClient::new(reqwest::Client::new(), base, stub_broker(&dir).await);
        let cache = CampaignCache::new(&path);
        let result = cache.campaign(&live, 1).await;

        assert_eq!(result.name, "Newer");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_failure_with_empty_cache_is_the_sentinel() {
        let (base, _calls) =
            mock_campaigns(serde_json::json!({}), StatusCode::INTERNAL_SERVER_ERROR).await;

        let dir = tempfile::tempdir().unwrap();
        let live = LiveClient::new(reqwest::Client::new(), base, stub_broker(&dir).await);
        let cache = CampaignCache::new(dir.path().join("weekly_shorts.json"));
        let result = cache.campaign(&live, 1).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn empty_campaign_list_is_not_a_campaign() {
        let (base, _calls) =
            mock_campaigns(serde_json::json!({ "campaignList": [] }), StatusCode::OK).await;

        let dir = tempfile::tempdir().unwrap();
        let live = LiveClient::new(reqwest::Client::new(), base, stub_broker(&dir).await);
        let cache = CampaignCache::new(dir.path().join("weekly_shorts.json"));
        let result = cache.campaign(&live, 1).await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn empty_campaign_list_skips_the_cache_fallback() {
        let now = common::epoch_seconds();
        let (base, calls) =
            mock_campaigns(serde_json::json!({ "campaignList": [] }), StatusCode::OK).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly_shorts.json");
        // Only the running week is cached; the requested one is long gone
        seed(&path, &[snapshot("Current Week", now - WEEK_SECS, now + WEEK_SECS)]).await;

        let live = LiveClient::new(reqwest::Client::new(), base, stub_broker(&dir).await);
        let cache = CampaignCache::new(&path);
        let result = cache.campaign(&live, 200).await;

        // The missing week comes back empty, not as the newest cached entry
        assert!(result.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_window_falls_back_to_weekly_reset() {
        let (base, _calls) = mock_campaigns(
            serde_json::json!({
                "campaignList": [{
                    "name": "No Window",
                    "playlist": [ { "mapUid": "uid-one" } ],
                }],
            }),
            StatusCode::OK,
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let live = LiveClient::new(reqwest::Client::new(), base, stub_broker(&dir).await);
        let cache = CampaignCache::new(dir.path().join("weekly_shorts.json"));
        let result = cache.campaign(&live, 0).await;

        assert_eq!(result.name, "No Window");
        assert!(result.start > 0);
        assert_eq!(result.end, next_weekly_reset(result.start));
    }

    #[tokio::test]
    async fn set_map_names_updates_the_named_entry() {
        let now = common::epoch_seconds();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weekly_shorts.json");
        seed(
            &path,
            &[
                snapshot("Week 33", now - WEEK_SECS, now + WEEK_SECS),
                snapshot("Week 32", now - 2 * WEEK_SECS, now - WEEK_SECS),
            ],
        )
        .await;

        let names = BTreeMap::from([("uid-one".to_string(), "Hot Lap".to_string())]);
        let cache = CampaignCache::new(&path);
        cache.set_map_names("Week 33", &names).await;

        let entries = read_entries(&path).await;
        let updated = entries.iter().find(|e| e.name == "Week 33").unwrap();
        assert_eq!(updated.map_names, names);
        let untouched = entries.iter().find(|e| e.name == "Week 32").unwrap();
        assert!(untouched.map_names.is_empty());

        // Unknown campaign: no panic, file unchanged
        cache.set_map_names("Week 99", &names).await;
        assert_eq!(read_entries(&path).await.len(), 2);
    }
}
