//! Core services client
//!
//! Only one Core endpoint is needed: bulk map-UID to display-name
//! resolution for campaign playlists.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use nadeo_auth::{Audience, TokenBroker};

use crate::error::{Error, Result};
use crate::format;

pub const CORE_BASE_URL: &str = "https://prod.trackmania.core.nadeo.online";

#[derive(Debug, Deserialize)]
struct MapInfo {
    #[serde(rename = "mapUid")]
    map_uid: String,
    name: String,
}

pub struct CoreClient {
    client: reqwest::Client,
    base_url: String,
    broker: Arc<TokenBroker>,
}

impl CoreClient {
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
        Self::new(client, CORE_BASE_URL, broker)
    }

    /// Resolve map UIDs to display names, stripped of format codes.
    ///
    /// Empty input short-circuits to an empty map without a request.
    pub async fn map_names(&self, uids: &[String]) -> Result<BTreeMap<String, String>> {
        if uids.is_empty() {
            return Ok(BTreeMap::new());
        }

        debug!(count = uids.len(), "fetching map names");
        let token = self.broker.access_token(Audience::Core).await?;
        let url = format!(
            "{}/maps/by-uid/?mapUidList={}",
            self.base_url,
            uids.join(",")
        );
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

        let maps = response
            .json::<Vec<MapInfo>>()
            .await
            .map_err(|e| Error::InvalidResponse(format!("invalid map list: {e}")))?;

        Ok(maps
            .into_iter()
            .map(|m| (m.map_uid, format::clean(&m.name)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::extract::RawQuery;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use tokio::sync::Mutex;

    use super::*;
    use crate::testutil::{serve, stub_broker};

    #[tokio::test]
    async fn map_names_joins_uids_and_cleans_names() {
        let seen = Arc::new(Mutex::new((HeaderMap::new(), None::<String>)));
        let seen_handler = seen.clone();
        let app = axum::Router::new().route(
            "/maps/by-uid/",
            get(move |headers: HeaderMap, RawQuery(query): RawQuery| {
                let seen = seen_handler.clone();
                async move {
                    *seen.lock().await = (headers, query);
                    Json(serde_json::json!([
                        { "mapUid": "uid-one", "name": "$f00Hot$z Lap" },
                        { "mapUid": "uid-two", "name": "Plain" },
                    ]))
                }
            }),
        );
        let base = serve(app).await;

        let dir = tempfile::tempdir().unwrap();
        let core = CoreClient::new(reqwest::Client::new(), base, stub_broker(&dir).await);
        let names = core
            .map_names(&["uid-one".into(), "uid-two".into()])
            .await
            .unwrap();

        assert_eq!(names.len(), 2);
        assert_eq!(names["uid-one"], "Hot Lap");
        assert_eq!(names["uid-two"], "Plain");

        let (headers, query) = &*seen.lock().await;
        assert_eq!(
            headers.get("authorization").unwrap(),
            "nadeo_v1 t=tok_NadeoServices"
        );
        assert_eq!(query.as_deref(), Some("mapUidList=uid-one,uid-two"));
    }

    #[tokio::test]
    async fn empty_input_needs_no_network() {
        // Unroutable base: any request would fail loudly
        let dir = tempfile::tempdir().unwrap();
        let core = CoreClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            stub_broker(&dir).await,
        );
        let names = core.map_names(&[]).await.unwrap();
        assert!(names.is_empty());
    }
}
