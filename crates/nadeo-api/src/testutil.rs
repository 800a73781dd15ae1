//! Shared test fixtures: pre-authenticated brokers and ephemeral servers.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use common::Secret;
use nadeo_auth::{Audience, AuthEndpoints, TokenBroker, TokenRecord, TokenStore};

/// Broker backed by pre-seeded fresh records, so no auth traffic happens.
pub(crate) async fn stub_broker(dir: &tempfile::TempDir) -> Arc<TokenBroker> {
    let store = TokenStore::new(dir.path());
    for audience in [Audience::Live, Audience::Core] {
        store
            .save(
                audience,
                &TokenRecord {
                    access_token: format!("tok_{}", audience.service_name()),
                    refresh_token: "rt".into(),
                    timestamp: common::epoch_seconds(),
                },
            )
            .await
            .unwrap();
    }
    Arc::new(TokenBroker::new(
        reqwest::Client::new(),
        AuthEndpoints::default(),
        "user@example.com",
        Secret::new("pw"),
        TokenStore::new(dir.path()),
    ))
}

/// Serve an axum router on an ephemeral local port, returning its base URL.
pub(crate) async fn serve(app: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    format!("http://{addr}")
}
