// tests/usage_schedule.rs
use std::sync::Arc;
use std::time::Duration;

use bynder_usage_sync::content::{ContentItem, ContentKind, ContentStatus, InMemoryContentStore};
use bynder_usage_sync::portal::auth::TOKEN_PATH;
use bynder_usage_sync::portal::PortalHttp;
use bynder_usage_sync::settings::InMemorySettingsStore;
use bynder_usage_sync::usage::reporter::USAGE_SYNC_PATH;
use bynder_usage_sync::usage::scheduler::spawn_usage_sync;
use bynder_usage_sync::{PortalSettings, UsageSync};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn configured_settings() -> PortalSettings {
    PortalSettings {
        domain: "portal.test".into(),
        client_id: "cid".into(),
        client_secret: "secret".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn first_tick_syncs_immediately_and_stop_deregisters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "tok"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(USAGE_SYNC_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut content = InMemoryContentStore::default();
    content.push(
        ContentKind::Post,
        ContentStatus::Publish,
        ContentItem::new("u1", "t", r#"<figure data-bynder-id="A1"></figure>"#),
    );
    let settings = configured_settings();
    let http = PortalHttp::new(Duration::from_secs(5))
        .unwrap()
        .with_base_url(server.uri());
    let sync = Arc::new(UsageSync::new(
        Arc::new(InMemorySettingsStore::new(settings)),
        Arc::new(content),
        http,
    ));

    let schedule = spawn_usage_sync(sync, Duration::from_secs(3600));

    let mut waited = 0;
    while server.received_requests().await.unwrap_or_default().len() < 2 && waited < 100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += 1;
    }
    assert!(schedule.is_running());
    schedule.stop().await;
}

fn count(reqs: &[Request], p: &str) -> usize {
    reqs.iter().filter(|r| r.url.path() == p).count()
}

#[tokio::test]
async fn stop_lets_the_run_in_flight_finish_and_no_tick_follows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access_token": "tok"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(USAGE_SYNC_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sync = Arc::new(UsageSync::new(
        Arc::new(InMemorySettingsStore::new(configured_settings())),
        Arc::new(InMemoryContentStore::default()),
        PortalHttp::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri()),
    ));
    let schedule = spawn_usage_sync(sync, Duration::from_millis(200));

    // Stop while the token exchange is still pending.
    let mut waited = 0;
    while server.received_requests().await.unwrap_or_default().is_empty() && waited < 100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += 1;
    }
    tokio::time::timeout(Duration::from_secs(5), schedule.stop())
        .await
        .expect("stop returns once the run completes");

    let reqs = server.received_requests().await.unwrap_or_default();
    assert_eq!(count(&reqs, TOKEN_PATH), 1);
    assert_eq!(count(&reqs, USAGE_SYNC_PATH), 1, "in-flight run reported");

    tokio::time::sleep(Duration::from_millis(500)).await;
    let reqs = server.received_requests().await.unwrap_or_default();
    assert_eq!(count(&reqs, TOKEN_PATH), 1, "no tick after stop");
}
