use std::time::Duration;

use skywatch::test_helpers::SubscriberBuilder;

use crate::helpers::*;

#[tokio::test]
async fn status_endpoint_reports_idle_service() {
    let store = create_test_store().await;
    let feed_url = spawn_feed(Duration::ZERO).await;
    let server = TestServer::new(store, &feed_url).await;

    let resp = server.get("/status").await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_secs"].as_u64().is_some());
    assert_eq!(body["cycles_run"], 0);
    assert_eq!(body["cycle_state"], "idle");
    assert_eq!(body["tracked_sightings"], 0);
    assert!(body["last_cycle"].is_null());

    server.shutdown().await;
}

#[tokio::test]
async fn status_reflects_last_cycle() {
    let store = create_test_store().await;
    store.add_subscriber(&SubscriberBuilder::new("warsaw").build()).await.unwrap();
    let feed_url = spawn_feed(Duration::ZERO).await;
    let server = TestServer::new(store, &feed_url).await;

    assert_eq!(server.trigger_cycle().await.status(), 200);

    let body: serde_json::Value = server.get("/status").await.json().await.unwrap();
    assert_eq!(body["cycles_run"], 1);
    assert_eq!(body["notifications_sent"], 1);
    assert_eq!(body["tracked_sightings"], 1);
    assert_eq!(body["last_cycle"]["new_planes"], 1);

    server.shutdown().await;
}
