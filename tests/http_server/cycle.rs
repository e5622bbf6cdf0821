use std::time::Duration;

use skywatch::test_helpers::SubscriberBuilder;

use crate::helpers::*;

#[tokio::test]
async fn trigger_requires_bearer_token() {
    let store = create_test_store().await;
    let feed_url = spawn_feed(Duration::ZERO).await;
    let server = TestServer::new(store, &feed_url).await;

    let missing = server.post("/cycle").send().await.unwrap();
    assert_eq!(missing.status(), 401);

    let wrong = server.post("/cycle").bearer_auth("nope").send().await.unwrap();
    assert_eq!(wrong.status(), 401);
    let body: serde_json::Value = wrong.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    assert_eq!(server.metrics.metrics.read().await.cycles_run, 0);
    server.shutdown().await;
}

#[tokio::test]
async fn trigger_is_rejected_when_no_key_is_configured() {
    let store = create_test_store().await;
    let feed_url = spawn_feed(Duration::ZERO).await;
    let server = TestServer::with_api_key(store, &feed_url, None).await;

    let resp = server.post("/cycle").bearer_auth(API_KEY).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    server.shutdown().await;
}

#[tokio::test]
async fn trigger_runs_a_cycle_and_returns_the_result() {
    let store = create_test_store().await;
    store.add_subscriber(&SubscriberBuilder::new("warsaw").build()).await.unwrap();
    store
        .add_subscriber(&SubscriberBuilder::new("far").center(40.4168, -3.7038).build())
        .await
        .unwrap();
    let feed_url = spawn_feed(Duration::ZERO).await;
    let server = TestServer::new(store, &feed_url).await;

    let resp = server.trigger_cycle().await;
    assert_eq!(resp.status(), 200);
    let result: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(result["total_subscribers"], 2);
    assert_eq!(result["total_batches"], 2);
    assert_eq!(result["new_planes"], 1);
    assert_eq!(result["cancelled"], false);
    let subscribers = result["subscriber_results"].as_array().unwrap();
    assert_eq!(subscribers[0]["subscriber_id"], "warsaw");
    assert_eq!(subscribers[0]["planes_found"], 1);
    assert_eq!(subscribers[1]["subscriber_id"], "far");
    assert_eq!(subscribers[1]["planes_found"], 0);

    // Same aircraft again inside the expiry window: found, not new.
    let again: serde_json::Value = server.trigger_cycle().await.json().await.unwrap();
    assert_eq!(again["total_planes"], 1);
    assert_eq!(again["new_planes"], 0);

    server.shutdown().await;
}

#[tokio::test]
async fn overlapping_trigger_gets_conflict() {
    let store = create_test_store().await;
    store.add_subscriber(&SubscriberBuilder::new("warsaw").build()).await.unwrap();
    let feed_url = spawn_feed(Duration::from_millis(800)).await;
    let server = TestServer::new(store, &feed_url).await;

    let slow = {
        let request = server.post("/cycle").bearer_auth(API_KEY);
        tokio::spawn(async move { request.send().await.unwrap().status() })
    };

    // Wait until the first cycle is waiting on the feed.
    let mut scanning = false;
    for _ in 0..50 {
        let body: serde_json::Value = server.get("/status").await.json().await.unwrap();
        if body["cycle_state"] == "scanning" {
            assert!(body["tracked_sightings"].is_null());
            scanning = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(scanning, "first cycle never reached the scanning phase");

    let second = server.trigger_cycle().await;
    assert_eq!(second.status(), 409);

    assert_eq!(slow.await.unwrap(), 200);
    let metrics = server.metrics.metrics.read().await.clone();
    assert_eq!(metrics.cycles_run, 1);
    assert_eq!(metrics.cycles_rejected, 1);

    server.shutdown().await;
}

#[tokio::test]
async fn cycle_finishes_after_client_disconnects() {
    let store = create_test_store().await;
    store.add_subscriber(&SubscriberBuilder::new("warsaw").build()).await.unwrap();
    let feed_url = spawn_feed(Duration::from_millis(400)).await;
    let server = TestServer::new(store, &feed_url).await;

    let abandoned = server
        .post("/cycle")
        .bearer_auth(API_KEY)
        .timeout(Duration::from_millis(100))
        .send()
        .await;
    assert!(abandoned.unwrap_err().is_timeout());

    let mut finished = None;
    for _ in 0..100 {
        let body: serde_json::Value = server.get("/status").await.json().await.unwrap();
        if body["cycles_run"] == 1 {
            finished = Some(body);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let body = finished.expect("abandoned cycle never completed");
    assert_eq!(body["cycle_state"], "idle");
    assert_eq!(body["tracked_sightings"], 1);
    assert_eq!(body["last_cycle"]["new_planes"], 1);

    assert_eq!(server.trigger_cycle().await.status(), 200);
    server.shutdown().await;
}
