use std::time::Duration;

use crate::helpers::*;

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let store = create_test_store().await;
    let feed_url = spawn_feed(Duration::ZERO).await;
    let server = TestServer::new(store, &feed_url).await;

    let resp = server.get("/health").await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let store = create_test_store().await;
    let feed_url = spawn_feed(Duration::ZERO).await;
    let server = TestServer::new(store, &feed_url).await;

    assert_eq!(server.get("/monitors").await.status(), 404);

    server.shutdown().await;
}
