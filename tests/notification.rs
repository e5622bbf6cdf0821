//! Integration tests for the notification service

use std::{collections::HashMap, sync::Arc, time::Duration};

use mockito::Matcher;
use serde_json::json;
use skywatch::{
    config::HttpRetryConfig,
    http_client::HttpClientPool,
    models::{
        notification::NotificationMessage,
        notifier::{DiscordConfig, NotifierConfig, NotifierTypeConfig, StdoutConfig, WebhookConfig},
    },
    notification::{NotificationService, NotificationSink, error::NotificationError},
    test_helpers::SightingBuilder,
};

fn no_retries() -> HttpRetryConfig {
    HttpRetryConfig {
        max_retries: 0,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
        ..Default::default()
    }
}

fn message() -> NotificationMessage {
    NotificationMessage {
        title: "{{ callsign }} spotted".to_string(),
        body: "{{ icao24 }} is {{ distance_km | round(1) }} km from {{ subscriber_id }}".to_string(),
    }
}

fn service(notifiers: Vec<NotifierConfig>) -> NotificationService {
    NotificationService::new(notifiers, Arc::new(HttpClientPool::new()))
}

#[tokio::test]
async fn test_discord_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::Json(json!({
            "content": "**LOT3AB spotted**\n\n48ae21 is 8.0 km from a@example.com"
        })))
        .with_status(204)
        .create_async()
        .await;

    let notifier = NotifierConfig {
        name: "discord".to_string(),
        config: NotifierTypeConfig::Discord(DiscordConfig {
            url: server.url().parse().unwrap(),
            message: message(),
            retry_policy: no_retries(),
        }),
    };

    let sighting = SightingBuilder::new().callsign("LOT3AB").build();
    let result = service(vec![notifier]).notify(&sighting).await;

    assert!(result.is_ok(), "{result:?}");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_signed_webhook_carries_signature_and_custom_headers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/hook")
        .match_header("x-signature", Matcher::Regex("^[0-9a-f]{64}$".to_string()))
        .match_header("x-timestamp", Matcher::Regex("^[0-9]+$".to_string()))
        .match_header("x-team", "ops")
        .match_body(Matcher::Json(json!({
            "title": "LOT3AB spotted",
            "body": "48ae21 is 8.0 km from a@example.com"
        })))
        .with_status(200)
        .create_async()
        .await;

    let notifier = NotifierConfig {
        name: "ops".to_string(),
        config: NotifierTypeConfig::Webhook(WebhookConfig {
            url: format!("{}/hook", server.url()).parse().unwrap(),
            method: Some("PUT".to_string()),
            secret: Some("shh".to_string()),
            headers: Some(HashMap::from([("X-Team".to_string(), "ops".to_string())])),
            message: message(),
            retry_policy: no_retries(),
        }),
    };

    let sighting = SightingBuilder::new().callsign("LOT3AB").build();
    assert!(service(vec![notifier]).notify(&sighting).await.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_one_failing_channel_reports_partial_delivery() {
    let mut server = mockito::Server::new_async().await;
    let failing = server.mock("POST", "/").with_status(500).create_async().await;

    let notifiers = vec![
        NotifierConfig {
            name: "console".to_string(),
            config: NotifierTypeConfig::Stdout(StdoutConfig { message: Some(message()) }),
        },
        NotifierConfig {
            name: "broken".to_string(),
            config: NotifierTypeConfig::Webhook(WebhookConfig {
                url: server.url().parse().unwrap(),
                method: None,
                secret: None,
                headers: None,
                message: message(),
                retry_policy: no_retries(),
            }),
        },
    ];

    let sighting = SightingBuilder::new().callsign("LOT3AB").build();
    let err = service(notifiers).notify(&sighting).await.unwrap_err();

    match err {
        NotificationError::PartialDelivery { failed, total, errors } => {
            assert_eq!(failed, 1);
            assert_eq!(total, 2);
            assert!(errors[0].starts_with("broken:"), "{errors:?}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    failing.assert_async().await;
}

#[tokio::test]
async fn test_missing_template_variable_fails_under_strict_rendering() {
    let mut server = mockito::Server::new_async().await;
    let never = server.mock("POST", "/").expect(0).create_async().await;

    let notifier = NotifierConfig {
        name: "strict".to_string(),
        config: NotifierTypeConfig::Webhook(WebhookConfig {
            url: server.url().parse().unwrap(),
            method: None,
            secret: None,
            headers: None,
            message: NotificationMessage {
                title: "{{ no_such_field }}".to_string(),
                body: "x".to_string(),
            },
            retry_policy: no_retries(),
        }),
    };

    let result = service(vec![notifier]).notify(&SightingBuilder::new().build()).await;
    assert!(matches!(result, Err(NotificationError::PartialDelivery { failed: 1, .. })));
    never.assert_async().await;
}
