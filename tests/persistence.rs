//! Integration tests for the SQLite subscriber store.

use skywatch::{
    models::SubscriberGeofence,
    persistence::{SqliteSubscriberStore, error::PersistenceError, traits::SubscriberStore},
    test_helpers::SubscriberBuilder,
};

async fn setup_db() -> SqliteSubscriberStore {
    let store = SqliteSubscriberStore::new("sqlite::memory:")
        .await
        .expect("Failed to set up in-memory database");
    store.run_migrations().await.expect("Failed to run migrations");
    store
}

#[tokio::test]
async fn active_subscribers_come_back_in_insertion_order() {
    let store = setup_db().await;
    for id in ["charlie", "alpha", "bravo"] {
        store.add_subscriber(&SubscriberBuilder::new(id).build()).await.unwrap();
    }

    let ids: Vec<String> =
        store.list_active_subscribers().await.unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["charlie", "alpha", "bravo"]);
}

#[tokio::test]
async fn upsert_updates_geofence_and_keeps_position() {
    let store = setup_db().await;
    store.add_subscriber(&SubscriberBuilder::new("first").build()).await.unwrap();
    store.add_subscriber(&SubscriberBuilder::new("second").build()).await.unwrap();

    let moved = SubscriberGeofence::new("first", 50.0647, 19.9450, 25.0);
    store.add_subscriber(&moved).await.unwrap();

    let all = store.list_active_subscribers().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], moved);
    assert_eq!(all[1].id, "second");
}

#[tokio::test]
async fn paused_subscribers_are_not_listed_as_active() {
    let store = setup_db().await;
    store.add_subscriber(&SubscriberBuilder::new("paused").build()).await.unwrap();
    store.add_subscriber(&SubscriberBuilder::new("active").build()).await.unwrap();

    store.set_active("paused", false).await.unwrap();

    let active = store.list_active_subscribers().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "active");
    assert_eq!(store.list_subscribers().await.unwrap().len(), 2);
    assert!(store.get_subscriber("paused").await.unwrap().is_some());
}

#[tokio::test]
async fn invalid_geofences_are_rejected_on_write() {
    let store = setup_db().await;

    for bad in [
        SubscriberGeofence::new("lat", 91.0, 0.0, 10.0),
        SubscriberGeofence::new("lon", 0.0, -181.0, 10.0),
        SubscriberGeofence::new("radius", 0.0, 0.0, -1.0),
        SubscriberGeofence::new("wide", 0.0, 0.0, 100.5),
        SubscriberGeofence::new("nan", f64::NAN, 0.0, 10.0),
    ] {
        let result = store.add_subscriber(&bad).await;
        assert!(
            matches!(result, Err(PersistenceError::InvalidInput(_))),
            "{} should have been rejected",
            bad.id
        );
    }
    assert!(store.list_subscribers().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_ids_report_not_found() {
    let store = setup_db().await;

    assert!(matches!(store.remove_subscriber("ghost").await, Err(PersistenceError::NotFound(_))));
    assert!(matches!(store.set_active("ghost", true).await, Err(PersistenceError::NotFound(_))));
    assert!(store.get_subscriber("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("subscribers.db").display());

    let store = SqliteSubscriberStore::new(&url).await.unwrap();
    store.run_migrations().await.unwrap();
    store.add_subscriber(&SubscriberBuilder::new("persistent").build()).await.unwrap();
    store.close().await;

    let reopened = SqliteSubscriberStore::new(&url).await.unwrap();
    reopened.run_migrations().await.unwrap();
    let all = reopened.list_active_subscribers().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "persistent");
}

#[tokio::test]
async fn queries_fail_without_migrations() {
    let store = SqliteSubscriberStore::new("sqlite::memory:").await.unwrap();
    let result = store.list_active_subscribers().await;
    assert!(matches!(result, Err(PersistenceError::OperationFailed(_))));
}
