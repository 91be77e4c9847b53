#![cfg(feature = "integration")]
/// Integration tests for the Lytics SDK against the live API.
///
/// These tests require network access and a valid API key in `LIOKEY`.
/// Run with: cargo test --features integration --test integration_tests -- --test-threads=1
use serial_test::serial;
use tokio::sync::OnceCell;

use lytics_sdk::*;

struct SharedSetup {
    client: LyticsClient,
    aid: u64,
}

static SHARED: OnceCell<SharedSetup> = OnceCell::const_new();

async fn shared() -> &'static SharedSetup {
    SHARED
        .get_or_init(|| async {
            let client = LyticsClient::from_env().expect("LIOKEY must be set");
            let accounts = client.api.get_accounts().await.unwrap();
            let aid = accounts.first().expect("key has no accounts").aid;
            SharedSetup { client, aid }
        })
        .await
}

#[tokio::test]
#[serial]
async fn test_accounts() {
    let setup = shared().await;
    let account = setup.client.api.get_account(setup.aid).await.unwrap();
    assert_eq!(account.map(|a| a.aid), Some(setup.aid));
}

#[tokio::test]
#[serial]
async fn test_streams_and_schema() {
    let setup = shared().await;
    let streams = setup.client.api.get_streams().await.unwrap();
    if let Some(name) = streams.first().and_then(|s| s.stream.clone()) {
        let stream = setup.client.get_stream(&name).await.unwrap();
        assert!(stream.is_some());
    }
    let schema = setup.client.api.get_table_schema("user").await.unwrap();
    assert!(schema.is_some());
    assert!(setup
        .client
        .api
        .get_table_schema("no_such_table_for_tests")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[serial]
async fn test_queries() {
    let setup = shared().await;
    let grouped = setup.client.get_queries_grouped_by_table().await.unwrap();
    let total: usize = grouped.values().map(Vec::len).sum();
    assert_eq!(total, setup.client.api.get_queries().await.unwrap().len());

    assert!(setup
        .client
        .api
        .get_query("no_such_query_for_tests")
        .await
        .unwrap()
        .is_none());
    assert!(!setup
        .client
        .api
        .validate_query("SELECT FROM INTO")
        .await
        .unwrap());
}

#[tokio::test]
#[serial]
async fn test_function() {
    let setup = shared().await;
    let value = setup.client.test_function("len", &["abc"]).await.unwrap();
    assert!(value.is_some());
}

#[tokio::test]
#[serial]
async fn test_segments_and_whitelist() {
    let setup = shared().await;
    let segments = setup.client.get_segments_by_kind(None).await.unwrap();
    assert_eq!(
        segments.len(),
        setup.client.api.get_segments(None).await.unwrap().len()
    );
    setup.client.api.get_whitelist_fields(setup.aid).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_missing_entity() {
    let setup = shared().await;
    let entity = setup
        .client
        .api
        .get_entity("user", "email", "nobody-for-tests@example.invalid")
        .await
        .unwrap();
    assert!(entity.is_none());
}
