//! End-to-end loader tests over a real HTTP boundary and a file-backed
//! durable store.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chemdrill_core::model::{PoolType, QuestionRecord};
use chemdrill_loader::{FallbackCatalog, HttpRemoteSource, LoaderConfig, PoolLoader};
use chemdrill_store::{CacheStore, JsonFileStore};

const TTL: Duration = Duration::from_secs(3600);

fn loader_for(server_uri: &str, store_path: &std::path::Path) -> PoolLoader {
    let source = Arc::new(HttpRemoteSource::new(
        server_uri,
        Duration::from_secs(5),
    ));
    let durable = Arc::new(JsonFileStore::open(store_path).unwrap());
    PoolLoader::new(
        source,
        CacheStore::new(durable, TTL),
        FallbackCatalog::bundled(),
        LoaderConfig {
            max_retries: 0,
            retry_delay: Duration::from_millis(10),
        },
    )
}

#[tokio::test]
async fn fetched_pool_survives_a_process_restart() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "records": [
            {"id": "cmp-1", "name": "Water", "formula": "H2O", "family": "oxide"},
            {"id": "cmp-2", "name": "Ammonia", "formula": "NH3"}
        ]
    });
    Mock::given(method("GET"))
        .and(query_param("type", "compounds"))
        .and(query_param("category", "organic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("store.json");

    let loader = loader_for(&server.uri(), &store_path);
    let pool = loader.load("organic", PoolType::Compounds).await.unwrap();
    assert_eq!(pool.len(), 2);
    drop(loader);

    // A new loader over the same store file serves from the durable tier;
    // the mock's expect(1) fails the test if the server is hit again.
    let restarted = loader_for(&server.uri(), &store_path);
    let pool = restarted
        .load("organic", PoolType::Compounds)
        .await
        .unwrap();
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.records()[1].answer, "NH3");
}

#[tokio::test]
async fn html_response_falls_back_to_bundled_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<!DOCTYPE html><html><body>Sign in</body></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let loader = loader_for(&server.uri(), &dir.path().join("store.json"));

    let pool = loader.load("general", PoolType::Reactions).await.unwrap();
    assert!(pool.len() >= 10, "bundled reactions dataset expected");
    assert!(pool.iter().all(|r: &QuestionRecord| !r.answer.is_empty()));
}

#[tokio::test]
async fn unreachable_endpoint_without_fallback_is_data_unavailable() {
    // Nothing listens here; connection fails immediately.
    let source = Arc::new(HttpRemoteSource::new(
        "http://127.0.0.1:1",
        Duration::from_secs(1),
    ));
    let dir = tempfile::tempdir().unwrap();
    let durable = Arc::new(JsonFileStore::open(&dir.path().join("store.json")).unwrap());
    let loader = PoolLoader::new(
        source,
        CacheStore::new(durable, TTL),
        FallbackCatalog::empty(),
        LoaderConfig {
            max_retries: 1,
            retry_delay: Duration::from_millis(10),
        },
    );

    let err = loader.load("organic", PoolType::Compounds).await.unwrap_err();
    assert!(matches!(
        err,
        chemdrill_loader::LoaderError::DataUnavailable { .. }
    ));
}
