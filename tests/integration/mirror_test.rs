//! GitHub contents client and publisher against a mock API

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crypto_collector::mirror::{
    GithubConfig, GithubStore, MirrorError, MirrorPublisher, PublishOutcome, RemoteStore,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTENTS_PATH: &str = "/repos/acme/market-data/contents/combined.json";

fn github(server: &MockServer) -> GithubStore {
    let config = GithubConfig {
        api_url: server.uri(),
        repository: "acme/market-data".to_string(),
        branch: "main".to_string(),
        timeout: Duration::from_secs(2),
    };
    GithubStore::new(config, "ghp_test").unwrap()
}

#[tokio::test]
async fn test_current_version_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .and(query_param("ref", "main"))
        .and(header("authorization", "Bearer ghp_test"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let version = github(&server).current_version("combined.json").await.unwrap();
    assert_eq!(version, None);
}

#[tokio::test]
async fn test_current_version_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file",
            "path": "combined.json",
            "sha": "95b966ae1c166bd92f8ae7d1c313e738c731dfc3"
        })))
        .mount(&server)
        .await;

    let version = github(&server).current_version("combined.json").await.unwrap();
    assert_eq!(
        version.as_deref(),
        Some("95b966ae1c166bd92f8ae7d1c313e738c731dfc3")
    );
}

#[tokio::test]
async fn test_current_version_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = github(&server)
        .current_version("combined.json")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MirrorError::Status {
            status: 502,
            body: "bad gateway".to_string()
        }
    );
}

#[tokio::test]
async fn test_publish_creates_missing_file() {
    let server = MockServer::start().await;
    let content = br#"[{"timestamp":"2024-01-15T10:00:00.000000Z"}]"#;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .and(body_partial_json(json!({
            "message": "Initial commit",
            "branch": "main",
            "content": STANDARD.encode(content)
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"content": {"sha": "abc"}})))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = MirrorPublisher::new(github(&server), "combined.json");
    let outcome = publisher.try_publish(content).await.unwrap();

    assert_eq!(
        outcome,
        PublishOutcome::Created {
            locator: "https://raw.githubusercontent.com/acme/market-data/main/combined.json"
                .to_string()
        }
    );
}

#[tokio::test]
async fn test_publish_updates_with_read_sha() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "old-sha"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .and(body_partial_json(json!({"sha": "old-sha", "branch": "main"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": {"sha": "new-sha"}})))
        .expect(1)
        .mount(&server)
        .await;

    let publisher = MirrorPublisher::new(github(&server), "combined.json");
    let outcome = publisher.try_publish(b"[]").await.unwrap();

    assert!(matches!(outcome, PublishOutcome::Updated { .. }));
}

#[tokio::test]
async fn test_stale_sha_is_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "stale"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "combined.json does not match stale"
        })))
        .mount(&server)
        .await;

    let publisher = MirrorPublisher::new(github(&server), "combined.json");

    assert_eq!(
        publisher.try_publish(b"[]").await.unwrap_err(),
        MirrorError::Conflict {
            path: "combined.json".to_string()
        }
    );
    assert_eq!(publisher.publish(b"[]").await, None);
}

#[tokio::test]
async fn test_create_race_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Invalid request.\n\n\"sha\" wasn't supplied."
        })))
        .mount(&server)
        .await;

    let err = github(&server)
        .create("combined.json", b"[]", "Initial commit")
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::Conflict { .. }));
}

#[tokio::test]
async fn test_verify_access() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/market-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"full_name": "acme/market-data"})))
        .mount(&server)
        .await;

    assert!(github(&server).verify_access().await.is_ok());
}

#[tokio::test]
async fn test_verify_access_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/market-data"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .mount(&server)
        .await;

    let err = github(&server).verify_access().await.unwrap_err();
    assert!(matches!(err, MirrorError::Status { status: 401, .. }));
}

#[tokio::test]
async fn test_update_validation_failure_keeps_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .and(body_partial_json(json!({"sha": "abc"})))
        .respond_with(ResponseTemplate::new(422).set_body_string("No commit found for the ref main"))
        .mount(&server)
        .await;

    let err = github(&server)
        .update("combined.json", b"[]", "Update", "abc")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MirrorError::Status {
            status: 422,
            body: "No commit found for the ref main".to_string()
        }
    );
}
