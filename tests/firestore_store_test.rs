//! Firestore REST store against a `wiremock` server

use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use liftlog::config::{FirebaseConfig, StoreConfig};
use liftlog::models::{CREATED_AT_FIELD, NAME_FIELD};
use liftlog::store::{DocumentStore, FieldValue, Fields, FirestoreStore};

const DOCUMENTS: &str = "/v1/projects/demo/databases/(default)/documents";

fn make_store(server: &MockServer) -> FirestoreStore {
    let store_config = StoreConfig {
        api_base: format!("{}/v1", server.uri()),
        poll_interval_ms: 20,
        request_timeout_seconds: 5,
        ..Default::default()
    };
    let firebase = FirebaseConfig {
        api_key: "test-key".to_string(),
        project_id: "demo".to_string(),
        ..Default::default()
    };
    FirestoreStore::new(&store_config, &firebase).expect("store")
}

fn rest_doc(id: &str, name: &str, created_at: &str) -> Value {
    json!({
        "name": format!("projects/demo/databases/(default)/documents/exercises/{}", id),
        "fields": {
            "name": {"stringValue": name},
            "createdAt": {"timestampValue": created_at}
        },
        "createTime": created_at,
        "updateTime": created_at
    })
}

/// Next successful snapshot, skipping errors from polls that raced a mock swap
async fn next_snapshot(stream: &mut liftlog::store::SnapshotStream) -> liftlog::store::Snapshot {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match stream.next().await {
                Some(Ok(snapshot)) => return snapshot,
                Some(Err(_)) => continue,
                None => panic!("stream ended"),
            }
        }
    })
    .await
    .expect("timed out waiting for snapshot")
}

#[tokio::test]
async fn test_list_parses_documents_and_sends_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/exercises", DOCUMENTS)))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                rest_doc("a1", "Push-ups", "2024-02-18T09:00:00Z"),
                rest_doc("b2", "Squats", "2024-02-17T09:00:00.5Z"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = make_store(&server).list("exercises").await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.documents[0].id, "a1");
    assert_eq!(
        snapshot.documents[1].get(NAME_FIELD).and_then(FieldValue::as_str),
        Some("Squats")
    );
    assert!(snapshot.documents[1]
        .get(CREATED_AT_FIELD)
        .and_then(FieldValue::as_timestamp)
        .is_some());
}

#[tokio::test]
async fn test_list_empty_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/exercises", DOCUMENTS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(make_store(&server).list("exercises").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_follows_page_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/exercises", DOCUMENTS)))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [rest_doc("b2", "Squats", "2024-02-17T09:00:00Z")]
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/exercises", DOCUMENTS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [rest_doc("a1", "Push-ups", "2024-02-18T09:00:00Z")],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    let snapshot = make_store(&server).list("exercises").await.unwrap();
    let ids: Vec<&str> = snapshot.documents.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "b2"]);
}

#[tokio::test]
async fn test_create_commits_with_request_time_transform() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}:commit", DOCUMENTS)))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "writeResults": [{"updateTime": "2024-02-18T09:00:00Z"}],
            "commitTime": "2024-02-18T09:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = Fields::new();
    fields.insert(NAME_FIELD.to_string(), FieldValue::String("Push-ups".into()));
    fields.insert(CREATED_AT_FIELD.to_string(), FieldValue::ServerTimestamp);
    let id = make_store(&server).create("exercises", fields).await.unwrap();
    assert_eq!(id.len(), 20);

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let write = &body["writes"][0];
    assert_eq!(
        write["update"]["name"],
        format!("projects/demo/databases/(default)/documents/exercises/{}", id)
    );
    assert_eq!(write["update"]["fields"]["name"]["stringValue"], "Push-ups");
    assert!(write["update"]["fields"].get("createdAt").is_none());
    assert_eq!(write["currentDocument"]["exists"], false);
    assert_eq!(write["updateTransforms"][0]["fieldPath"], "createdAt");
    assert_eq!(
        write["updateTransforms"][0]["setToServerValue"],
        "REQUEST_TIME"
    );
}

#[tokio::test]
async fn test_create_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
        .mount(&server)
        .await;

    let err = make_store(&server)
        .create("exercises", Fields::new())
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("403"), "{}", message);
    assert!(message.contains("PERMISSION_DENIED"), "{}", message);
}

#[tokio::test]
async fn test_delete_targets_document() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/exercises/a1", DOCUMENTS)))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    make_store(&server).delete("exercises", "a1").await.unwrap();
}

#[tokio::test]
async fn test_delete_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(make_store(&server).delete("exercises", "a1").await.is_err());
}

#[tokio::test]
async fn test_subscribe_emits_only_on_change() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/exercises", DOCUMENTS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [rest_doc("a1", "Push-ups", "2024-02-18T09:00:00Z")]
        })))
        .mount(&server)
        .await;

    let store = make_store(&server);
    let mut stream = store.subscribe("exercises");

    let first = next_snapshot(&mut stream).await;
    assert_eq!(first.len(), 1);

    // Same listing on every poll: nothing new is delivered.
    assert!(
        tokio::time::timeout(Duration::from_millis(150), stream.next())
            .await
            .is_err()
    );

    server.reset().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/exercises", DOCUMENTS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                rest_doc("a1", "Push-ups", "2024-02-18T09:00:00Z"),
                rest_doc("b2", "Squats", "2024-02-18T10:00:00Z"),
            ]
        })))
        .mount(&server)
        .await;

    let second = next_snapshot(&mut stream).await;
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn test_subscribe_reports_each_failure_streak_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = make_store(&server);
    let mut stream = store.subscribe("exercises");

    let item = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("error item")
        .unwrap();
    assert!(item.is_err());

    // Polling keeps failing, but the streak was already reported.
    assert!(
        tokio::time::timeout(Duration::from_millis(150), stream.next())
            .await
            .is_err()
    );

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(next_snapshot(&mut stream).await.is_empty());

    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let item = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("error item after recovery")
        .unwrap();
    assert!(item.is_err());
}
