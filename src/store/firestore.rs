//! Firestore REST v1 document store
//!
//! Writes go straight to the REST API: `create` commits a single update write
//! with a `REQUEST_TIME` transform for every [`FieldValue::ServerTimestamp`]
//! field, `delete` removes the document by name.
//!
//! The REST API has no push channel, so [`FirestoreStore::subscribe`] lists
//! the collection every `poll_interval_ms` and yields a snapshot only when
//! the listing differs from the last one delivered. The first listing is
//! always delivered. Listing errors are yielded in-band and polling goes on.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::time::{Interval, MissedTickBehavior};

use super::{auto_id, Document, DocumentStore, FieldValue, Fields, Snapshot, SnapshotStream};
use crate::config::{FirebaseConfig, StoreConfig};
use crate::error::{LiftlogError, Result};

const LIST_PAGE_SIZE: u32 = 300;

/// Firestore-backed [`DocumentStore`]
///
/// # Examples
///
/// ```no_run
/// use liftlog::config::{FirebaseConfig, StoreConfig};
/// use liftlog::store::FirestoreStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let firebase = FirebaseConfig {
///     api_key: "key".to_string(),
///     project_id: "my-project".to_string(),
///     ..Default::default()
/// };
/// let store = FirestoreStore::new(&StoreConfig::default(), &firebase)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FirestoreStore {
    client: Client,
    /// `{api_base}/projects/{project}/databases/(default)/documents`
    documents_url: String,
    /// `projects/{project}/databases/(default)/documents`, used in document names
    documents_path: String,
    api_key: String,
    poll_interval: Duration,
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("documents_url", &self.documents_url)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RestDocument>,
    #[serde(rename = "nextPageToken", default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct CommitRequest {
    writes: Vec<Value>,
}

impl FirestoreStore {
    /// Create a store for the project named in `firebase`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(store_config: &StoreConfig, firebase: &FirebaseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(store_config.request_timeout_seconds))
            .build()?;

        let documents_path = format!(
            "projects/{}/databases/(default)/documents",
            firebase.project_id
        );
        let documents_url = format!(
            "{}/{}",
            store_config.api_base.trim_end_matches('/'),
            documents_path
        );

        Ok(Self {
            client,
            documents_url,
            documents_path,
            api_key: firebase.api_key.clone(),
            poll_interval: Duration::from_millis(store_config.poll_interval_ms),
        })
    }

    /// Fetch every document of `collection` as one snapshot
    ///
    /// # Errors
    ///
    /// Returns `LiftlogError::Store` on a non-success status or a malformed
    /// response body
    pub async fn list(&self, collection: &str) -> Result<Snapshot> {
        let url = format!("{}/{}", self.documents_url, collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("key", self.api_key.clone()),
                ("pageSize", LIST_PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self.client.get(&url).query(&query).send().await?;
            let response = check_status(response, "list").await?;
            let page: ListDocumentsResponse = response.json().await.map_err(|e| {
                LiftlogError::Store(format!("Failed to parse list response: {}", e))
            })?;

            documents.extend(page.documents.into_iter().map(decode_document));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(Snapshot::new(documents))
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_path, collection, id)
    }
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreStore {
    fn subscribe(&self, collection: &str) -> SnapshotStream {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let state = PollState {
            store: self.clone(),
            collection: collection.to_string(),
            interval,
            last: None,
            failing: false,
        };

        Box::pin(futures::stream::unfold(state, |mut state| async move {
            loop {
                state.interval.tick().await;
                match state.store.list(&state.collection).await {
                    Ok(snapshot) => {
                        if state.failing {
                            tracing::info!(collection = %state.collection, "Listing recovered");
                            state.failing = false;
                        }
                        if state.last.as_ref() == Some(&snapshot) {
                            continue;
                        }
                        tracing::trace!(
                            collection = %state.collection,
                            documents = snapshot.len(),
                            "Collection changed"
                        );
                        state.last = Some(snapshot.clone());
                        return Some((Ok(snapshot), state));
                    }
                    // Only the first error of a failure streak is reported.
                    Err(e) if state.failing => {
                        tracing::debug!(collection = %state.collection, error = %e, "Listing still failing");
                    }
                    Err(e) => {
                        state.failing = true;
                        return Some((Err(e), state));
                    }
                }
            }
        }))
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = auto_id();

        let mut encoded = Map::new();
        let mut transforms = Vec::new();
        for (name, value) in &fields {
            match encode_value(value) {
                Some(v) => {
                    encoded.insert(name.clone(), v);
                }
                None => transforms.push(json!({
                    "fieldPath": name,
                    "setToServerValue": "REQUEST_TIME",
                })),
            }
        }

        let mut write = json!({
            "update": {
                "name": self.document_name(collection, &id),
                "fields": encoded,
            },
            "currentDocument": { "exists": false },
        });
        if !transforms.is_empty() {
            write["updateTransforms"] = Value::Array(transforms);
        }

        let url = format!("{}:commit", self.documents_url);
        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&CommitRequest {
                writes: vec![write],
            })
            .send()
            .await?;
        check_status(response, "commit").await?;

        tracing::debug!(collection, id = %id, "Committed document");
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let url = format!("{}/{}/{}", self.documents_url, collection, id);
        let response = self
            .client
            .delete(&url)
            .query(&[("key", &self.api_key)])
            .send()
            .await?;
        check_status(response, "delete").await?;

        tracing::debug!(collection, id, "Deleted document");
        Ok(())
    }
}

struct PollState {
    store: FirestoreStore,
    collection: String,
    interval: Interval,
    last: Option<Snapshot>,
    failing: bool,
}

async fn check_status(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LiftlogError::Store(format!(
        "Firestore {} failed with status {}: {}",
        operation, status, body
    ))
    .into())
}

/// Encode a field for the REST API; `None` for the server timestamp sentinel
fn encode_value(value: &FieldValue) -> Option<Value> {
    match value {
        FieldValue::String(s) => Some(json!({ "stringValue": s })),
        FieldValue::Integer(i) => Some(json!({ "integerValue": i.to_string() })),
        FieldValue::Timestamp(ts) => Some(json!({ "timestampValue": ts.to_rfc3339() })),
        FieldValue::Null => Some(json!({ "nullValue": null })),
        FieldValue::ServerTimestamp => None,
    }
}

/// Decode a REST value; unsupported value kinds are dropped
fn decode_value(value: &Value) -> Option<FieldValue> {
    let object = value.as_object()?;
    if let Some(s) = object.get("stringValue").and_then(Value::as_str) {
        return Some(FieldValue::String(s.to_string()));
    }
    if let Some(i) = object.get("integerValue") {
        let parsed = match i {
            Value::String(s) => s.parse().ok(),
            other => other.as_i64(),
        };
        return parsed.map(FieldValue::Integer);
    }
    if let Some(ts) = object.get("timestampValue").and_then(Value::as_str) {
        return DateTime::parse_from_rfc3339(ts)
            .ok()
            .map(|dt| FieldValue::Timestamp(dt.with_timezone(&Utc)));
    }
    if object.contains_key("nullValue") {
        return Some(FieldValue::Null);
    }
    None
}

fn decode_document(doc: RestDocument) -> Document {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    let fields = doc
        .fields
        .iter()
        .filter_map(|(name, value)| match decode_value(value) {
            Some(v) => Some((name.clone(), v)),
            None => {
                tracing::trace!(field = %name, "Skipping unsupported Firestore value");
                None
            }
        })
        .collect();
    Document::new(id, fields)
}
