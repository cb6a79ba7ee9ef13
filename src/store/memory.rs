//! In-process document store
//!
//! [`MemoryStore`] keeps every collection in memory and pushes a complete
//! snapshot to all subscribers after each write, the same contract a
//! realtime backend offers. Data lives as long as the store value.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::watch;

use super::{auto_id, Document, DocumentStore, FieldValue, Fields, Snapshot, SnapshotStream};
use crate::error::Result;

#[derive(Debug)]
struct Collection {
    documents: Vec<Document>,
    feed: watch::Sender<Snapshot>,
}

impl Collection {
    fn new() -> Self {
        let (feed, _) = watch::channel(Snapshot::default());
        Self {
            documents: Vec::new(),
            feed,
        }
    }

    fn publish(&self) {
        self.feed.send_replace(Snapshot::new(self.documents.clone()));
    }
}

/// In-memory [`DocumentStore`]
///
/// Cloning is cheap and clones share the same data.
///
/// # Examples
///
/// ```
/// use liftlog::store::{DocumentStore, FieldValue, Fields, MemoryStore};
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let store = MemoryStore::new();
/// let mut fields = Fields::new();
/// fields.insert("name".to_string(), FieldValue::String("Squats".to_string()));
/// let id = store.create("exercises", fields).await?;
/// assert_eq!(store.documents("exercises")[0].id, id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<String, Collection>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current documents of `collection`, in insertion order
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        let collections = self.lock();
        collections
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Collection>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    fn subscribe(&self, collection: &str) -> SnapshotStream {
        let rx = {
            let mut collections = self.lock();
            collections
                .entry(collection.to_string())
                .or_insert_with(Collection::new)
                .feed
                .subscribe()
        };

        Box::pin(futures::stream::unfold(
            (rx, true),
            |(mut rx, first)| async move {
                if !first {
                    rx.changed().await.ok()?;
                }
                let snapshot = rx.borrow_and_update().clone();
                Some((Ok(snapshot), (rx, false)))
            },
        ))
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let now = Utc::now();
        let fields = fields
            .into_iter()
            .map(|(name, value)| match value {
                FieldValue::ServerTimestamp => (name, FieldValue::Timestamp(now)),
                other => (name, other),
            })
            .collect();

        let id = auto_id();
        let mut collections = self.lock();
        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);
        entry.documents.push(Document::new(id.clone(), fields));
        entry.publish();

        tracing::debug!(collection, id = %id, "Created document");
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.lock();
        if let Some(entry) = collections.get_mut(collection) {
            let before = entry.documents.len();
            entry.documents.retain(|d| d.id != id);
            if entry.documents.len() != before {
                entry.publish();
                tracing::debug!(collection, id, "Deleted document");
            }
        }
        // Deleting a missing document succeeds, as in Firestore.
        Ok(())
    }
}
