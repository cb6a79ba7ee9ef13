//! In-process fake document store for unit and integration tests
//!
//! [`FakeStore::new`] returns a `(FakeStore, FakeStoreHandle)` pair. Wire the
//! [`FakeStore`] into the code under test and drive it from the test with the
//! handle:
//!
//! - Read every `create`/`delete` the code issued:
//!   `handle.requests.recv().await`, then answer it through the request's
//!   `reply` sender. Until the reply is sent the operation stays in flight.
//! - Push snapshots or transport errors into the subscription:
//!   `handle.push_snapshot(..)` / `handle.push_error(..)`.
//!
//! ```text
//! store create()/delete() --> requests (handle reads, replies via oneshot)
//! handle push_snapshot()  --> snapshots --> store subscribe() stream
//! ```
//!
//! # Example
//!
//! ```
//! use liftlog::store::{DocumentStore, FakeStore, Fields, StoreRequest};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (store, mut handle) = FakeStore::new();
//!
//! let create = tokio::spawn(async move { store.create("exercises", Fields::new()).await });
//!
//! match handle.requests.recv().await.unwrap() {
//!     StoreRequest::Create { reply, .. } => reply.send(Ok("doc-1".to_string())).unwrap(),
//!     other => panic!("unexpected request: {other:?}"),
//! }
//!
//! assert_eq!(create.await.unwrap().unwrap(), "doc-1");
//! # }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot};

use super::{Document, DocumentStore, Fields, Snapshot, SnapshotStream};
use crate::error::{LiftlogError, Result};

/// A request issued against a [`FakeStore`], waiting for the test's reply
#[derive(Debug)]
pub enum StoreRequest {
    /// `create(collection, fields)`
    Create {
        /// Target collection
        collection: String,
        /// Fields as passed by the caller (sentinels unresolved)
        fields: Fields,
        /// Completes the call with an id or an error
        reply: oneshot::Sender<Result<String>>,
    },
    /// `delete(collection, id)`
    Delete {
        /// Target collection
        collection: String,
        /// Document id
        id: String,
        /// Completes the call
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Fake [`DocumentStore`] driven by a [`FakeStoreHandle`]
///
/// Supports one live subscription; further `subscribe` calls get a stream
/// that ends immediately. Every call is counted so tests can assert that no
/// subscription was opened.
#[derive(Debug)]
pub struct FakeStore {
    requests_tx: mpsc::UnboundedSender<StoreRequest>,
    snapshots_rx: Mutex<Option<mpsc::UnboundedReceiver<Result<Snapshot>>>>,
    subscriptions: Arc<AtomicUsize>,
}

/// Test-side handle for a [`FakeStore`]
#[derive(Debug)]
pub struct FakeStoreHandle {
    /// Requests issued by the code under test, in order
    pub requests: mpsc::UnboundedReceiver<StoreRequest>,
    /// Items delivered to the subscription stream
    pub snapshots: mpsc::UnboundedSender<Result<Snapshot>>,
    subscriptions: Arc<AtomicUsize>,
}

impl FakeStore {
    /// Create a new `(FakeStore, FakeStoreHandle)` pair
    pub fn new() -> (Self, FakeStoreHandle) {
        let (requests_tx, requests) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = mpsc::unbounded_channel();
        let subscriptions = Arc::new(AtomicUsize::new(0));

        let store = Self {
            requests_tx,
            snapshots_rx: Mutex::new(Some(snapshots_rx)),
            subscriptions: Arc::clone(&subscriptions),
        };
        let handle = FakeStoreHandle {
            requests,
            snapshots,
            subscriptions,
        };
        (store, handle)
    }

    fn send_request(&self, request: StoreRequest) -> Result<()> {
        self.requests_tx.send(request).map_err(|_| {
            anyhow::anyhow!(LiftlogError::Store(
                "FakeStore handle dropped".to_string()
            ))
        })
    }
}

impl FakeStoreHandle {
    /// Deliver a snapshot built from `documents`
    pub fn push_snapshot(&self, documents: Vec<Document>) {
        let _ = self.snapshots.send(Ok(Snapshot::new(documents)));
    }

    /// Deliver a transport error
    pub fn push_error(&self, message: &str) {
        let _ = self
            .snapshots
            .send(Err(LiftlogError::Store(message.to_string()).into()));
    }

    /// Number of `subscribe` calls observed so far
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Whether the subscription stream has been dropped by its consumer
    pub fn subscription_released(&self) -> bool {
        self.snapshots.is_closed()
    }
}

#[async_trait::async_trait]
impl DocumentStore for FakeStore {
    fn subscribe(&self, _collection: &str) -> SnapshotStream {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let rx = self
            .snapshots_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match rx {
            Some(rx) => Box::pin(futures::stream::unfold(rx, |mut rx| async move {
                let item = rx.recv().await?;
                Some((item, rx))
            })),
            None => Box::pin(futures::stream::empty()),
        }
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let (reply, rx) = oneshot::channel();
        self.send_request(StoreRequest::Create {
            collection: collection.to_string(),
            fields,
            reply,
        })?;
        rx.await.map_err(|_| {
            anyhow::anyhow!(LiftlogError::Store("create reply dropped".to_string()))
        })?
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send_request(StoreRequest::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
            reply,
        })?;
        rx.await.map_err(|_| {
            anyhow::anyhow!(LiftlogError::Store("delete reply dropped".to_string()))
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FieldValue;
    use futures::StreamExt;
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_is_forwarded_and_answered() {
        let (store, mut handle) = FakeStore::new();
        let mut fields = Fields::new();
        fields.insert("name".to_string(), FieldValue::String("Rows".to_string()));

        let task = tokio::spawn(async move { store.create("exercises", fields).await });

        match handle.requests.recv().await.unwrap() {
            StoreRequest::Create {
                collection,
                fields,
                reply,
            } => {
                assert_eq!(collection, "exercises");
                assert_eq!(fields["name"].as_str(), Some("Rows"));
                reply.send(Ok("id-1".to_string())).unwrap();
            }
            other => panic!("unexpected request: {other:?}"),
        }

        assert_eq!(task.await.unwrap().unwrap(), "id-1");
    }

    #[tokio::test]
    async fn test_delete_error_reply_propagates() {
        let (store, mut handle) = FakeStore::new();
        let task = tokio::spawn(async move { store.delete("exercises", "x").await });

        match handle.requests.recv().await.unwrap() {
            StoreRequest::Delete { id, reply, .. } => {
                assert_eq!(id, "x");
                reply
                    .send(Err(LiftlogError::Store("denied".to_string()).into()))
                    .unwrap();
            }
            other => panic!("unexpected request: {other:?}"),
        }

        let err = task.await.unwrap().unwrap_err();
        assert!(err.to_string().contains("denied"));
    }

    #[tokio::test]
    async fn test_dropped_reply_is_an_error() {
        let (store, mut handle) = FakeStore::new();
        let task = tokio::spawn(async move { store.delete("exercises", "x").await });
        drop(handle.requests.recv().await.unwrap());
        assert!(task.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_subscription_receives_snapshots_and_errors() {
        let (store, handle) = FakeStore::new();
        let mut stream = store.subscribe("exercises");

        handle.push_snapshot(vec![Document::new("a", Fields::new())]);
        handle.push_error("unavailable");

        let first = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("timed out")
            .expect("stream ended");
        assert_eq!(first.unwrap().len(), 1);

        let second = stream.next().await.expect("stream ended");
        assert!(second.is_err());
        assert_eq!(handle.subscription_count(), 1);
    }

    #[tokio::test]
    async fn test_dropping_stream_marks_subscription_released() {
        let (store, handle) = FakeStore::new();
        let stream = store.subscribe("exercises");
        assert!(!handle.subscription_released());
        drop(stream);
        assert!(handle.subscription_released());
    }

    #[tokio::test]
    async fn test_second_subscribe_gets_empty_stream() {
        let (store, handle) = FakeStore::new();
        let _first = store.subscribe("exercises");
        let mut second = store.subscribe("exercises");
        assert!(second.next().await.is_none());
        assert_eq!(handle.subscription_count(), 2);
    }

    #[test]
    fn test_fake_store_is_object_safe() {
        let (store, _handle) = FakeStore::new();
        let _boxed: Box<dyn DocumentStore> = Box::new(store);
    }
}
