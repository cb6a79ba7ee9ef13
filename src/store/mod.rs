//! Remote document store abstraction and implementations
//!
//! This module defines the [`DocumentStore`] trait that every backend
//! satisfies. Concrete implementations live in submodules:
//!
//! - [`firestore::FirestoreStore`] -- Firestore REST v1 adapter; the
//!   subscription lists the collection on an interval and emits a snapshot
//!   whenever the document set changes.
//! - [`memory::MemoryStore`] -- in-process store that pushes a snapshot on
//!   every write.
//! - [`fake::FakeStore`] -- test double that hands every request to the test
//!   for an explicit reply.
//!
//! # Design
//!
//! The trait mirrors the managed realtime SDK the exercise screen was written
//! against: `subscribe` yields a stream of complete snapshots (never deltas)
//! with errors delivered in-band, `create` returns the store-assigned id, and
//! [`FieldValue::ServerTimestamp`] asks the store to resolve a timestamp at
//! write time. Dropping the snapshot stream ends the subscription.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::Stream;
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::config::{FirebaseConfig, StoreBackend, StoreConfig};
use crate::error::Result;

pub mod fake;
pub mod firestore;
pub mod memory;

pub use fake::{FakeStore, FakeStoreHandle, StoreRequest};
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Length of generated document ids
const AUTO_ID_LEN: usize = 20;

/// A single field value in a document
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// UTF-8 string
    String(String),
    /// 64-bit integer
    Integer(i64),
    /// Resolved timestamp
    Timestamp(DateTime<Utc>),
    /// Sentinel resolved by the store at write time
    ServerTimestamp,
    /// Explicit null; also how an unresolved server timestamp reads back
    Null,
}

impl FieldValue {
    /// Borrow the string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The timestamp payload, if this is a resolved timestamp
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// Field map of a document, ordered by field name
pub type Fields = BTreeMap<String, FieldValue>;

/// A document as delivered in a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier, unique within the collection
    pub id: String,
    /// Document fields
    pub fields: Fields,
}

impl Document {
    /// Create a document from an id and its fields
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Look up a field by name
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }
}

/// Complete point-in-time view of a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Documents in store order
    pub documents: Vec<Document>,
}

impl Snapshot {
    /// Create a snapshot from documents
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the collection was empty at snapshot time
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Stream of snapshots; an `Err` item reports a transport error and the
/// stream may continue afterwards.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<Snapshot>> + Send>>;

/// Abstraction over remote document stores.
///
/// Used polymorphically through `Arc<dyn DocumentStore>`.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Open a standing subscription to `collection`.
    ///
    /// The first item is the current state of the collection; later items
    /// follow every observed change. Dropping the stream releases the
    /// subscription.
    fn subscribe(&self, collection: &str) -> SnapshotStream;

    /// Create a document and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LiftlogError::Store`] if the write is
    /// rejected or the transport fails.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Delete the document `id` from `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LiftlogError::Store`] if the delete is
    /// rejected or the transport fails.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}

/// Generate a 20-character alphanumeric document id
pub fn auto_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

/// Build the document store selected by `store_config`
///
/// # Errors
///
/// Returns an error if the Firestore HTTP client cannot be constructed
pub fn create_store(
    store_config: &StoreConfig,
    firebase: &FirebaseConfig,
) -> Result<Arc<dyn DocumentStore>> {
    match store_config.backend {
        StoreBackend::Memory => {
            tracing::debug!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Firestore => {
            tracing::debug!(
                project_id = %firebase.project_id,
                api_base = %store_config.api_base,
                "Using Firestore document store"
            );
            Ok(Arc::new(FirestoreStore::new(store_config, firebase)?))
        }
    }
}
