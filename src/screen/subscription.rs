//! Live subscription: keeps the local exercise list equal to the latest
//! snapshot of the remote collection
//!
//! Every snapshot rebuilds the whole list (no incremental diffing; the store
//! always delivers complete snapshots) and publishes it with a single
//! `watch` send, so readers never observe a half-applied update. A
//! subscription error is reported and the previous list stays in place.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::metrics::{record_snapshot, record_subscription_error};
use super::notify::{Notification, Notifier};
use super::projection::sort_newest_first;
use crate::models::Exercise;
use crate::store::{DocumentStore, Snapshot};

/// Build the sorted local list from a snapshot
///
/// `now` stands in for documents whose timestamp has not been resolved yet.
pub fn exercises_from_snapshot(snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<Exercise> {
    let mut exercises: Vec<Exercise> = snapshot
        .documents
        .iter()
        .map(|doc| Exercise::from_document(doc, now))
        .collect();
    sort_newest_first(&mut exercises);
    exercises
}

/// Owner of a running subscription
///
/// Releasing cancels the background task, which drops the store's snapshot
/// stream. Release happens at most once: explicitly through
/// [`SubscriptionHandle::release`] or when the handle is dropped.
#[derive(Debug)]
pub struct SubscriptionHandle {
    token: CancellationToken,
    released: AtomicBool,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Subscribe to `collection` and start applying snapshots to `list`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(
        store: &dyn DocumentStore,
        collection: &str,
        list: watch::Sender<Arc<Vec<Exercise>>>,
        notifier: Notifier,
    ) -> Self {
        let mut stream = store.subscribe(collection);
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let collection = collection.to_string();

        tracing::info!(collection = %collection, "Subscription opened");

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    item = stream.next() => match item {
                        Some(Ok(snapshot)) => {
                            let exercises = exercises_from_snapshot(&snapshot, Utc::now());
                            tracing::debug!(
                                collection = %collection,
                                documents = exercises.len(),
                                "Snapshot applied"
                            );
                            record_snapshot(exercises.len());
                            list.send_replace(Arc::new(exercises));
                        }
                        Some(Err(e)) => {
                            tracing::warn!(collection = %collection, error = %e, "Subscription error");
                            record_subscription_error();
                            notifier.notify(Notification::error("Failed to load exercises"));
                        }
                        None => {
                            tracing::debug!(collection = %collection, "Snapshot stream ended");
                            break;
                        }
                    },
                }
            }
            tracing::debug!(collection = %collection, "Subscription task finished");
        });

        Self {
            token,
            released: AtomicBool::new(false),
            task,
        }
    }

    /// Release the subscription
    ///
    /// Returns `true` for the call that actually released it and `false`
    /// for every later call.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.token.cancel();
        tracing::info!("Subscription released");
        true
    }

    /// Whether [`SubscriptionHandle::release`] has run
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Whether the background task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.release();
    }
}
