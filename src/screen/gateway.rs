//! Mutation gateway: add and delete requests against the document store
//!
//! Neither operation touches the local list. Their effect becomes visible
//! when the live subscription delivers the next snapshot.
//!
//! Add is guarded by a busy flag (the add control is disabled while a create
//! is outstanding). Delete is guarded by a screen-wide single-flight lock:
//! while one delete is in flight every other delete request is refused with
//! a "please wait" notice, without asking for confirmation and without
//! issuing a request.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::metrics::{record_mutation, MutationOp};
use super::notify::{Notification, Notifier};
use crate::error::{LiftlogError, Result};
use crate::models::{Exercise, CREATED_AT_FIELD, NAME_FIELD};
use crate::store::{DocumentStore, FieldValue, Fields};

/// Single-flight delete lock
///
/// `Idle -> Deleting(id) -> Idle`; no other transitions exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteLock {
    /// No delete in flight
    #[default]
    Idle,
    /// A delete for the given id is in flight
    Deleting(String),
}

impl DeleteLock {
    /// Move to `Deleting(id)` if idle; returns whether the lock was taken
    pub fn try_acquire(&mut self, id: &str) -> bool {
        match self {
            Self::Idle => {
                *self = Self::Deleting(id.to_string());
                true
            }
            Self::Deleting(_) => false,
        }
    }

    /// Return to `Idle`
    pub fn release(&mut self) {
        *self = Self::Idle;
    }

    /// Whether no delete is in flight
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Id of the in-flight delete, if any
    pub fn in_flight(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Deleting(id) => Some(id),
        }
    }
}

/// Input and control state of the screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    /// Text in the add field
    pub input: String,
    /// An add is outstanding; the add control is disabled
    pub busy: bool,
    /// Delete single-flight lock
    pub delete_lock: DeleteLock,
}

/// Result of an add request that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Document created with this id
    Created(String),
    /// Input was empty after trimming; nothing happened
    Skipped,
    /// Another add is outstanding; the control is disabled
    Busy,
}

/// Result of a delete request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The document was deleted
    Deleted,
    /// The user chose Cancel at the confirmation prompt
    Cancelled,
}

/// Confirmation step gating every delete (Cancel / Delete)
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DeleteConfirmation: Send + Sync {
    /// Ask whether `name` should be deleted; `true` means Delete
    async fn confirm_delete(&self, name: &str) -> bool;
}

/// Confirms every delete without asking
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

#[async_trait::async_trait]
impl DeleteConfirmation for AlwaysConfirm {
    async fn confirm_delete(&self, _name: &str) -> bool {
        true
    }
}

/// Issues add/delete requests for one screen
///
/// Cloning is cheap; clones share the same control state, so the busy flag
/// and the delete lock are screen-wide.
#[derive(Debug, Clone)]
pub struct MutationGateway {
    store: Arc<dyn DocumentStore>,
    collection: String,
    controls: Arc<Mutex<ControlState>>,
    list: watch::Receiver<Arc<Vec<Exercise>>>,
    notifier: Notifier,
}

impl MutationGateway {
    /// Create a gateway writing to `collection`
    ///
    /// `list` is only read to show exercise names in confirmation prompts.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        list: watch::Receiver<Arc<Vec<Exercise>>>,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            controls: Arc::new(Mutex::new(ControlState::default())),
            list,
            notifier,
        }
    }

    /// Replace the text in the add field
    pub fn set_input(&self, text: impl Into<String>) {
        self.controls().input = text.into();
    }

    /// Copy of the current control state
    pub fn controls_snapshot(&self) -> ControlState {
        self.controls().clone()
    }

    /// Create an exercise from the add field
    ///
    /// On success the field is cleared; on failure it is left as typed so the
    /// user can retry. The busy flag is cleared on every path, including when
    /// the returned future is dropped early.
    ///
    /// # Errors
    ///
    /// Returns `LiftlogError::AddFailed` after surfacing an error
    /// notification
    pub async fn add(&self) -> Result<AddOutcome> {
        let claim = self.claim_add(&mut self.controls());
        match claim {
            Ok(name) => self.create(name).await,
            Err(outcome) => Ok(outcome),
        }
    }

    /// Type `text` into the add field and add it
    ///
    /// While another add is outstanding the field is left untouched and a
    /// "please wait" notice is shown, so the pending text is never replaced.
    ///
    /// # Errors
    ///
    /// Same as [`MutationGateway::add`]
    pub async fn submit(&self, text: impl Into<String>) -> Result<AddOutcome> {
        let claim = {
            let mut controls = self.controls();
            if !controls.busy {
                controls.input = text.into();
            }
            self.claim_add(&mut controls)
        };
        match claim {
            Ok(name) => self.create(name).await,
            Err(outcome) => Ok(outcome),
        }
    }

    /// Mark the add as outstanding and return the trimmed name, or the
    /// outcome when no request should be issued
    fn claim_add(&self, controls: &mut ControlState) -> std::result::Result<String, AddOutcome> {
        if controls.busy {
            tracing::debug!("Add ignored: another add is outstanding");
            record_mutation(MutationOp::Add, "rejected");
            self.notifier.notify(Notification::notice(
                "Please wait",
                "An add operation is already in progress",
            ));
            return Err(AddOutcome::Busy);
        }
        let name = controls.input.trim().to_string();
        if name.is_empty() {
            return Err(AddOutcome::Skipped);
        }
        controls.busy = true;
        Ok(name)
    }

    async fn create(&self, name: String) -> Result<AddOutcome> {
        let _busy = BusyGuard {
            controls: Arc::clone(&self.controls),
        };

        let mut fields = Fields::new();
        fields.insert(NAME_FIELD.to_string(), FieldValue::String(name.clone()));
        fields.insert(CREATED_AT_FIELD.to_string(), FieldValue::ServerTimestamp);

        match self.store.create(&self.collection, fields).await {
            Ok(id) => {
                self.controls().input.clear();
                tracing::info!(collection = %self.collection, exercise_id = %id, name = %name, "Exercise added");
                record_mutation(MutationOp::Add, "success");
                self.notifier
                    .notify(Notification::success("Exercise added successfully"));
                Ok(AddOutcome::Created(id))
            }
            Err(e) => {
                tracing::error!(collection = %self.collection, error = %e, "Failed to add exercise");
                record_mutation(MutationOp::Add, "failure");
                self.notifier
                    .notify(Notification::error("Failed to add exercise"));
                Err(LiftlogError::AddFailed(e.to_string()).into())
            }
        }
    }

    /// Delete the exercise `id` after confirmation
    ///
    /// # Errors
    ///
    /// Returns `LiftlogError::DeleteInFlight` when another delete holds the
    /// lock (a "please wait" notice is shown and no confirmation is asked),
    /// or `LiftlogError::DeleteFailed` after surfacing an error notification
    pub async fn delete<C>(&self, id: &str, confirmation: &C) -> Result<DeleteOutcome>
    where
        C: DeleteConfirmation + ?Sized,
    {
        if !self.controls().delete_lock.is_idle() {
            return Err(self.reject_concurrent_delete(id));
        }

        let name = self.display_name(id);
        if !confirmation.confirm_delete(&name).await {
            tracing::debug!(exercise_id = %id, "Delete cancelled");
            record_mutation(MutationOp::Delete, "cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        // Another delete may have started while the prompt was open.
        if !self.controls().delete_lock.try_acquire(id) {
            return Err(self.reject_concurrent_delete(id));
        }
        let _lock = LockGuard {
            controls: Arc::clone(&self.controls),
        };

        match self.store.delete(&self.collection, id).await {
            Ok(()) => {
                tracing::info!(collection = %self.collection, exercise_id = %id, "Exercise deleted");
                record_mutation(MutationOp::Delete, "success");
                self.notifier
                    .notify(Notification::success("Exercise deleted successfully"));
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                tracing::error!(collection = %self.collection, exercise_id = %id, error = %e, "Failed to delete exercise");
                record_mutation(MutationOp::Delete, "failure");
                self.notifier
                    .notify(Notification::error("Failed to delete exercise"));
                Err(LiftlogError::DeleteFailed(e.to_string()).into())
            }
        }
    }

    fn reject_concurrent_delete(&self, id: &str) -> anyhow::Error {
        tracing::debug!(exercise_id = %id, "Delete rejected: another delete is in flight");
        record_mutation(MutationOp::Delete, "rejected");
        self.notifier.notify(Notification::notice(
            "Please wait",
            "A delete operation is already in progress",
        ));
        LiftlogError::DeleteInFlight.into()
    }

    fn display_name(&self, id: &str) -> String {
        self.list
            .borrow()
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn controls(&self) -> MutexGuard<'_, ControlState> {
        lock_controls(&self.controls)
    }
}

fn lock_controls(controls: &Mutex<ControlState>) -> MutexGuard<'_, ControlState> {
    controls.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the busy flag when dropped
struct BusyGuard {
    controls: Arc<Mutex<ControlState>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        lock_controls(&self.controls).busy = false;
    }
}

/// Releases the delete lock when dropped
struct LockGuard {
    controls: Arc<Mutex<ControlState>>,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        lock_controls(&self.controls).delete_lock.release();
    }
}
