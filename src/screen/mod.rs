//! Remote-backed exercise screen
//!
//! [`ExerciseScreen`] is the headless controller behind the exercise list:
//!
//! - [`guard`] -- checks the connection parameters once, at mount
//! - [`subscription`] -- one standing subscription that replaces the local
//!   list with every snapshot
//! - [`gateway`] -- add/delete requests, busy flag and single-flight delete
//!   lock
//! - [`projection`] -- the sorted, empty-state-aware view
//! - [`notify`] -- user-facing notifications
//!
//! Data flows one way: mutations go to the store, and the list only ever
//! changes when the subscription delivers a snapshot.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use liftlog::config::FirebaseConfig;
//! use liftlog::screen::{ExerciseScreen, Notifier};
//! use liftlog::store::MemoryStore;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let firebase = FirebaseConfig {
//!     api_key: "key".into(),
//!     auth_domain: "demo.firebaseapp.com".into(),
//!     project_id: "demo".into(),
//!     storage_bucket: "demo.appspot.com".into(),
//!     messaging_sender_id: "1".into(),
//!     app_id: "1:1:web:1".into(),
//!     measurement_id: None,
//! };
//! let (notifier, _notifications) = Notifier::channel();
//! let screen = ExerciseScreen::mount(&firebase, Arc::new(MemoryStore::new()), "exercises", notifier);
//!
//! let mut updates = screen.updates();
//! screen.set_input("Push-ups");
//! screen.add().await?;
//! while screen.exercises().is_empty() {
//!     updates.changed().await?;
//! }
//! assert_eq!(screen.exercises()[0].name, "Push-ups");
//! screen.unmount();
//! # Ok(())
//! # }
//! ```

pub mod gateway;
pub mod guard;
pub mod metrics;
pub mod notify;
pub mod projection;
pub mod subscription;

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::FirebaseConfig;
use crate::error::{LiftlogError, Result};
use crate::models::Exercise;
use crate::store::DocumentStore;

pub use gateway::{
    AddOutcome, AlwaysConfirm, ControlState, DeleteConfirmation, DeleteLock, DeleteOutcome,
    MutationGateway,
};
pub use guard::ConfigGuard;
pub use notify::{Notification, NotificationLevel, Notifier};
pub use projection::{ExerciseListView, ExerciseRow, ListBody, EMPTY_EXERCISES_MESSAGE};
pub use subscription::SubscriptionHandle;

/// Whether the screen passed its configuration check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenStatus {
    /// Subscribed and accepting mutations
    Ready,
    /// Configuration check failed; nothing will ever run
    Blocked {
        /// Missing configuration keys
        missing: Vec<String>,
    },
}

/// Controller for the remote-backed exercise list
#[derive(Debug)]
pub struct ExerciseScreen {
    collection: String,
    status: ScreenStatus,
    list: watch::Receiver<Arc<Vec<Exercise>>>,
    gateway: Option<MutationGateway>,
    subscription: Option<SubscriptionHandle>,
}

impl ExerciseScreen {
    /// Mount the screen
    ///
    /// Runs the configuration guard. When it passes, opens the subscription
    /// to `collection`; when it fails, surfaces one fatal notification and
    /// returns a blocked screen that refuses every data operation.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(
        firebase: &FirebaseConfig,
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        notifier: Notifier,
    ) -> Self {
        let collection = collection.into();
        let (list_tx, list_rx) = watch::channel(Arc::new(Vec::new()));

        if let Err(e) = ConfigGuard::check(firebase) {
            tracing::error!(collection = %collection, error = %e, "Configuration check failed");
            let missing = match e.downcast_ref::<LiftlogError>() {
                Some(LiftlogError::ConfigurationMissing { keys }) => keys.clone(),
                _ => Vec::new(),
            };
            notifier.notify(Notification::fatal("Configuration Error", e.to_string()));
            return Self {
                collection,
                status: ScreenStatus::Blocked { missing },
                list: list_rx,
                gateway: None,
                subscription: None,
            };
        }

        match ConfigGuard::analytics_measurement_id(firebase) {
            Some(measurement_id) => {
                tracing::info!(measurement_id = %measurement_id, "Analytics enabled")
            }
            None => tracing::debug!("Analytics disabled: no measurement id configured"),
        }

        let subscription =
            SubscriptionHandle::open(store.as_ref(), &collection, list_tx, notifier.clone());
        let gateway = MutationGateway::new(store, collection.clone(), list_rx.clone(), notifier);

        Self {
            collection,
            status: ScreenStatus::Ready,
            list: list_rx,
            gateway: Some(gateway),
            subscription: Some(subscription),
        }
    }

    /// Collection this screen mirrors
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Ready or blocked
    pub fn status(&self) -> &ScreenStatus {
        &self.status
    }

    /// Whether the configuration check failed
    pub fn is_blocked(&self) -> bool {
        matches!(self.status, ScreenStatus::Blocked { .. })
    }

    /// The list as of the latest applied snapshot, newest first
    pub fn exercises(&self) -> Arc<Vec<Exercise>> {
        Arc::clone(&self.list.borrow())
    }

    /// A receiver that is notified whenever a snapshot is applied
    pub fn updates(&self) -> watch::Receiver<Arc<Vec<Exercise>>> {
        self.list.clone()
    }

    /// Replace the add field's text; ignored on a blocked screen
    pub fn set_input(&self, text: impl Into<String>) {
        if let Some(gateway) = &self.gateway {
            gateway.set_input(text);
        }
    }

    /// Current control state (input, busy flag, delete lock)
    pub fn controls(&self) -> ControlState {
        self.gateway
            .as_ref()
            .map(MutationGateway::controls_snapshot)
            .unwrap_or_default()
    }

    /// Derive the view for rendering
    pub fn view(&self) -> ExerciseListView {
        projection::project(&self.exercises(), &self.controls())
    }

    /// The mutation gateway, for issuing requests from spawned tasks
    ///
    /// # Errors
    ///
    /// Returns `LiftlogError::ScreenBlocked` on a blocked screen
    pub fn gateway(&self) -> Result<MutationGateway> {
        self.gateway
            .clone()
            .ok_or_else(|| LiftlogError::ScreenBlocked.into())
    }

    /// Add an exercise from the add field (see [`MutationGateway::add`])
    ///
    /// # Errors
    ///
    /// Returns `LiftlogError::ScreenBlocked` on a blocked screen, otherwise
    /// whatever the gateway returns
    pub async fn add(&self) -> Result<AddOutcome> {
        self.gateway()?.add().await
    }

    /// Type `text` into the add field and add it (see
    /// [`MutationGateway::submit`])
    ///
    /// # Errors
    ///
    /// Returns `LiftlogError::ScreenBlocked` on a blocked screen, otherwise
    /// whatever the gateway returns
    pub async fn submit(&self, text: impl Into<String>) -> Result<AddOutcome> {
        self.gateway()?.submit(text).await
    }

    /// Delete an exercise after confirmation (see [`MutationGateway::delete`])
    ///
    /// # Errors
    ///
    /// Returns `LiftlogError::ScreenBlocked` on a blocked screen, otherwise
    /// whatever the gateway returns
    pub async fn delete<C>(&self, id: &str, confirmation: &C) -> Result<DeleteOutcome>
    where
        C: DeleteConfirmation + ?Sized,
    {
        self.gateway()?.delete(id, confirmation).await
    }

    /// Tear down: release the subscription
    ///
    /// Safe to call more than once; dropping the screen does the same.
    /// In-flight add/delete requests keep running to completion.
    pub fn unmount(&self) {
        if let Some(subscription) = &self.subscription {
            if subscription.release() {
                tracing::debug!(collection = %self.collection, "Screen unmounted");
            }
        }
    }
}
