//! Counters for the exercise screen
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! every call is a no-op.
//!
//! # Metrics
//!
//! - `liftlog_snapshots_total`: snapshots applied to the local list
//! - `liftlog_exercises_visible`: gauge of exercises in the latest snapshot
//! - `liftlog_subscription_errors_total`: errors reported by the subscription
//! - `liftlog_mutations_total`: add/delete attempts by `op` and `outcome`

use metrics::{gauge, increment_counter};

/// Mutation kind label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    /// Exercise creation
    Add,
    /// Exercise deletion
    Delete,
}

impl MutationOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

/// Record a snapshot applied to the local list
pub fn record_snapshot(documents: usize) {
    increment_counter!("liftlog_snapshots_total");
    gauge!("liftlog_exercises_visible", documents as f64);
}

/// Record an error reported by the subscription
pub fn record_subscription_error() {
    increment_counter!("liftlog_subscription_errors_total");
}

/// Record the outcome of a mutation ("success", "failure", "rejected", ...)
pub fn record_mutation(op: MutationOp, outcome: &'static str) {
    increment_counter!(
        "liftlog_mutations_total",
        "op" => op.as_str(),
        "outcome" => outcome
    );
}
