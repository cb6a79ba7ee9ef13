//! Error types for Liftlog
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Liftlog operations
///
/// Covers configuration loading, the remote document store, and the
/// exercise screen's failure taxonomy (configuration missing, subscription
/// errors, add/delete failures and the concurrent delete notice).
#[derive(Error, Debug)]
pub enum LiftlogError {
    /// Configuration-related errors (invalid values, unknown backend)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mandatory connection parameters are missing; fatal for the session
    #[error(
        "Missing Firebase configuration keys: {}. Make sure your environment variables are properly configured in config.yaml",
        .keys.join(", ")
    )]
    ConfigurationMissing {
        /// Names of the missing keys, in declaration order
        keys: Vec<String>,
    },

    /// The screen is blocked by a failed configuration check
    #[error("Screen is blocked: configuration check failed")]
    ScreenBlocked,

    /// Realtime subscription reported an error
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Creating an exercise failed
    #[error("Failed to add exercise: {0}")]
    AddFailed(String),

    /// Deleting an exercise failed
    #[error("Failed to delete exercise: {0}")]
    DeleteFailed(String),

    /// A delete is already in flight for this screen
    #[error("Please wait: another delete is in progress")]
    DeleteInFlight,

    /// Document store errors (transport, decoding, unknown documents)
    #[error("Store error: {0}")]
    Store(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Liftlog operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation. Typed
/// variants are recovered with `downcast_ref::<LiftlogError>()`.
pub type Result<T> = anyhow::Result<T>;
