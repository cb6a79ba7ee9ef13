//! LiftLog - workout exercise tracker library
//!
//! This library provides the exercise screens behind the `liftlog` CLI: a
//! list of exercises mirrored live from a remote document store, with add and
//! delete going through the store.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `store`: Document store abstraction and backends (Firestore, in-memory, fake)
//! - `screen`: Remote-backed exercise screen (guard, subscription, mutations, view)
//! - `local`: Local-only exercise list
//! - `history`: Workout history
//! - `models`: Exercise view model
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `logging`: Tracing subscriber setup
//! - `cli`: Command-line interface definition
//! - `commands`: Command handlers
//!
//! # Example
//!
//! ```no_run
//! use liftlog::cli::Cli;
//! use liftlog::screen::{ExerciseScreen, Notifier};
//! use liftlog::store::create_store;
//! use liftlog::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Cli::default())?;
//!     config.validate()?;
//!
//!     let store = create_store(&config.store, &config.firebase)?;
//!     let (notifier, _notifications) = Notifier::channel();
//!     let screen = ExerciseScreen::mount(&config.firebase, store, config.store.collection.clone(), notifier);
//!     println!("{} exercises", screen.exercises().len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod local;
pub mod logging;
pub mod models;
pub mod screen;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{LiftlogError, Result};
pub use models::Exercise;
pub use screen::ExerciseScreen;
pub use store::DocumentStore;

#[cfg(test)]
pub mod test_utils;
