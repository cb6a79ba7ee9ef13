//! Command-line interface definition for Liftlog
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the exercise screens, one-shot exercise
//! operations, workout history, and configuration checks.

use crate::config::StoreBackend;
use clap::{Parser, Subcommand};

/// Liftlog - workout tracker
///
/// Track exercises in a realtime-synced remote collection, or in a
/// throwaway local list.
#[derive(Parser, Debug, Clone)]
#[command(name = "liftlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the document store backend (firestore, memory)
    #[arg(short, long, global = true, value_parser = parse_backend)]
    pub backend: Option<StoreBackend>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Liftlog
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Open the interactive exercise screen backed by the document store
    Exercises,

    /// Print the current exercise list and exit
    List {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add an exercise
    Add {
        /// Exercise name
        name: String,
    },

    /// Delete an exercise by id
    Delete {
        /// Exercise id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Open the interactive local-only exercise list (nothing is persisted)
    Local,

    /// Show workout history
    History,

    /// Check that the Firebase connection parameters are present
    CheckConfig,
}

fn parse_backend(s: &str) -> std::result::Result<StoreBackend, String> {
    StoreBackend::parse_str(s).map_err(|e| e.to_string())
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            backend: None,
            command: Commands::Exercises,
        }
    }
}
