//! LiftLog - workout exercise tracker CLI
//!
#![doc = "LiftLog - workout exercise tracker CLI"]
#![doc = "Main entry point for the liftlog application."]

use anyhow::Result;

use liftlog::cli::{Cli, Commands};
use liftlog::commands;
use liftlog::config::Config;
use liftlog::logging::{init_logging, startup_subscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load and validate configuration; warnings go to a startup subscriber
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = tracing::subscriber::with_default(startup_subscriber(), || -> Result<Config> {
        let config = Config::load(config_path, &cli)?;
        config.validate()?;
        Ok(config)
    })?;

    init_logging(&config.logging)?;

    // Execute command
    match cli.command {
        Commands::Exercises => {
            tracing::info!(collection = %config.store.collection, "Starting exercise screen");
            commands::run_exercises(config).await?;
        }
        Commands::List { json } => {
            commands::list_exercises(&config, json).await?;
        }
        Commands::Add { name } => {
            tracing::info!(name = %name, "Adding exercise");
            commands::add_exercise(&config, &name).await?;
        }
        Commands::Delete { id, yes } => {
            tracing::info!(exercise_id = %id, "Deleting exercise");
            commands::delete_exercise(&config, &id, yes).await?;
        }
        Commands::Local => {
            tracing::info!("Starting local exercise list");
            commands::run_local()?;
        }
        Commands::History => {
            commands::show_history()?;
        }
        Commands::CheckConfig => {
            commands::check_config(&config)?;
        }
    }

    Ok(())
}
