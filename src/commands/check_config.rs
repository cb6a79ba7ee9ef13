//! `check-config`: report whether the screen would mount

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;
use crate::screen::ConfigGuard;

/// Print the effective store settings and run the configuration guard
///
/// # Errors
///
/// Returns `LiftlogError::ConfigurationMissing` naming every missing key
pub fn check_config(config: &Config) -> Result<()> {
    println!("Backend:    {}", config.store.backend);
    println!("Collection: {}", config.store.collection);
    if !config.firebase.project_id.trim().is_empty() {
        println!("Project:    {}", config.firebase.project_id);
    }

    ConfigGuard::check(&config.firebase)?;
    println!("{}", analytics_line(config));
    println!("{}", "Configuration OK".green());
    Ok(())
}

fn analytics_line(config: &Config) -> String {
    match ConfigGuard::analytics_measurement_id(&config.firebase) {
        Some(id) => format!("Analytics:  enabled ({})", id),
        None => "Analytics:  disabled".to_string(),
    }
}
