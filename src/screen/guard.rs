//! Configuration guard for the remote-backed exercise screen
//!
//! Runs once when the screen mounts. A failure is permanent for the session:
//! there is no re-check, the screen stays blocked until the process restarts.

use crate::config::FirebaseConfig;
use crate::error::{LiftlogError, Result};

/// Checks that the mandatory Firebase connection parameters are present
pub struct ConfigGuard;

impl ConfigGuard {
    /// Names (as the Firebase SDK spells them) of the mandatory fields that
    /// are empty or whitespace, in declaration order
    pub fn missing_keys(config: &FirebaseConfig) -> Vec<String> {
        let required: [(&str, &str); 6] = [
            ("apiKey", config.api_key.as_str()),
            ("authDomain", config.auth_domain.as_str()),
            ("projectId", config.project_id.as_str()),
            ("storageBucket", config.storage_bucket.as_str()),
            ("messagingSenderId", config.messaging_sender_id.as_str()),
            ("appId", config.app_id.as_str()),
        ];

        required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Measurement id to enable analytics with, if one is configured
    ///
    /// Analytics is optional; its absence never blocks the screen.
    pub fn analytics_measurement_id(config: &FirebaseConfig) -> Option<&str> {
        config
            .measurement_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Run the check
    ///
    /// `measurement_id` is optional and never reported.
    ///
    /// # Errors
    ///
    /// Returns `LiftlogError::ConfigurationMissing` naming every missing key
    pub fn check(config: &FirebaseConfig) -> Result<()> {
        let keys = Self::missing_keys(config);
        if keys.is_empty() {
            Ok(())
        } else {
            Err(LiftlogError::ConfigurationMissing { keys }.into())
        }
    }
}
