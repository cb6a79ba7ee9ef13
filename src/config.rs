//! Configuration management for Liftlog
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! [`Config::validate`] does not check the Firebase connection parameters;
//! the exercise screen's configuration guard reports those at mount time.

use crate::error::{LiftlogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Liftlog
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Firebase connection parameters
    #[serde(default)]
    pub firebase: FirebaseConfig,
    /// Document store backend settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Firebase connection parameters
///
/// Every field except `measurement_id` is mandatory for the remote-backed
/// exercise screen. Missing values deserialize to empty strings so the
/// guard can report all of them at once.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FirebaseConfig {
    /// Web API key, sent as the `key` query parameter
    #[serde(default)]
    pub api_key: String,
    /// Auth domain (e.g. `my-app.firebaseapp.com`)
    #[serde(default)]
    pub auth_domain: String,
    /// Project identifier; selects the Firestore database
    #[serde(default)]
    pub project_id: String,
    /// Storage bucket
    #[serde(default)]
    pub storage_bucket: String,
    /// Messaging sender id
    #[serde(default)]
    pub messaging_sender_id: String,
    /// App id
    #[serde(default)]
    pub app_id: String,
    /// Analytics measurement id (optional)
    #[serde(default)]
    pub measurement_id: Option<String>,
}

/// Which document store implementation backs the exercise screen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Firestore REST API
    #[default]
    Firestore,
    /// In-process store; data lives for the lifetime of the process
    Memory,
}

impl StoreBackend {
    /// Parse a backend name (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns `LiftlogError::Config` for unknown names
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(LiftlogError::Config(format!(
                "Invalid store backend: {}. Must be one of: firestore, memory",
                other
            ))
            .into()),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Firestore => write!(f, "firestore"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend implementation
    #[serde(default)]
    pub backend: StoreBackend,

    /// Collection holding exercise documents
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Base URL of the Firestore REST API (overridable for tests and emulators)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Interval between collection listings for the Firestore subscription
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_collection() -> String {
    "exercises".to_string()
}

fn default_api_base() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            collection: default_collection(),
            api_base: default_api_base(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,

    /// Optional file that receives a copy of every log line
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// Lookup order for the file: `path`, then `config.yaml` in the platform
    /// config directory. When neither exists, defaults are used.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if a file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else if let Some(user_path) = user_config_path().filter(|p| p.exists()) {
            tracing::debug!("Using config from {}", user_path.display());
            Self::from_file(&user_path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        let firebase_fields: [(&str, &mut String); 6] = [
            ("LIFTLOG_FIREBASE_API_KEY", &mut self.firebase.api_key),
            ("LIFTLOG_FIREBASE_AUTH_DOMAIN", &mut self.firebase.auth_domain),
            ("LIFTLOG_FIREBASE_PROJECT_ID", &mut self.firebase.project_id),
            (
                "LIFTLOG_FIREBASE_STORAGE_BUCKET",
                &mut self.firebase.storage_bucket,
            ),
            (
                "LIFTLOG_FIREBASE_SENDER_ID",
                &mut self.firebase.messaging_sender_id,
            ),
            ("LIFTLOG_FIREBASE_APP_ID", &mut self.firebase.app_id),
        ];
        for (var, field) in firebase_fields {
            if let Ok(value) = std::env::var(var) {
                *field = value;
            }
        }

        if let Ok(measurement_id) = std::env::var("LIFTLOG_FIREBASE_MEASUREMENT_ID") {
            self.firebase.measurement_id = Some(measurement_id);
        }

        if let Ok(backend) = std::env::var("LIFTLOG_STORE_BACKEND") {
            match StoreBackend::parse_str(&backend) {
                Ok(b) => self.store.backend = b,
                Err(_) => tracing::warn!("Invalid LIFTLOG_STORE_BACKEND: {}", backend),
            }
        }

        if let Ok(collection) = std::env::var("LIFTLOG_STORE_COLLECTION") {
            self.store.collection = collection;
        }

        if let Ok(api_base) = std::env::var("LIFTLOG_STORE_API_BASE") {
            self.store.api_base = api_base;
        }

        if let Ok(interval) = std::env::var("LIFTLOG_STORE_POLL_INTERVAL_MS") {
            if let Ok(value) = interval.parse() {
                self.store.poll_interval_ms = value;
            } else {
                tracing::warn!("Invalid LIFTLOG_STORE_POLL_INTERVAL_MS: {}", interval);
            }
        }

        if let Ok(level) = std::env::var("LIFTLOG_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(json_logs) = std::env::var("LIFTLOG_JSON_LOGS") {
            match json_logs.parse::<bool>() {
                Ok(v) => self.logging.json_format = v,
                Err(_) => tracing::warn!("Invalid value for LIFTLOG_JSON_LOGS: {}", json_logs),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(backend) = cli.backend {
            self.store.backend = backend;
        }
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate configuration
    ///
    /// Checks store and logging settings. Firebase parameters are checked by
    /// [`crate::screen::guard::ConfigGuard`] instead.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.store.collection.trim().is_empty() {
            return Err(
                LiftlogError::Config("store.collection cannot be empty".to_string()).into(),
            );
        }

        if self.store.backend == StoreBackend::Firestore {
            url::Url::parse(&self.store.api_base).map_err(|e| {
                LiftlogError::Config(format!(
                    "store.api_base is not a valid URL ({}): {}",
                    self.store.api_base, e
                ))
            })?;
        }

        if self.store.poll_interval_ms == 0 {
            return Err(LiftlogError::Config(
                "store.poll_interval_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.store.request_timeout_seconds == 0 {
            return Err(LiftlogError::Config(
                "store.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(LiftlogError::Config(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

/// Location of `config.yaml` in the platform config directory
fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "liftlog")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::temp_config_file;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.backend, StoreBackend::Firestore);
        assert_eq!(config.store.collection, "exercises");
        assert_eq!(config.store.poll_interval_ms, 2_000);
        assert_eq!(config.logging.level, "info");
        assert!(config.firebase.api_key.is_empty());
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_collection() {
        let mut config = Config::default();
        config.store.collection = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_api_base() {
        let mut config = Config::default();
        config.store.api_base = "not a url".to_string();
        assert!(config.validate().is_err());

        // Irrelevant for the memory backend
        config.store.backend = StoreBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_poll_interval() {
        let mut config = Config::default();
        config.store.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_ignores_missing_firebase_keys() {
        let config = Config::default();
        assert!(config.firebase.project_id.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
firebase:
  api_key: key-123
  auth_domain: demo.firebaseapp.com
  project_id: demo
  storage_bucket: demo.appspot.com
  messaging_sender_id: "1234"
  app_id: "1:1234:web:abcd"
store:
  backend: memory
  collection: lifts
  poll_interval_ms: 500
logging:
  level: debug
  json_format: true
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.firebase.api_key, "key-123");
        assert_eq!(config.firebase.measurement_id, None);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.collection, "lifts");
        assert_eq!(config.store.poll_interval_ms, 500);
        assert_eq!(config.store.api_base, "https://firestore.googleapis.com/v1");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_partial_firebase_section_defaults_to_empty() {
        let yaml = r#"
firebase:
  project_id: demo
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.firebase.project_id, "demo");
        assert!(config.firebase.api_key.is_empty());
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(
            StoreBackend::parse_str("Memory").unwrap(),
            StoreBackend::Memory
        );
        assert_eq!(
            StoreBackend::parse_str("firestore").unwrap(),
            StoreBackend::Firestore
        );
        assert!(StoreBackend::parse_str("sqlite").is_err());
    }

    #[test]
    fn test_load_from_file_with_cli_override() {
        let (_dir, path) = temp_config_file("store:\n  backend: firestore\n");
        let cli = crate::cli::Cli {
            config: None,
            verbose: true,
            backend: Some(StoreBackend::Memory),
            command: crate::cli::Commands::History,
        };

        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_firebase_and_store() {
        std::env::set_var("LIFTLOG_FIREBASE_API_KEY", "env-key");
        std::env::set_var("LIFTLOG_FIREBASE_MEASUREMENT_ID", "G-123");
        std::env::set_var("LIFTLOG_STORE_POLL_INTERVAL_MS", "not-a-number");
        std::env::set_var("LIFTLOG_STORE_COLLECTION", "workouts");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("LIFTLOG_FIREBASE_API_KEY");
        std::env::remove_var("LIFTLOG_FIREBASE_MEASUREMENT_ID");
        std::env::remove_var("LIFTLOG_STORE_POLL_INTERVAL_MS");
        std::env::remove_var("LIFTLOG_STORE_COLLECTION");

        assert_eq!(config.firebase.api_key, "env-key");
        assert_eq!(config.firebase.measurement_id.as_deref(), Some("G-123"));
        assert_eq!(config.store.collection, "workouts");
        // invalid value is ignored
        assert_eq!(config.store.poll_interval_ms, 2_000);
    }
}
