//! Test utilities for liftlog
//!
//! Temporary config files, a complete Firebase configuration and assertion
//! helpers shared by the unit tests.

use crate::config::FirebaseConfig;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Write `contents` to `config.yaml` inside a fresh temporary directory
///
/// Keep the returned `TempDir` alive for as long as the path is used.
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, contents).expect("Failed to write test config");
    (dir, path)
}

/// A Firebase configuration with every required key present
pub fn complete_firebase_config() -> FirebaseConfig {
    FirebaseConfig {
        api_key: "test-api-key".to_string(),
        auth_domain: "liftlog-test.firebaseapp.com".to_string(),
        project_id: "liftlog-test".to_string(),
        storage_bucket: "liftlog-test.appspot.com".to_string(),
        messaging_sender_id: "123456789".to_string(),
        app_id: "1:123456789:web:abcdef".to_string(),
        measurement_id: None,
    }
}

/// Assert that an error's message contains `expected`
///
/// # Panics
///
/// Panics if the result is Ok or if the message doesn't contain `expected`
pub fn assert_error_contains<T>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LiftlogError;
    use crate::screen::ConfigGuard;

    #[test]
    fn test_temp_config_file() {
        let (dir, path) = temp_config_file("logging:\n  level: warn\n");
        assert!(path.starts_with(dir.path()));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "logging:\n  level: warn\n"
        );
    }

    #[test]
    fn test_complete_firebase_config_passes_guard() {
        assert!(ConfigGuard::missing_keys(&complete_firebase_config()).is_empty());
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: crate::error::Result<()> =
            Err(LiftlogError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: crate::error::Result<()> =
            Err(LiftlogError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }
}
