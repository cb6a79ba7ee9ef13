use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tokio::sync::mpsc;

use liftlog::config::FirebaseConfig;
use liftlog::models::{CREATED_AT_FIELD, NAME_FIELD};
use liftlog::screen::Notification;
use liftlog::store::{Document, FieldValue, Fields};

#[allow(dead_code)]
pub const COMPLETE_FIREBASE_YAML: &str = r#"
firebase:
  api_key: test-api-key
  auth_domain: liftlog-test.firebaseapp.com
  project_id: liftlog-test
  storage_bucket: liftlog-test.appspot.com
  messaging_sender_id: "123456789"
  app_id: "1:123456789:web:abcdef"
"#;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
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

/// Exercise document created at 2024-02-18 09:`minute`
#[allow(dead_code)]
pub fn exercise_doc(id: &str, name: &str, minute: u32) -> Document {
    let mut fields = Fields::new();
    fields.insert(NAME_FIELD.to_string(), FieldValue::String(name.to_string()));
    fields.insert(
        CREATED_AT_FIELD.to_string(),
        FieldValue::Timestamp(Utc.with_ymd_and_hms(2024, 2, 18, 9, minute, 0).unwrap()),
    );
    Document::new(id, fields)
}

#[allow(dead_code)]
pub async fn next_notification(
    notifications: &mut mpsc::UnboundedReceiver<Notification>,
) -> Notification {
    tokio::time::timeout(Duration::from_secs(2), notifications.recv())
        .await
        .expect("timed out waiting for notification")
        .expect("notification channel closed")
}

#[allow(dead_code)]
pub async fn eventually<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
