//! Exercise view model shared by the screen, projection and renderers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Document, FieldValue};

/// Document field holding the exercise name
pub const NAME_FIELD: &str = "name";

/// Document field holding the creation timestamp
pub const CREATED_AT_FIELD: &str = "createdAt";

/// An exercise as shown on the remote-backed screen
///
/// Identity is `id`, assigned by the store. Exercises are never edited in
/// place; they are created and deleted through the screen's mutation
/// gateway and otherwise only read back from snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Store-assigned identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Creation time as resolved by the store
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    /// Create an exercise
    pub fn new(id: impl Into<String>, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at,
        }
    }

    /// Map a snapshot document to an exercise
    ///
    /// A missing or not-yet-resolved `createdAt` falls back to `now`; a
    /// missing or non-string `name` becomes the empty string.
    pub fn from_document(doc: &Document, now: DateTime<Utc>) -> Self {
        let name = doc
            .get(NAME_FIELD)
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
            .to_string();
        let created_at = doc
            .get(CREATED_AT_FIELD)
            .and_then(FieldValue::as_timestamp)
            .unwrap_or(now);

        Self {
            id: doc.id.clone(),
            name,
            created_at,
        }
    }
}
