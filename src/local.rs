//! Local-only exercise list
//!
//! Same add/delete interactions as the remote-backed screen, held entirely
//! in memory: no store, no confirmation, no notifications. Rows render in
//! insertion order.

use chrono::Utc;
use serde::Serialize;

use crate::screen::EMPTY_EXERCISES_MESSAGE;

/// An exercise kept in process memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalExercise {
    /// Creation time in epoch milliseconds, bumped to stay unique
    pub id: String,
    /// Display name
    pub name: String,
}

/// What the local screen renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalView<'a> {
    /// Empty-state message
    Empty(&'static str),
    /// Rows in insertion order
    Rows(&'a [LocalExercise]),
}

/// In-memory exercise list with an add field
#[derive(Debug, Default)]
pub struct LocalExerciseList {
    input: String,
    exercises: Vec<LocalExercise>,
    last_id: i64,
}

impl LocalExerciseList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the add field's text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Current add field text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Append the trimmed input and clear the field
    ///
    /// Returns the new exercise, or `None` when the input is blank (the
    /// field is then left untouched).
    pub fn add(&mut self) -> Option<&LocalExercise> {
        let name = self.input.trim();
        if name.is_empty() {
            return None;
        }

        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        self.exercises.push(LocalExercise {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.input.clear();
        tracing::debug!(exercise_id = id, "Local exercise added");
        self.exercises.last()
    }

    /// Remove the exercise `id`; returns whether one was removed
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.id != id);
        before != self.exercises.len()
    }

    /// Exercises in insertion order
    pub fn exercises(&self) -> &[LocalExercise] {
        &self.exercises
    }

    /// Derive the view
    pub fn view(&self) -> LocalView<'_> {
        if self.exercises.is_empty() {
            LocalView::Empty(EMPTY_EXERCISES_MESSAGE)
        } else {
            LocalView::Rows(&self.exercises)
        }
    }
}
