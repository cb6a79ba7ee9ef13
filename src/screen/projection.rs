//! View projection: what the exercise list shows for the current state
//!
//! Pure functions only. The empty-state swap depends on nothing but whether
//! the list is empty.

use super::gateway::ControlState;
use crate::models::Exercise;

/// Shown instead of the list when there are no exercises
pub const EMPTY_EXERCISES_MESSAGE: &str = "No exercises yet. Add one above!";

/// Sort by `created_at`, newest first; ties keep their relative order
pub fn sort_newest_first(exercises: &mut [Exercise]) {
    exercises.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseRow {
    /// The exercise
    pub exercise: Exercise,
    /// Whether the row's delete affordance accepts input
    pub delete_enabled: bool,
    /// This row's delete is the one in flight
    pub deleting: bool,
}

/// List area of the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListBody {
    /// Empty-state message
    Empty(&'static str),
    /// Rows, newest first
    Rows(Vec<ExerciseRow>),
}

/// Everything the exercise screen renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseListView {
    /// Text in the add field
    pub input: String,
    /// Whether the add control accepts input
    pub add_enabled: bool,
    /// List area
    pub body: ListBody,
}

impl ExerciseListView {
    /// Rows, or an empty slice for the empty state
    pub fn rows(&self) -> &[ExerciseRow] {
        match &self.body {
            ListBody::Rows(rows) => rows,
            ListBody::Empty(_) => &[],
        }
    }

    /// The empty-state message, if shown
    pub fn empty_message(&self) -> Option<&'static str> {
        match self.body {
            ListBody::Empty(message) => Some(message),
            ListBody::Rows(_) => None,
        }
    }
}

/// Derive the view from the local list and control state
pub fn project(exercises: &[Exercise], controls: &ControlState) -> ExerciseListView {
    let body = if exercises.is_empty() {
        ListBody::Empty(EMPTY_EXERCISES_MESSAGE)
    } else {
        let mut sorted = exercises.to_vec();
        sort_newest_first(&mut sorted);
        let delete_enabled = controls.delete_lock.is_idle();
        let in_flight = controls.delete_lock.in_flight();
        ListBody::Rows(
            sorted
                .into_iter()
                .map(|exercise| ExerciseRow {
                    deleting: in_flight == Some(exercise.id.as_str()),
                    delete_enabled,
                    exercise,
                })
                .collect(),
        )
    };

    ExerciseListView {
        input: controls.input.clone(),
        add_enabled: !controls.busy,
        body,
    }
}
