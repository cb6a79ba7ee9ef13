//! Workout history screen
//!
//! Static sample entries; nothing is read from the store yet.

use chrono::NaiveDate;
use serde::Serialize;

/// Shown when there is no history
pub const HISTORY_EMPTY_MESSAGE: &str = "No workout history yet";

/// One completed workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkoutEntry {
    /// Entry identifier
    pub id: String,
    /// Exercise performed
    pub exercise: String,
    /// Day of the workout
    pub date: NaiveDate,
}

impl WorkoutEntry {
    fn sample(id: &str, exercise: &str, year: i32, month: u32, day: u32) -> Option<Self> {
        Some(Self {
            id: id.to_string(),
            exercise: exercise.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, day)?,
        })
    }
}

/// The sample history shown by the history screen
pub fn sample_history() -> Vec<WorkoutEntry> {
    [
        WorkoutEntry::sample("1", "Push-ups", 2024, 2, 18),
        WorkoutEntry::sample("2", "Squats", 2024, 2, 17),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// What the history screen renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView<'a> {
    /// Empty-state message
    Empty(&'static str),
    /// Entries in the order given
    Entries(&'a [WorkoutEntry]),
}

/// Derive the view for `entries`
pub fn project(entries: &[WorkoutEntry]) -> HistoryView<'_> {
    if entries.is_empty() {
        HistoryView::Empty(HISTORY_EMPTY_MESSAGE)
    } else {
        HistoryView::Entries(entries)
    }
}
