//! Terminal rendering for the exercise, local and history screens

use colored::Colorize;
use prettytable::{format, row, Table};

use crate::error::Result;
use crate::history::HistoryView;
use crate::local::LocalView;
use crate::models::Exercise;
use crate::screen::{ExerciseListView, ListBody, Notification, NotificationLevel};

/// Render the exercise list view
pub fn format_view(view: &ExerciseListView) -> String {
    let mut out = String::new();
    match &view.body {
        ListBody::Empty(message) => {
            out.push_str(&format!("{}\n", message.yellow()));
        }
        ListBody::Rows(rows) => {
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.set_titles(row!["#".bold(), "Exercise".bold(), "Added".bold(), ""]);

            for (i, row) in rows.iter().enumerate() {
                let status = if row.deleting {
                    "deleting...".dimmed().to_string()
                } else {
                    String::new()
                };
                table.add_row(row![
                    (i + 1).to_string().cyan(),
                    row.exercise.name,
                    row.exercise.created_at.format("%Y-%m-%d %H:%M"),
                    status
                ]);
            }
            out.push_str(&table.to_string());
        }
    }
    if !view.add_enabled {
        out.push_str(&format!("{}\n", "Adding...".dimmed()));
    }
    out
}

/// Print the exercise list view
pub fn print_view(view: &ExerciseListView) {
    println!("\n{}", "Exercises".bold());
    print!("{}", format_view(view));
}

/// Render a notification as one or two lines
pub fn format_notification(notification: &Notification) -> String {
    match notification.level {
        NotificationLevel::Success => format!("{} {}", "✓".green(), notification.message.green()),
        NotificationLevel::Notice => format!(
            "{} {}",
            format!("{}:", notification.title).yellow(),
            notification.message
        ),
        NotificationLevel::Error => format!(
            "{} {}",
            format!("{}:", notification.title).red(),
            notification.message
        ),
        NotificationLevel::Fatal => format!(
            "{}\n{}",
            notification.title.red().bold(),
            notification.message.red()
        ),
    }
}

/// Print a notification; failures go to stderr
pub fn print_notification(notification: &Notification) {
    let line = format_notification(notification);
    match notification.level {
        NotificationLevel::Success | NotificationLevel::Notice => println!("{}", line),
        NotificationLevel::Error | NotificationLevel::Fatal => eprintln!("{}", line),
    }
}

/// Print the delete confirmation prompt
pub fn print_delete_prompt(name: &str) {
    println!("\n{}", "Delete Exercise".bold());
    println!("Are you sure you want to delete \"{}\"?", name);
    println!("Type {} to confirm or {} to keep it.", "delete".red(), "cancel".cyan());
}

/// Serialize the list as pretty JSON
///
/// # Errors
///
/// Returns an error if serialization fails
pub fn exercises_json(exercises: &[Exercise]) -> Result<String> {
    Ok(serde_json::to_string_pretty(exercises)?)
}

/// Render the local-only list
pub fn format_local_view(view: &LocalView<'_>) -> String {
    match view {
        LocalView::Empty(message) => format!("{}\n", message.yellow()),
        LocalView::Rows(exercises) => {
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.set_titles(row!["#".bold(), "Exercise".bold()]);
            for (i, exercise) in exercises.iter().enumerate() {
                table.add_row(row![(i + 1).to_string().cyan(), exercise.name]);
            }
            table.to_string()
        }
    }
}

/// Render the workout history
pub fn format_history(view: &HistoryView<'_>) -> String {
    match view {
        HistoryView::Empty(message) => format!("{}\n", message.yellow()),
        HistoryView::Entries(entries) => {
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.set_titles(row!["Exercise".bold(), "Date".bold()]);
            for entry in entries.iter() {
                table.add_row(row![entry.exercise.bold(), entry.date.to_string().dimmed()]);
            }
            table.to_string()
        }
    }
}
