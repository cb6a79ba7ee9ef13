/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `exercises` — Interactive remote-backed exercise screen, plus the one-shot
  `list`, `add` and `delete` handlers that mount the same screen
- `local`     — Interactive local-only exercise list
- `history`   — Workout history
- `check_config` — Configuration guard report

`render` and `special_commands` hold the terminal output and the line
parser shared by the interactive screens.
*/

pub mod check_config;
pub mod exercises;
pub mod history;
pub mod local;
pub mod render;
pub mod special_commands;

pub use check_config::check_config;
pub use exercises::{add_exercise, delete_exercise, list_exercises, run_exercises};
pub use history::show_history;
pub use local::run_local;
